pub mod aggregate;
pub mod import;
pub mod ledger;
pub mod list_ops;
pub mod reducer;
pub mod search;
pub mod sort;
pub mod subcategory;
