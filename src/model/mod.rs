pub mod item;
pub mod list;
pub mod state;
pub mod config;

pub use item::*;
pub use list::*;
pub use state::*;
pub use config::*;
