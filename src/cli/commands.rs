use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tally", about = concat!("tally v", env!("CARGO_PKG_VERSION"), " - have/need progress for your collectibles"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all lists
    Lists,
    /// Show a list's items grouped by subcategory (default: selected list)
    Show(ShowArgs),
    /// Show every item summed across all lists
    Combined,
    /// Search items by regex
    Find(FindArgs),
    /// Create a custom list
    Create(CreateArgs),
    /// Delete a custom list
    Delete(ListArg),
    /// Rename a custom list
    Rename(RenameArgs),
    /// Add an item to a list
    Add(AddArgs),
    /// Add items to a list from a JSON file
    Import(ImportArgs),
    /// Set how many of an item you have
    Have(CountArgs),
    /// Set how many of an item you need
    Need(CountArgs),
    /// Increase an item's have count
    Inc(StepArgs),
    /// Decrease an item's have count
    Dec(StepArgs),
    /// Mark an item as fully collected
    Collect(ItemArgs),
    /// Reset an item's have count to zero
    Clear(ItemArgs),
    /// Subcategory management
    Sub(SubCmd),
    /// Switch between default, custom and combined views
    View(ViewArgs),
    /// Select a list
    Select(ListArg),
    /// Set the sort mode (storage or closest)
    Sort(SortArgs),
    /// Show or hide collected items
    ShowCollected(ToggleArgs),
    /// Set the favorite flag
    Favorite(ToggleArgs),
    /// View the recovery log
    Recovery(RecoveryCmd),
    /// Run commands interactively against one live session
    Shell,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ShowArgs {
    /// List ID (default: selected list)
    pub list: Option<String>,
}

#[derive(Args)]
pub struct FindArgs {
    /// Regex pattern
    pub pattern: String,
    /// Only search this list
    #[arg(long)]
    pub list: Option<String>,
}

// ---------------------------------------------------------------------------
// List management args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArg {
    /// List ID
    pub list: String,
}

#[derive(Args)]
pub struct CreateArgs {
    /// List name
    pub name: String,
    /// Category shown next to the list name
    #[arg(long)]
    pub category: Option<String>,
    /// Subcategory label (repeatable; default: General)
    #[arg(long = "sub", action = clap::ArgAction::Append)]
    pub subcategories: Vec<String>,
}

#[derive(Args)]
pub struct RenameArgs {
    /// List ID
    pub list: String,
    /// New name
    pub name: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// List ID
    pub list: String,
    /// Item ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Rarity (common, uncommon, rare, epic, legendary)
    #[arg(long)]
    pub rarity: Option<String>,
    /// How many are needed
    #[arg(long, default_value_t = 1)]
    pub need: u32,
    /// Image reference
    #[arg(long)]
    pub image: Option<String>,
    /// Subcategory label (repeatable)
    #[arg(long = "sub", action = clap::ArgAction::Append)]
    pub subcategories: Vec<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// List ID
    pub list: String,
    /// JSON file with an array of items
    pub file: String,
}

// ---------------------------------------------------------------------------
// Ledger args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ItemArgs {
    /// List ID
    pub list: String,
    /// Item ID
    pub item: String,
}

#[derive(Args)]
pub struct CountArgs {
    /// List ID
    pub list: String,
    /// Item ID
    pub item: String,
    /// New value
    pub value: u32,
}

#[derive(Args)]
pub struct StepArgs {
    /// List ID
    pub list: String,
    /// Item ID
    pub item: String,
    /// Step size
    #[arg(long = "by", default_value_t = 1)]
    pub step: u32,
}

// ---------------------------------------------------------------------------
// Subcategory args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SubCmd {
    #[command(subcommand)]
    pub action: SubAction,
}

#[derive(Subcommand)]
pub enum SubAction {
    /// Append a subcategory label to a list
    Add(SubLabelArgs),
    /// Remove a subcategory label; its items move to the first label
    Rm(SubLabelArgs),
    /// Reorder a list's labels (must name every label exactly once)
    Order(SubOrderArgs),
    /// Toggle a label on an item (default lists: replace the label)
    Toggle(SubToggleArgs),
}

#[derive(Args)]
pub struct SubLabelArgs {
    /// List ID
    pub list: String,
    /// Label
    pub label: String,
}

#[derive(Args)]
pub struct SubOrderArgs {
    /// List ID
    pub list: String,
    /// Labels in the new order
    #[arg(required = true, num_args = 1..)]
    pub labels: Vec<String>,
}

#[derive(Args)]
pub struct SubToggleArgs {
    /// List ID
    pub list: String,
    /// Item ID
    pub item: String,
    /// Label
    pub label: String,
}

// ---------------------------------------------------------------------------
// View args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ViewArgs {
    /// default, custom, or all
    pub kind: String,
}

#[derive(Args)]
pub struct SortArgs {
    /// storage or closest
    pub mode: String,
}

#[derive(Args)]
pub struct ToggleArgs {
    /// on or off
    pub state: String,
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Print the absolute path to the recovery log
    Path,
}
