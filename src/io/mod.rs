pub mod config_io;
pub mod lock;
pub mod normalize;
pub mod recovery;
pub mod state_io;
