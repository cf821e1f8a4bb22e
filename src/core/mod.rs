//! Process-wide state shared by the command runners.

mod state;

pub use state::{is_shutdown, register_shutdown, setup_shutdown_handler};
