//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod check;
pub mod compare;
pub mod models;
pub mod process;
pub mod utils;

// Re-export main command functions
pub use check::{execute_check, validate_args};
pub use compare::execute_compare;
pub use models::{CheckArgs, CompareArgs, MatchArgs};
pub use process::{execute_match, execute_match_with};
pub use utils::display_version;
