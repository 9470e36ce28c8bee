// The three record lists behind one lock, plus the HTTP handlers that
// project and mutate them.

pub mod clipboard;
pub mod dto;
pub mod handlers;
pub mod workspace;

pub use workspace::{Lists, Workspace};
