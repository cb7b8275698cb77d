//! Presentation-independent view models driven by the terminal shell.

mod collection;
mod deletion;
pub mod home;
mod query;
mod store;
mod tasks;

pub use collection::TaskCollection;
pub use deletion::DeletionFlow;
pub use home::{HomeSnapshot, HomeView};
pub use query::{local_today, TaskFilter, TaskQuery};
pub use store::{run_command, settle, TaskStore};
pub use tasks::{Command, LoadState, Message, Notice, NoticeKind, TasksView};
