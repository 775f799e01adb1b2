//! File system access for workspace discovery

mod mock;
mod real;
#[path = "trait.rs"]
mod r#trait;

pub use mock::MockFileSystem;
pub use r#trait::{DirEntry, FileSystem, FileType};
pub use real::RealFileSystem;
