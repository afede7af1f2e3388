mod memory;
mod os;
mod traits;

pub use memory::MemFileSystem;
pub use os::{OsFile, OsFileSystem};
pub use traits::{FileSystem, LogFile};
