use std::fs::File;
use std::io::{self, Seek, Write};
use std::path::Path;

/// [Capability Trait] 可追加写入的日志句柄
///
/// 对应场景：LogFileSink 持有的唯一写句柄。
/// 核心特性：
/// 1. 继承 `Write`，写入一整行。
/// 2. 继承 `Seek`，共享文件模式下每次写入前 seek 到末尾。
/// 3. 提供 `sync` (fsync) 确保数据落盘。
pub trait LogFile: Write + Seek + Send {
    fn sync(&mut self) -> io::Result<()>;
}

impl LogFile for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

// 调用方持有 File，只把引用交给 sink：sink 析构时不会关闭调用方的文件
impl LogFile for &File {
    fn sync(&mut self) -> io::Result<()> {
        (**self).sync_all()
    }
}

impl LogFile for Box<dyn LogFile + '_> {
    fn sync(&mut self) -> io::Result<()> {
        (**self).sync()
    }
}

/// [Factory Trait] 文件系统抽象
///
/// 职责：负责日志文件的创建、打开和删除。
/// 1. **解耦**: LogFileSink 不直接依赖 `std::fs`。
/// 2. **测试**: 可以注入 `MemFileSystem` 进行纯内存测试。
pub trait FileSystem: Send + Sync {
    /// Creates `path` and every missing ancestor.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    /// Creates an empty file if none exists. Never truncates.
    fn create_file(&self, path: &Path) -> io::Result<()>;
    /// Opens an existing file for writing, positioned at the start, without truncation.
    fn open_for_writing(&self, path: &Path) -> io::Result<Box<dyn LogFile>>;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
}
