use super::traits::{FileSystem, LogFile};
use std::fs::File;
use std::io::{self, Seek, Write};
use std::path::Path;

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        // 创建文件后 sync 父目录，防止断电导致文件丢失 (Dentry loss)
        fn sync_parent_dir(path: &Path) {
            if let Some(parent) = path.parent() {
                // 忽略目录 sync 错误，某些环境（如只读挂载）可能不允许，但不应阻断流程
                let _ = File::open(parent).and_then(|f| f.sync_all());
            }
        }
    } else {
        // Windows 上无法以普通方式打开目录句柄，跳过
        fn sync_parent_dir(_path: &Path) {}
    }
}

// 封装 std::fs::File，提供更好的扩展性
pub struct OsFile {
    inner: File,
}

impl Write for OsFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Seek for OsFile {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl LogFile for OsFile {
    fn sync(&mut self) -> io::Result<()> {
        self.inner.sync_all()
    }
}

/// 默认的 OS 文件系统实现
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn create_file(&self, path: &Path) -> io::Result<()> {
        // create(true) + truncate(false)：已存在则保持原内容
        File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        sync_parent_dir(path);
        Ok(())
    }

    fn open_for_writing(&self, path: &Path) -> io::Result<Box<dyn LogFile>> {
        let file = File::options().write(true).open(path)?;
        Ok(Box::new(OsFile { inner: file }))
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}
