use super::traits::{FileSystem, LogFile};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// --- In-Memory File System (For Testing) ---

#[derive(Clone, Default)]
pub struct MemFileSystem {
    // Path -> File Content
    files: Arc<RwLock<HashMap<PathBuf, Arc<RwLock<Vec<u8>>>>>>,
    dirs: Arc<RwLock<HashSet<PathBuf>>>,
}

impl MemFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取文件内容的快照
    pub fn read(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.read().get(path).map(|data| data.read().clone())
    }

    fn parent_exists(&self, path: &Path) -> bool {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.is_dir(parent),
            _ => true,
        }
    }
}

struct MemFile {
    data: Arc<RwLock<Vec<u8>>>,
    pos: u64,
}

impl Seek for MemFile {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let len = self.data.read().len() as u64;
        let new_pos = match pos {
            io::SeekFrom::Start(p) => Some(p),
            io::SeekFrom::End(p) => len.checked_add_signed(p),
            io::SeekFrom::Current(p) => self.pos.checked_add_signed(p),
        };
        self.pos = new_pos.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )
        })?;
        Ok(self.pos)
    }
}

impl Write for MemFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.data.write();
        let pos = self.pos as usize;
        let end = pos + buf.len();
        if end > guard.len() {
            guard.resize(end, 0);
        }
        guard[pos..end].copy_from_slice(buf);
        self.pos += buf.len() as u64;
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogFile for MemFile {
    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FileSystem for MemFileSystem {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if self.files.read().contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "A file exists at this path",
            ));
        }
        let mut dirs = self.dirs.write();
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                dirs.insert(ancestor.to_path_buf());
            }
        }
        Ok(())
    }

    fn create_file(&self, path: &Path) -> io::Result<()> {
        if !self.parent_exists(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "Parent directory not found",
            ));
        }
        if self.is_dir(path) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                "Is a directory",
            ));
        }
        self.files
            .write()
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(RwLock::new(Vec::new())));
        Ok(())
    }

    fn open_for_writing(&self, path: &Path) -> io::Result<Box<dyn LogFile>> {
        let guard = self.files.read();
        let data = guard
            .get(path)
            .ok_or(io::Error::new(io::ErrorKind::NotFound, "File not found"))?;
        Ok(Box::new(MemFile {
            data: data.clone(),
            pos: 0,
        }))
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.files
            .write()
            .remove(path)
            .map(|_| ())
            .ok_or(io::Error::new(io::ErrorKind::NotFound, "File not found"))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.read().contains(path)
    }
}
