use crate::error::SinkError;
use crate::level::LogLevel;
use crate::storage::{FileSystem, LogFile, OsFileSystem};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Every record on disk ends with CRLF.
pub const LINE_TERMINATOR: &str = "\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    // 每次写入后立即同步到磁盘
    #[default]
    Always,
    // 由调用方显式调用 flush()
    Manual,
}

/// How the sink came by its handle, and therefore who closes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// The sink created/opened the file itself and owns its lifecycle.
    OwnedPath(PathBuf),
    /// The caller supplied an already-open handle.
    ExternalHandle { caller_closes: bool, seekable: bool },
}

impl Destination {
    pub fn seekable(&self) -> bool {
        match self {
            Destination::OwnedPath(_) => true,
            Destination::ExternalHandle { seekable, .. } => *seekable,
        }
    }

    /// Whether teardown closes the handle.
    pub fn closes_handle(&self) -> bool {
        match self {
            Destination::OwnedPath(_) => true,
            Destination::ExternalHandle { caller_closes, .. } => !caller_closes,
        }
    }
}

/// Appends fully formatted lines to a single file handle.
///
/// Calls on one sink must be serialized by the caller (`&mut self` enforces this,
/// [`crate::serial::SerialSink`] does it across threads). Several sinks, possibly
/// in different processes, may append to the same path when seekable: each write
/// re-seeks to the end first. Lines from different writers may still interleave.
pub struct LogFileSink<'a> {
    label: String,
    destination: Destination,
    handle: Option<Box<dyn LogFile + 'a>>,
    flush_mode: FlushMode,
    fs: Arc<dyn FileSystem>,
}

impl<'a> LogFileSink<'a> {
    /// Opens (creating if needed) the log file at `path` on the OS file system.
    pub fn open(label: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        Self::open_with(label, path, Arc::new(OsFileSystem))
    }

    /// Same as [`LogFileSink::open`] on an explicit file system.
    ///
    /// # Errors
    /// - `NotAFile` if `path` is a directory. Nothing is created in that case.
    /// - `DirectoryCreationFailed`, `FileCreationFailed`, `OpenForWritingFailed`
    ///   for the corresponding step. No sink is returned on failure.
    pub fn open_with(
        label: impl Into<String>,
        path: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self, SinkError> {
        let label = label.into();
        let path = path.into();
        debug!(label = %label, path = %path.display(), "log file destination");

        validate_path(fs.as_ref(), &path)?;

        let mut sink = Self {
            label,
            destination: Destination::OwnedPath(path),
            handle: None,
            flush_mode: FlushMode::default(),
            fs,
        };
        sink.open_file()?;
        Ok(sink)
    }

    /// Wraps a handle the caller already opened.
    ///
    /// With `caller_closes` the sink syncs but never closes the handle; pass a
    /// handle the caller can still reach (e.g. `&File`) to keep using it afterwards.
    /// Set `seekable` to false for pipes and other streams that cannot seek.
    pub fn from_handle(
        label: impl Into<String>,
        handle: impl LogFile + 'a,
        caller_closes: bool,
        seekable: bool,
    ) -> Self {
        Self {
            label: label.into(),
            destination: Destination::ExternalHandle {
                caller_closes,
                seekable,
            },
            handle: Some(Box::new(handle)),
            flush_mode: FlushMode::default(),
            fs: Arc::new(OsFileSystem),
        }
    }

    /// [`LogFileSink::from_handle`] with `caller_closes = true`, `seekable = true`.
    pub fn from_handle_default(label: impl Into<String>, handle: impl LogFile + 'a) -> Self {
        Self::from_handle(label, handle, true, true)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.destination {
            Destination::OwnedPath(path) => Some(path),
            Destination::ExternalHandle { .. } => None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub fn flush_mode(&self) -> FlushMode {
        self.flush_mode
    }

    pub fn set_flush_mode(&mut self, mode: FlushMode) {
        self.flush_mode = mode;
    }

    /// Appends `line` followed by CRLF. Never fails.
    ///
    /// A failed write is reported through `tracing` and the line is dropped.
    pub fn log(&mut self, level: LogLevel, line: &str) {
        if let Err(e) = self.try_log(level, line) {
            error!(label = %self.label, level = %level, error = %e, "dropped log line");
        }
    }

    /// Like [`LogFileSink::log`] but hands write and sync failures back.
    ///
    /// A failed seek to end-of-file is still only reported; the write then
    /// happens at the current position.
    pub fn try_log(&mut self, _level: LogLevel, line: &str) -> Result<(), SinkError> {
        let seekable = self.destination.seekable();
        let handle = self.handle.as_mut().ok_or(SinkError::Closed)?;

        if seekable {
            if let Err(e) = handle.seek(SeekFrom::End(0)) {
                warn!(
                    label = %self.label,
                    error = %e,
                    "seek to end failed, writing at current position"
                );
            }
        }

        // 单次 write_all，尽量减少与其他写者交错
        let mut record = String::with_capacity(line.len() + LINE_TERMINATOR.len());
        record.push_str(line);
        record.push_str(LINE_TERMINATOR);
        handle.write_all(record.as_bytes())?;

        if self.flush_mode == FlushMode::Always {
            sync_handle(handle)?;
        }
        Ok(())
    }

    /// Logs raw bytes, skipping them silently unless they are valid UTF-8.
    pub fn log_bytes(&mut self, level: LogLevel, bytes: &[u8]) {
        match std::str::from_utf8(bytes) {
            Ok(line) => self.log(level, line),
            Err(_) => debug!(label = %self.label, len = bytes.len(), "skipping non UTF-8 line"),
        }
    }

    /// Syncs buffered writes to stable storage. No-op once closed.
    pub fn flush(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            if let Err(e) = sync_handle(handle) {
                warn!(label = %self.label, error = %e, "flush failed");
            }
        }
    }

    /// Removes the file at `path`, which need not be this sink's own file.
    pub fn delete(&self, path: impl AsRef<Path>) -> Result<(), SinkError> {
        let path = path.as_ref();
        self.fs
            .remove_file(path)
            .map_err(|source| SinkError::DeletionFailed {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(label = %self.label, path = %path.display(), "deleted file");
        Ok(())
    }

    /// Closes the current handle and opens the owned path again.
    ///
    /// Picks up a fresh file after an external tool moved the old one away.
    pub fn reopen(&mut self) -> Result<(), SinkError> {
        self.open_file()
    }

    /// Syncs and releases the handle.
    ///
    /// Returns the handle when the caller keeps close responsibility, otherwise
    /// closes it and returns `None`. Calling it again is a no-op.
    pub fn close(&mut self) -> Option<Box<dyn LogFile + 'a>> {
        let mut handle = self.handle.take()?;
        if let Err(e) = sync_handle(&mut handle) {
            warn!(label = %self.label, error = %e, "sync on close failed");
        }
        if self.destination.closes_handle() {
            drop(handle);
            debug!(label = %self.label, "closed log file");
            None
        } else {
            Some(handle)
        }
    }

    fn open_file(&mut self) -> Result<(), SinkError> {
        let path = match &self.destination {
            Destination::OwnedPath(path) => path.clone(),
            Destination::ExternalHandle { .. } => return Err(SinkError::MissingDestination),
        };
        // 保证同一时刻只有一个句柄
        let _ = self.close();

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            self.fs
                .create_dir_all(dir)
                .map_err(|source| SinkError::DirectoryCreationFailed {
                    dir: dir.to_path_buf(),
                    source,
                })?;
            debug!(label = %self.label, dir = %dir.display(), "created directory");
        }

        if !self.fs.exists(&path) {
            self.fs
                .create_file(&path)
                .map_err(|source| SinkError::FileCreationFailed {
                    path: path.clone(),
                    source,
                })?;
            debug!(label = %self.label, path = %path.display(), "created log file");
        } else {
            debug!(label = %self.label, path = %path.display(), "log file exists");
        }

        let handle =
            self.fs
                .open_for_writing(&path)
                .map_err(|source| SinkError::OpenForWritingFailed {
                    path: path.clone(),
                    source,
                })?;
        self.handle = Some(handle);
        Ok(())
    }
}

impl Drop for LogFileSink<'_> {
    fn drop(&mut self) {
        // caller_closes 时交回的句柄在这里被丢弃；调用方持有引用时文件保持打开
        let _ = self.close();
    }
}

fn validate_path(fs: &dyn FileSystem, path: &Path) -> Result<(), SinkError> {
    let spelled_as_dir = path
        .as_os_str()
        .to_string_lossy()
        .chars()
        .last()
        .is_some_and(std::path::is_separator);
    if spelled_as_dir || fs.is_dir(path) {
        return Err(SinkError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn sync_handle<F: LogFile + ?Sized>(handle: &mut F) -> io::Result<()> {
    // 1. 先把用户态缓冲推给内核
    handle.flush()?;
    // 2. 再命令内核推给磁盘
    handle.sync()
}
