use crate::error::SinkError;
use crate::level::LogLevel;
use crate::sink::{FlushMode, LogFileSink};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

/// What a logging front end calls once it has filtered and formatted a line.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, line: &str);
    fn flush(&self);
}

/// Funnels every call into one [`LogFileSink`] through a single lock.
///
/// Clones share the same sink, so any number of threads can hold one and
/// lines never interleave inside the file.
pub struct SerialSink<'a> {
    inner: Arc<Mutex<LogFileSink<'a>>>,
}

impl<'a> SerialSink<'a> {
    pub fn new(sink: LogFileSink<'a>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    pub fn delete(&self, path: impl AsRef<Path>) -> Result<(), SinkError> {
        self.inner.lock().delete(path)
    }

    pub fn flush_mode(&self) -> FlushMode {
        self.inner.lock().flush_mode()
    }

    pub fn set_flush_mode(&self, mode: FlushMode) {
        self.inner.lock().set_flush_mode(mode);
    }

    /// Closes the shared sink for every clone. Later calls are no-ops.
    pub fn close(&self) {
        let _ = self.inner.lock().close();
    }
}

impl Clone for SerialSink<'_> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl LogSink for SerialSink<'_> {
    fn log(&self, level: LogLevel, line: &str) {
        self.inner.lock().log(level, line);
    }

    fn flush(&self) {
        self.inner.lock().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemFileSystem;
    use std::thread;

    #[test]
    fn test_concurrent_lines_stay_whole() {
        let fs = Arc::new(MemFileSystem::new());
        let path = Path::new("logs/threads.log");
        let sink = SerialSink::new(LogFileSink::open_with("threads", path, fs.clone()).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sink = sink.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        sink.log(LogLevel::Info, &format!("thread {t} line {i}"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        sink.flush();

        let content = String::from_utf8(fs.read(path).unwrap()).unwrap();
        let lines: Vec<&str> = content.split_terminator("\r\n").collect();
        assert_eq!(lines.len(), 200);
        for t in 0..4 {
            let prefix = format!("thread {t} line ");
            let ours: Vec<usize> = lines
                .iter()
                .filter_map(|l| l.strip_prefix(prefix.as_str()))
                .map(|n| n.parse().unwrap())
                .collect();
            // 同一线程内保持调用顺序
            assert_eq!(ours, (0..50).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_trait_object_and_close() {
        let fs = Arc::new(MemFileSystem::new());
        let path = Path::new("obj.log");
        let serial = SerialSink::new(LogFileSink::open_with("obj", path, fs.clone()).unwrap());
        serial.set_flush_mode(FlushMode::Manual);
        assert_eq!(serial.flush_mode(), FlushMode::Manual);

        let sink: &dyn LogSink = &serial;
        sink.log(LogLevel::Warn, "via trait");
        sink.flush();
        serial.close();
        sink.log(LogLevel::Warn, "dropped");

        assert_eq!(fs.read(path).unwrap(), b"via trait\r\n".to_vec());
        serial.delete(path).unwrap();
        assert!(fs.read(path).is_none());
    }
}
