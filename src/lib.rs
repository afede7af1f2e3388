//! A file-backed log sink.
//!
//! [`LogFileSink`] appends already formatted lines, each terminated by CRLF, to one
//! file. It can re-seek to end-of-file before every write so several writers can
//! share a path, and can sync to stable storage after every write or on demand.

pub mod config;
pub mod error;
pub mod level;
pub mod serial;
pub mod sink;
pub mod storage;

pub use error::SinkError;
pub use level::LogLevel;
pub use serial::{LogSink, SerialSink};
pub use sink::{Destination, FlushMode, LINE_TERMINATOR, LogFileSink};
