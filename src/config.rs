use crate::error::SinkError;
use crate::sink::{FlushMode, LogFileSink};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "logsink.conf";
pub const DEFAULT_LABEL: &str = "logsink";
pub const DEFAULT_LOG_PATH: &str = "./logs/app.log";
pub const DEFAULT_FLUSH_MODE: FlushMode = FlushMode::Always;

#[derive(Debug, Clone)]
pub struct Config {
    pub label: String,
    pub path: PathBuf,
    pub flush_mode: FlushMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            path: PathBuf::from(DEFAULT_LOG_PATH),
            flush_mode: DEFAULT_FLUSH_MODE,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        if self.label.is_empty() {
            return Err("label must not be empty".to_string());
        }
        if self.path.as_os_str().is_empty() {
            return Err("path must not be empty".to_string());
        }
        Ok(())
    }

    /// Reads `key = value` lines; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SinkError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, SinkError> {
        let mut config = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let value = value.trim();
                match key.trim() {
                    "label" => config.label = value.to_string(),
                    "path" => config.path = PathBuf::from(value),
                    "flush_mode" => config.flush_mode = parse_flush_mode(value)?,
                    _ => {}
                }
            }
        }

        config.validate().map_err(SinkError::Config)?;
        Ok(config)
    }

    /// Opens a path-form sink on the OS file system with this config applied.
    pub fn open_sink(&self) -> Result<LogFileSink<'static>, SinkError> {
        let mut sink = LogFileSink::open(self.label.clone(), self.path.clone())?;
        sink.set_flush_mode(self.flush_mode);
        Ok(sink)
    }
}

pub fn parse_flush_mode(value: &str) -> Result<FlushMode, SinkError> {
    match value.trim().to_lowercase().as_str() {
        "always" => Ok(FlushMode::Always),
        "manual" => Ok(FlushMode::Manual),
        unknown => Err(SinkError::Config(format!(
            "Unknown flush_mode variant: '{}'",
            unknown
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.conf")).unwrap();
        assert_eq!(config.label, DEFAULT_LABEL);
        assert_eq!(config.path, PathBuf::from(DEFAULT_LOG_PATH));
        assert_eq!(config.flush_mode, FlushMode::Always);
    }

    #[test]
    fn test_parse_all_keys() {
        let config = Config::parse(
            "# sink settings\n\
             label = worker\n\
             path = /var/log/worker/out.log\n\
             \n\
             flush_mode = MANUAL\n\
             unknown_key = ignored\n",
        )
        .unwrap();
        assert_eq!(config.label, "worker");
        assert_eq!(config.path, PathBuf::from("/var/log/worker/out.log"));
        assert_eq!(config.flush_mode, FlushMode::Manual);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::parse("flush_mode = sometimes"),
            Err(SinkError::Config(_))
        ));
        assert!(matches!(
            Config::parse("label ="),
            Err(SinkError::Config(_))
        ));
    }

    #[test]
    fn test_open_sink_applies_flush_mode() {
        let dir = tempfile::tempdir().unwrap();
        let conf_path = dir.path().join("logsink.conf");
        let log_path = dir.path().join("nested").join("out.log");
        fs::write(
            &conf_path,
            format!("path = {}\nflush_mode = manual\n", log_path.display()),
        )
        .unwrap();

        let config = Config::load(&conf_path).unwrap();
        let mut sink = config.open_sink().unwrap();
        assert_eq!(sink.flush_mode(), FlushMode::Manual);
        assert_eq!(sink.label(), DEFAULT_LABEL);

        sink.log(crate::level::LogLevel::Info, "configured");
        sink.flush();
        assert_eq!(fs::read_to_string(&log_path).unwrap(), "configured\r\n");
    }
}
