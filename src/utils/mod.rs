//! Utilities: process-wide logging (dynamic level) and user input-data loading.
//!
//! Key items:
//!   init_logging / derive_level
//!   log_error! / log_warn! / log_info! / log_debug! / log_trace!
//!   input::load_input_data

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

/// Logging helpers. Lines go to stderr; stdout is reserved for command output.
pub mod logging {
    use super::*;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
    pub enum LogLevel {
        Error = 0,
        Warn = 1,
        Info = 2,
        Debug = 3,
        Trace = 4,
    }

    impl LogLevel {
        pub fn as_str(&self) -> &'static str {
            match self {
                LogLevel::Error => "ERROR",
                LogLevel::Warn => "WARNING",
                LogLevel::Info => "INFO",
                LogLevel::Debug => "DEBUG",
                LogLevel::Trace => "TRACE",
            }
        }
    }

    static GLOBAL_LEVEL: OnceLock<AtomicU8> = OnceLock::new();

    fn inner_cell() -> &'static AtomicU8 {
        GLOBAL_LEVEL.get_or_init(|| AtomicU8::new(LogLevel::Info as u8))
    }

    pub fn init_logging(level: LogLevel) {
        inner_cell().store(level as u8, Ordering::Relaxed);
    }

    pub fn current_log_level() -> LogLevel {
        match inner_cell().load(Ordering::Relaxed) {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// `--quiet` wins over any number of `-v`.
    pub fn derive_level(verbose: u8, quiet: bool) -> LogLevel {
        if quiet {
            return LogLevel::Error;
        }
        match verbose {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn log(level: LogLevel, msg: impl AsRef<str>) {
        if level <= current_log_level() {
            eprintln!("[{}] {}", level.as_str(), msg.as_ref());
        }
    }

    pub fn error(msg: impl AsRef<str>) {
        log(LogLevel::Error, msg);
    }
    pub fn warn(msg: impl AsRef<str>) {
        log(LogLevel::Warn, msg);
    }
    pub fn info(msg: impl AsRef<str>) {
        log(LogLevel::Info, msg);
    }
    pub fn debug(msg: impl AsRef<str>) {
        log(LogLevel::Debug, msg);
    }
    pub fn trace(msg: impl AsRef<str>) {
        log(LogLevel::Trace, msg);
    }

    #[macro_export]
    macro_rules! log_error {
        ($($t:tt)*) => { $crate::utils::logging::error(format!($($t)*)) };
    }
    #[macro_export]
    macro_rules! log_warn {
        ($($t:tt)*) => { $crate::utils::logging::warn(format!($($t)*)) };
    }
    #[macro_export]
    macro_rules! log_info {
        ($($t:tt)*) => { $crate::utils::logging::info(format!($($t)*)) };
    }
    #[macro_export]
    macro_rules! log_debug {
        ($($t:tt)*) => { $crate::utils::logging::debug(format!($($t)*)) };
    }
    #[macro_export]
    macro_rules! log_trace {
        ($($t:tt)*) => { $crate::utils::logging::trace(format!($($t)*)) };
    }
}

pub use logging::{derive_level, init_logging};

/// Payload input for create-style commands.
pub mod input {
    use anyhow::{Context, Result, bail};
    use serde_json::Value;

    /// Load a JSON object either from an inline string or from a file.
    ///
    /// Files ending in `.yml`/`.yaml` are parsed as YAML, anything else as
    /// JSON. Supplying both sources, or neither, is an error.
    pub fn load_input_data(inline: Option<&str>, file: Option<&str>) -> Result<Value> {
        let value = match (inline, file) {
            (Some(_), Some(_)) => bail!("use either --payload or --payload_file, not both"),
            (None, None) => bail!("no payload given; use --payload or --payload_file"),
            (Some(raw), None) => {
                serde_json::from_str(raw).context("failed to parse --payload as JSON")?
            }
            (None, Some(path)) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read payload file: {path}"))?;
                let lower = path.to_ascii_lowercase();
                if lower.ends_with(".yaml") || lower.ends_with(".yml") {
                    let yaml_v: serde_yaml::Value =
                        serde_yaml::from_str(&raw).context("failed to parse YAML payload file")?;
                    serde_json::to_value(yaml_v).context("failed to convert YAML to JSON")?
                } else {
                    serde_json::from_str(&raw).context("failed to parse JSON payload file")?
                }
            }
        };

        if !value.is_object() {
            bail!("payload root must be an object");
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::input::load_input_data;
    use super::logging::{LogLevel, derive_level};
    use serde_json::json;

    #[test]
    fn quiet_overrides_verbose() {
        assert_eq!(derive_level(3, true), LogLevel::Error);
        assert_eq!(derive_level(0, false), LogLevel::Info);
        assert_eq!(derive_level(1, false), LogLevel::Debug);
        assert_eq!(derive_level(5, false), LogLevel::Trace);
    }

    #[test]
    fn inline_payload_parses() {
        let v = load_input_data(Some(r#"{"vm":"a"}"#), None).unwrap();
        assert_eq!(v, json!({"vm":"a"}));
    }

    #[test]
    fn yaml_payload_file_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.yml");
        std::fs::write(&path, "uri_parts:\n  namespace: System\n").unwrap();
        let v = load_input_data(None, path.to_str()).unwrap();
        assert_eq!(v["uri_parts"]["namespace"], json!("System"));
    }

    #[test]
    fn payload_sources_are_exclusive() {
        assert!(load_input_data(Some("{}"), Some("x.json")).is_err());
        assert!(load_input_data(None, None).is_err());
        let err = load_input_data(Some("[1,2]"), None).unwrap_err();
        assert!(err.to_string().contains("object"));
    }
}
