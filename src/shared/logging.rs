use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Once;

use chrono::Utc;
use env_logger::{Builder, Env, Target};

use crate::shared::config::{self, LogFormat, LogMode, LoggingConfig};

static INIT: Once = Once::new();

/// Initializes the global logger once using the runtime's logging configuration.
///
/// Output goes to stdout or to `LOG_DIR/LOG_FILE_NAME` depending on `LOG_MODE`, formatted
/// as plain text or JSON lines depending on `LOG_FORMAT`. Problems creating the log
/// directory or opening the file fall back to stdout and are reported as warnings once
/// the logger is installed.
///
/// # Examples
///
/// ```
/// // Safe to call multiple times.
/// eldercare_voice_runtime::logging::init();
/// log::info!("logger initialized");
/// ```
pub fn init() {
    INIT.call_once(|| {
        let cfg = config::logging_config().clone();
        let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

        let format = cfg.format.clone();
        builder.format(move |buf, record| {
            let line = format_line(
                &format,
                record.level(),
                record.target(),
                &record.args().to_string(),
            );
            writeln!(buf, "{}", line)
        });

        let (target, warnings) = resolve_target(&cfg);
        builder.target(target);

        let _ = builder.try_init();
        for warning in warnings {
            log::warn!("{}", warning);
        }
    });
}

fn format_line(format: &LogFormat, level: log::Level, target: &str, msg: &str) -> String {
    let ts = Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    match format {
        LogFormat::Json => serde_json::json!({
            "ts": ts,
            "level": level.to_string(),
            "target": target,
            "msg": msg,
        })
        .to_string(),
        LogFormat::Text => format!("{} {} {} {}", ts, level, target, msg),
    }
}

fn resolve_target(cfg: &LoggingConfig) -> (Target, Vec<String>) {
    let mut warnings = Vec::new();
    if matches!(cfg.mode, LogMode::Stdout) {
        return (Target::Stdout, warnings);
    }
    let dir = cfg.dir.as_deref().unwrap_or("logs");
    if let Err(err) = std::fs::create_dir_all(dir) {
        warnings.push(format!("[logging] failed to create log dir: {}", err));
    }
    let path = Path::new(dir).join(&cfg.file_name);
    match open_append(&path) {
        Ok(file) => (Target::Pipe(Box::new(file)), warnings),
        Err(err) => {
            warnings.push(format!(
                "[logging] failed to open log file ({}): {}",
                path.display(),
                err
            ));
            (Target::Stdout, warnings)
        }
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_line_carries_level_target_and_message() {
        let line = format_line(&LogFormat::Json, log::Level::Warn, "voice", "hello");
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["target"], "voice");
        assert_eq!(value["msg"], "hello");
        assert!(value["ts"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn text_line_ends_with_message() {
        let line = format_line(&LogFormat::Text, log::Level::Info, "http", "served");
        assert!(line.ends_with("INFO http served"));
    }

    #[test]
    fn stdout_mode_needs_no_file() {
        let cfg = LoggingConfig {
            mode: LogMode::Stdout,
            format: LogFormat::Text,
            dir: None,
            file_name: "app.log".to_string(),
        };
        let (target, warnings) = resolve_target(&cfg);
        assert!(matches!(target, Target::Stdout));
        assert!(warnings.is_empty());
    }
}
