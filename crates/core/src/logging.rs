use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Where log lines go and how verbose they are.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Mirror records to stderr in addition to the rolling file.
    pub to_stderr: bool,
    /// Filter directive used when `RUST_LOG` is unset.
    pub default_level: String,
    /// Overrides `$CLASSPEEK_LOG_DIR` and `~/.classpeek/logs`.
    pub log_dir: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            to_stderr: true,
            default_level: "info".to_string(),
            log_dir: None,
        }
    }
}

fn resolve_log_dir(options: &LogOptions) -> PathBuf {
    if let Some(dir) = &options.log_dir {
        return dir.clone();
    }
    if let Ok(dir) = std::env::var("CLASSPEEK_LOG_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".classpeek/logs")
}

/// Installs the global subscriber: a daily rolling file named after
/// `component` plus, optionally, a colored stderr layer.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process. A second call leaves the first subscriber in
/// place.
pub fn init_logging(component: &str, options: &LogOptions) -> WorkerGuard {
    let log_dir = resolve_log_dir(options);
    let _ = std::fs::create_dir_all(&log_dir);

    // Files like analyze.log.2024-01-21
    let file_appender = tracing_appender::rolling::daily(&log_dir, component);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.default_level));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    let installed = if options.to_stderr {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);
        registry.with(stderr_layer).try_init()
    } else {
        registry.try_init()
    };
    if installed.is_err() {
        tracing::debug!("global subscriber already installed, keeping it");
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_log_dir_wins() {
        let options = LogOptions {
            log_dir: Some(PathBuf::from("/tmp/classpeek-logs")),
            ..LogOptions::default()
        };
        assert_eq!(resolve_log_dir(&options), PathBuf::from("/tmp/classpeek-logs"));
    }

    #[test]
    fn test_init_twice_keeps_first_subscriber() {
        let dir = tempfile::tempdir().unwrap();
        let options = LogOptions {
            to_stderr: false,
            log_dir: Some(dir.path().to_path_buf()),
            ..LogOptions::default()
        };
        let _first = init_logging("test", &options);
        let _second = init_logging("test", &options);
        tracing::info!("logged once");
    }
}
