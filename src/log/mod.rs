use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing/logging subsystem.
///
/// When `to_file` is true, logs are appended to `apolo.log` in the OS temp
/// directory. Otherwise they are discarded. Console output for the user goes
/// through [`crate::ui::Printer`], never through tracing.
pub fn initialize(to_file: bool) {
    let builder = tracing_subscriber::fmt().with_env_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );

    if to_file
        && let Some(path) = log_file_path()
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
    {
        let _ = builder.with_writer(file).with_ansi(false).try_init();
        return;
    }

    let _ = builder
        .with_writer(std::io::sink)
        .with_ansi(false)
        .try_init();
}

/// Return the log file path: {temp_dir}/apolo.log
pub fn log_file_path() -> Option<PathBuf> {
    let mut path = std::env::temp_dir();
    path.push("apolo.log");
    Some(path)
}
