use std::path::Path;

use chrono::{Local, NaiveDateTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::AppError;

const DEFAULT_FILTER: &str = "job_notif=info";

/// Initialize logging to stderr, plus a timestamped file when `log_dir` is set.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// whole process.
pub fn init(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>, AppError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender =
                tracing_appender::rolling::never(dir, log_file_name(Local::now().naive_local()));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

pub fn log_file_name(started_at: NaiveDateTime) -> String {
    format!("job_notif_{}.log", started_at.format("%Y%m%d_%H%M%S"))
}
