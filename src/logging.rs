//! Logging setup
//!
//! Events go to stderr and are appended to a single log file under the data
//! directory. The file is never rotated.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache;
use crate::error::Result;

pub const DEFAULT_FILTER: &str = "heritage_wiki=info,warn";
pub const VERBOSE_FILTER: &str = "heritage_wiki=debug,info";

/// Install the global subscriber. Keep the returned guard alive until exit
/// so buffered file output is flushed.
pub fn init(log_path: &Path, verbose: bool) -> Result<WorkerGuard> {
    let dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    // The subscriber does not exist yet, so folder creation is logged below
    let created = cache::create_dirs(dir)?;
    let file_name = log_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "heritage-wiki.log".into());

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let default_filter = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A second initialisation (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init();

    for folder in created {
        tracing::info!("Created folder {:?}", folder);
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_log_folder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/heritage-wiki.log");
        let guard = init(&path, false).unwrap();
        tracing::warn!("logging test event");
        drop(guard);
        assert!(path.parent().unwrap().is_dir());
    }

    #[test]
    fn test_init_reuses_existing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heritage-wiki.log");
        let guard = init(&path, true).unwrap();
        drop(guard);
        assert!(dir.path().is_dir());
    }
}
