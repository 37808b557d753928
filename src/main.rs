use anyhow::Result;

use screensaver_installer::model::config::project_dirs;
use screensaver_installer::{AppConfig, ScreensaverInstaller, SystemLocations};

fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // Initialize logging to file (never stdout)
    let log_dir = project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "screensaver-installer.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(config.general.log_filter.as_str())
        .init();

    tracing::info!("screensaver-installer starting");

    let mut installer = ScreensaverInstaller::new(SystemLocations::from_config(&config));
    let outcome = installer.install_if_needed();

    // Install failures are reported, never fatal for the host.
    for notice in installer.status_notifications() {
        eprintln!("{notice}");
    }
    tracing::debug!("startup install finished: {outcome:?}");

    Ok(())
}
