use std::path::{Path, PathBuf};

use crate::model::config::{AppConfig, dirs_home};

/// Where the bundled screensaver lives and where it gets installed.
///
/// The host supplies these; nothing in the installer computes platform paths
/// on its own.
pub trait SaverLocations {
    /// Read-only source inside the host application's resources.
    fn bundled_path(&self) -> PathBuf;

    /// User-scoped directory that receives the bundle.
    fn install_dir(&self) -> PathBuf;

    fn installed_path(&self) -> PathBuf {
        let bundled = self.bundled_path();
        match bundled.file_name() {
            Some(name) => self.install_dir().join(name),
            None => self.install_dir().join("Screensaver.saver"),
        }
    }
}

/// Explicit paths, for hosts that resolve them elsewhere.
#[derive(Debug, Clone)]
pub struct FixedLocations {
    bundled: PathBuf,
    install_dir: PathBuf,
}

impl FixedLocations {
    pub fn new(bundled: impl Into<PathBuf>, install_dir: impl Into<PathBuf>) -> Self {
        Self {
            bundled: bundled.into(),
            install_dir: install_dir.into(),
        }
    }
}

impl SaverLocations for FixedLocations {
    fn bundled_path(&self) -> PathBuf {
        self.bundled.clone()
    }

    fn install_dir(&self) -> PathBuf {
        self.install_dir.clone()
    }
}

/// Paths derived from configuration, the running executable and the user's
/// platform directories.
#[derive(Debug, Clone)]
pub struct SystemLocations {
    bundled: PathBuf,
    install_dir: PathBuf,
}

impl SystemLocations {
    pub fn from_config(config: &AppConfig) -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));

        Self::resolve(config, &exe_dir)
    }

    fn resolve(config: &AppConfig, exe_dir: &Path) -> Self {
        let bundle_name = &config.screensaver.bundle_name;

        let bundled = match config.bundled_path() {
            Some(path) if path.is_absolute() => path,
            Some(path) => exe_dir.join(path),
            None => default_resources_dir(exe_dir).join(bundle_name),
        };

        let install_dir = config.install_dir().unwrap_or_else(default_install_dir);

        Self {
            bundled,
            install_dir,
        }
    }
}

impl SaverLocations for SystemLocations {
    fn bundled_path(&self) -> PathBuf {
        self.bundled.clone()
    }

    fn install_dir(&self) -> PathBuf {
        self.install_dir.clone()
    }
}

#[cfg(target_os = "macos")]
fn default_resources_dir(exe_dir: &Path) -> PathBuf {
    // <App>.app/Contents/MacOS/<exe> -> <App>.app/Contents/Resources
    exe_dir.join("..").join("Resources")
}

#[cfg(not(target_os = "macos"))]
fn default_resources_dir(exe_dir: &Path) -> PathBuf {
    exe_dir.to_path_buf()
}

#[cfg(target_os = "macos")]
fn default_install_dir() -> PathBuf {
    dirs_home()
        .map(|home| home.join("Library").join("Screen Savers"))
        .unwrap_or_else(|| PathBuf::from("Library/Screen Savers"))
}

#[cfg(not(target_os = "macos"))]
fn default_install_dir() -> PathBuf {
    use crate::model::config::{APP_NAME, project_dirs};

    if let Some(project_dirs) = project_dirs() {
        return project_dirs.data_dir().join("screensavers");
    }

    if let Some(home) = dirs_home() {
        return home.join(".local/share").join(APP_NAME).join("screensavers");
    }

    PathBuf::from(".screensavers")
}
