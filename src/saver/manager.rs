use crate::model::version::Version;
use crate::saver::decision::{self, InstallAction};
use crate::saver::installer::BundleInstaller;
use crate::saver::locations::SaverLocations;
use crate::saver::resolver::VersionResolver;

/// What `install_if_needed` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed { version: Version },
    Updated { from: Version, to: Version },
    /// Installed copy is at least as new as the bundle.
    UpToDate { installed: Option<Version> },
    /// No usable bundled version, so nothing was attempted.
    Skipped,
    Failed { action: InstallAction, reason: String },
}

impl InstallOutcome {
    pub fn wrote_files(&self) -> bool {
        matches!(self, Self::Installed { .. } | Self::Updated { .. })
    }
}

/// Handle the host builds once at startup and keeps for status queries.
#[derive(Debug)]
pub struct ScreensaverInstaller<L: SaverLocations> {
    locations: L,
    last_outcome: Option<InstallOutcome>,
}

impl<L: SaverLocations> ScreensaverInstaller<L> {
    pub fn new(locations: L) -> Self {
        Self {
            locations,
            last_outcome: None,
        }
    }

    pub fn locations(&self) -> &L {
        &self.locations
    }

    /// Install or update the screensaver when the bundled copy is newer.
    ///
    /// Repeated calls with an unchanged bundle perform no writes.
    pub fn install_if_needed(&mut self) -> InstallOutcome {
        let installed = self.installed_version();
        let bundled = self.bundled_version();
        let action = decision::decide(self.is_installed(), installed.as_ref(), bundled.as_ref());

        tracing::info!(
            "screensaver check: installed={} bundled={} action={}",
            display_version(installed.as_ref()),
            display_version(bundled.as_ref()),
            action.label()
        );

        let outcome = match (action, bundled) {
            (InstallAction::None, None) => InstallOutcome::Skipped,
            (InstallAction::None, Some(_)) => InstallOutcome::UpToDate { installed },
            (action, Some(bundled)) => match self.try_install() {
                Ok(()) => match (action, installed) {
                    (InstallAction::Update, Some(from)) => {
                        InstallOutcome::Updated { from, to: bundled }
                    }
                    _ => InstallOutcome::Installed { version: bundled },
                },
                Err(reason) => InstallOutcome::Failed { action, reason },
            },
            // decide() never asks for a copy without a bundled version
            (action, None) => InstallOutcome::Failed {
                action,
                reason: "bundled version unavailable".to_string(),
            },
        };

        self.last_outcome = Some(outcome.clone());
        outcome
    }

    pub fn is_installed(&self) -> bool {
        std::fs::symlink_metadata(self.locations.installed_path()).is_ok()
    }

    pub fn installed_version(&self) -> Option<Version> {
        VersionResolver::new(&self.locations).installed_version()
    }

    pub fn bundled_version(&self) -> Option<Version> {
        VersionResolver::new(&self.locations).bundled_version()
    }

    pub fn should_update(&self) -> bool {
        decision::should_update(
            self.installed_version().as_ref(),
            self.bundled_version().as_ref(),
        )
    }

    /// Copy the bundled screensaver over whatever is installed.
    ///
    /// Returns false and leaves the previous install alone on any failure.
    pub fn install_screensaver(&self) -> bool {
        self.try_install().is_ok()
    }

    pub fn status_notifications(&self) -> Vec<String> {
        let mut notices = Vec::new();

        if let Some(outcome) = self.last_outcome.as_ref() {
            notices.push(match outcome {
                InstallOutcome::Installed { version } => {
                    format!("screensaver: installed {version}")
                }
                InstallOutcome::Updated { from, to } => {
                    format!("screensaver: updated {from} -> {to}")
                }
                InstallOutcome::UpToDate { installed } => format!(
                    "screensaver: up to date ({})",
                    display_version(installed.as_ref())
                ),
                InstallOutcome::Skipped => {
                    "screensaver: bundled version unavailable, install skipped".to_string()
                }
                InstallOutcome::Failed { action, reason } => {
                    format!("screensaver: {} failed: {reason}", action.label())
                }
            });
        }

        notices.push(format!(
            "screensaver {} ({})",
            if self.is_installed() {
                "present"
            } else {
                "missing"
            },
            self.locations.installed_path().display()
        ));
        notices
    }

    fn try_install(&self) -> Result<(), String> {
        let source = self.locations.bundled_path();
        let target = self.locations.installed_path();

        match BundleInstaller::install(&source, &target) {
            Ok(()) => {
                tracing::info!("screensaver installed at {}", target.display());
                Ok(())
            }
            Err(err) => {
                tracing::error!("screensaver install failed: {err}");
                Err(err.to_string())
            }
        }
    }
}

fn display_version(version: Option<&Version>) -> String {
    version
        .map(Version::to_string)
        .unwrap_or_else(|| "none".to_string())
}
