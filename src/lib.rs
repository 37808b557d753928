//! Installs or updates a bundled screensaver into the user's screensaver
//! directory, only when the bundled copy is newer than the installed one.
//!
//! Hosts build a [`ScreensaverInstaller`] once at startup with their
//! [`SaverLocations`] and call [`ScreensaverInstaller::install_if_needed`].

pub mod model;
pub mod saver;

pub use model::config::AppConfig;
pub use model::version::Version;
pub use saver::decision::InstallAction;
pub use saver::error::InstallError;
pub use saver::locations::{FixedLocations, SaverLocations, SystemLocations};
pub use saver::{InstallOutcome, ScreensaverInstaller};
