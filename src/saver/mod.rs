pub mod decision;
pub mod error;
pub mod installer;
pub mod locations;
pub mod manager;
pub mod manifest;
pub mod resolver;

pub use manager::{InstallOutcome, ScreensaverInstaller};
