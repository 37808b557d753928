use crate::model::version::Version;
use crate::saver::locations::SaverLocations;
use crate::saver::manifest;

/// Reads declared versions without ever failing the caller.
#[derive(Debug)]
pub struct VersionResolver<'a, L: SaverLocations> {
    locations: &'a L,
}

impl<'a, L: SaverLocations> VersionResolver<'a, L> {
    pub fn new(locations: &'a L) -> Self {
        Self { locations }
    }

    pub fn installed_version(&self) -> Option<Version> {
        let path = self.locations.installed_path();
        if !path.exists() {
            tracing::debug!("no screensaver installed at {}", path.display());
            return None;
        }

        match manifest::read_version(&path) {
            Ok(version) => {
                tracing::debug!("installed screensaver version {version}");
                Some(version)
            }
            Err(err) => {
                tracing::debug!("installed screensaver version unavailable: {err}");
                None
            }
        }
    }

    pub fn bundled_version(&self) -> Option<Version> {
        match manifest::read_version(&self.locations.bundled_path()) {
            Ok(version) => {
                tracing::debug!("bundled screensaver version {version}");
                Some(version)
            }
            Err(err) => {
                tracing::warn!("bundled screensaver version unavailable: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saver::locations::FixedLocations;
    use crate::saver::manifest::MANIFEST_FILE;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn bundle(root: &Path, version: &str) {
        fs::create_dir_all(root).unwrap();
        fs::write(
            root.join(MANIFEST_FILE),
            format!("name = \"Dreams\"\nversion = \"{version}\"\n"),
        )
        .unwrap();
    }

    fn fixed(dir: &TempDir) -> FixedLocations {
        FixedLocations::new(dir.path().join("app/Dreams.saver"), dir.path().join("savers"))
    }

    #[test]
    fn test_resolves_both_versions() {
        let dir = TempDir::new().unwrap();
        let locations = fixed(&dir);
        bundle(&locations.bundled_path(), "1.2.1");
        bundle(&locations.installed_path(), "1.0");

        let resolver = VersionResolver::new(&locations);

        assert_eq!(resolver.bundled_version().unwrap(), "1.2.1");
        assert_eq!(resolver.installed_version().unwrap(), "1.0");
    }

    #[test]
    fn test_missing_artifacts_resolve_to_none() {
        let dir = TempDir::new().unwrap();
        let locations = fixed(&dir);

        let resolver = VersionResolver::new(&locations);

        assert!(resolver.bundled_version().is_none());
        assert!(resolver.installed_version().is_none());
    }

    #[test]
    fn test_unreadable_installed_metadata_resolves_to_none() {
        let dir = TempDir::new().unwrap();
        let locations = fixed(&dir);
        fs::create_dir_all(locations.installed_path()).unwrap();
        fs::write(locations.installed_path().join(MANIFEST_FILE), "garbage").unwrap();

        assert!(VersionResolver::new(&locations).installed_version().is_none());
    }
}
