use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::saver::error::{InstallError, Result};

const STAGING_PREFIX: &str = ".saver-staging-";
// Separate subdirectories, so a bundle can never collide with its own backup.
const STAGED_DIR: &str = "new";
const BACKUP_DIR: &str = "old";

/// Copies a bundle into place so the target is either the old copy or a
/// complete new one.
#[derive(Debug, Default)]
pub struct BundleInstaller;

impl BundleInstaller {
    /// Replace `target` with a copy of `source`.
    ///
    /// The copy is staged in a temporary directory next to `target` and then
    /// renamed over it. On failure the previous artifact is restored and the
    /// staging directory is removed.
    pub fn install(source: &Path, target: &Path) -> Result<()> {
        match fs::metadata(source) {
            Err(_) => return Err(InstallError::SourceMissing(source.to_path_buf())),
            Ok(meta) if !meta.is_dir() => {
                return Err(InstallError::NotABundle(source.to_path_buf()));
            }
            Ok(_) => {}
        }

        let parent = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = target.file_name().ok_or_else(|| {
            InstallError::io(
                target,
                io::Error::new(io::ErrorKind::InvalidInput, "target has no file name"),
            )
        })?;

        fs::create_dir_all(parent).map_err(|err| InstallError::io(parent, err))?;

        // Same directory as the target, so the final rename never crosses filesystems.
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(parent)
            .map_err(|err| InstallError::io(parent, err))?;

        let staged_dir = staging.path().join(STAGED_DIR);
        let backup_dir = staging.path().join(BACKUP_DIR);
        for dir in [&staged_dir, &backup_dir] {
            fs::create_dir(dir).map_err(|err| InstallError::io(dir, err))?;
        }

        let staged = staged_dir.join(name);
        copy_tree(source, &staged)?;
        swap_into_place(&staged, target, &backup_dir.join(name))?;

        tracing::debug!(
            "installed {} -> {}",
            source.display(),
            target.display()
        );
        Ok(())
    }
}

fn swap_into_place(staged: &Path, target: &Path, backup: &Path) -> Result<()> {
    let had_previous = fs::symlink_metadata(target).is_ok();

    if had_previous {
        fs::rename(target, backup).map_err(|err| InstallError::io(target, err))?;
    }

    if let Err(err) = fs::rename(staged, target) {
        if had_previous && let Err(restore_err) = fs::rename(backup, target) {
            tracing::error!(
                "failed to restore previous screensaver at {}: {restore_err}",
                target.display()
            );
        }
        return Err(InstallError::io(target, err));
    }

    Ok(())
}

fn copy_tree(source: &Path, dest: &Path) -> Result<()> {
    let walker = WalkBuilder::new(source)
        .standard_filters(false)
        .follow_links(false)
        .build();

    for entry in walker {
        let entry = entry.map_err(|err| walk_error(source, err))?;
        let path = entry.path();
        let Ok(relative) = path.strip_prefix(source) else {
            continue;
        };
        let dest_path = dest_for(dest, relative);

        let Some(file_type) = entry.file_type() else {
            return Err(InstallError::UnsupportedFileType(path.to_path_buf()));
        };

        if file_type.is_dir() {
            fs::create_dir_all(&dest_path).map_err(|err| InstallError::io(&dest_path, err))?;
        } else if file_type.is_file() {
            fs::copy(path, &dest_path).map_err(|err| InstallError::io(path, err))?;
        } else if file_type.is_symlink() {
            copy_symlink(path, &dest_path)?;
        } else {
            return Err(InstallError::UnsupportedFileType(path.to_path_buf()));
        }
    }

    Ok(())
}

fn dest_for(dest: &Path, relative: &Path) -> PathBuf {
    if relative.as_os_str().is_empty() {
        dest.to_path_buf()
    } else {
        dest.join(relative)
    }
}

#[cfg(unix)]
fn copy_symlink(path: &Path, dest_path: &Path) -> Result<()> {
    let link = fs::read_link(path).map_err(|err| InstallError::io(path, err))?;
    std::os::unix::fs::symlink(&link, dest_path).map_err(|err| InstallError::io(dest_path, err))
}

#[cfg(not(unix))]
fn copy_symlink(path: &Path, dest_path: &Path) -> Result<()> {
    fs::copy(path, dest_path)
        .map(|_| ())
        .map_err(|err| InstallError::io(path, err))
}

fn walk_error(root: &Path, err: ignore::Error) -> InstallError {
    let message = err.to_string();
    let io_err = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other(message));
    InstallError::io(root, io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_bundle(root: &Path, marker: &str) {
        fs::create_dir_all(root.join("Contents/Resources")).unwrap();
        fs::write(root.join("Contents/Resources/frame.txt"), marker).unwrap();
        fs::write(root.join(".hidden"), "kept").unwrap();
        fs::write(root.join(".gitignore"), "*\n").unwrap();
    }

    fn staging_leftovers(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .map(|n| n.to_string_lossy().starts_with(STAGING_PREFIX))
                    .unwrap_or(false)
            })
            .collect()
    }

    #[test]
    fn test_fresh_install_creates_intermediate_dirs() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("app/Dreams.saver");
        let target = dir.path().join("a/b/c/Dreams.saver");
        write_bundle(&source, "v1");

        BundleInstaller::install(&source, &target).unwrap();

        assert_eq!(
            fs::read_to_string(target.join("Contents/Resources/frame.txt")).unwrap(),
            "v1"
        );
        assert!(target.join(".hidden").is_file());
        assert!(target.join(".gitignore").is_file());
        assert!(staging_leftovers(target.parent().unwrap()).is_empty());
    }

    #[test]
    fn test_replaces_existing_bundle_completely() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("app/Dreams.saver");
        let target = dir.path().join("savers/Dreams.saver");
        write_bundle(&target, "old");
        fs::write(target.join("stale.txt"), "gone").unwrap();
        write_bundle(&source, "new");

        BundleInstaller::install(&source, &target).unwrap();

        assert_eq!(
            fs::read_to_string(target.join("Contents/Resources/frame.txt")).unwrap(),
            "new"
        );
        assert!(!target.join("stale.txt").exists());
        assert!(staging_leftovers(&dir.path().join("savers")).is_empty());
    }

    #[test]
    fn test_single_file_source_is_rejected() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("Dreams.bin");
        let target = dir.path().join("savers/Dreams.bin");
        fs::write(&source, "payload").unwrap();

        let err = BundleInstaller::install(&source, &target).unwrap_err();

        assert!(matches!(err, InstallError::NotABundle(_)));
        assert!(!target.exists());
    }

    #[test]
    fn test_bundle_named_like_staging_dirs_replaces_cleanly() {
        for name in ["new", "old", "previous"] {
            let dir = TempDir::new().unwrap();
            let source = dir.path().join("app").join(name);
            let target = dir.path().join("savers").join(name);
            write_bundle(&target, "old");
            write_bundle(&source, "new");

            BundleInstaller::install(&source, &target).unwrap();

            assert_eq!(
                fs::read_to_string(target.join("Contents/Resources/frame.txt")).unwrap(),
                "new"
            );
            assert!(staging_leftovers(&dir.path().join("savers")).is_empty());
        }
    }

    #[test]
    fn test_missing_source_leaves_target_untouched() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("savers/Dreams.saver");
        write_bundle(&target, "old");

        let err = BundleInstaller::install(&dir.path().join("nope.saver"), &target).unwrap_err();

        assert!(matches!(err, InstallError::SourceMissing(_)));
        assert_eq!(
            fs::read_to_string(target.join("Contents/Resources/frame.txt")).unwrap(),
            "old"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_recreated() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("app/Dreams.saver");
        let target = dir.path().join("savers/Dreams.saver");
        write_bundle(&source, "v1");
        std::os::unix::fs::symlink("Contents/Resources", source.join("Current")).unwrap();

        BundleInstaller::install(&source, &target).unwrap();

        let link = fs::read_link(target.join("Current")).unwrap();
        assert_eq!(link, PathBuf::from("Contents/Resources"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_copy_keeps_previous_bundle_and_cleans_staging() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("app/Dreams.saver");
        let target = dir.path().join("savers/Dreams.saver");
        write_bundle(&target, "old");
        write_bundle(&source, "new");
        let _socket = std::os::unix::net::UnixListener::bind(source.join("control.sock")).unwrap();

        let err = BundleInstaller::install(&source, &target).unwrap_err();

        assert!(matches!(err, InstallError::UnsupportedFileType(_)));
        assert_eq!(
            fs::read_to_string(target.join("Contents/Resources/frame.txt")).unwrap(),
            "old"
        );
        assert!(staging_leftovers(&dir.path().join("savers")).is_empty());
    }
}
