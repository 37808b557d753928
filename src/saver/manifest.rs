use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::model::version::Version;
use crate::saver::error::{InstallError, Result};

pub const MANIFEST_FILE: &str = "saver.toml";
pub const INFO_PLIST: &str = "Contents/Info.plist";

const SHORT_VERSION_KEY: &str = "CFBundleShortVersionString";
const BUNDLE_VERSION_KEY: &str = "CFBundleVersion";

static PLIST_STRING_ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<key>\s*([^<]+?)\s*</key>\s*<string>\s*([^<]*?)\s*</string>")
        .expect("valid plist entry regex")
});

/// `saver.toml` at the root of a bundle.
#[derive(Debug, Clone, Deserialize)]
pub struct SaverManifest {
    pub name: String,
    pub version: String,
}

/// Where an artifact declares its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSource {
    Manifest(PathBuf),
    InfoPlist(PathBuf),
}

impl MetadataSource {
    /// Pick the first metadata file present in `artifact`.
    pub fn locate(artifact: &Path) -> Option<Self> {
        let manifest = artifact.join(MANIFEST_FILE);
        if manifest.is_file() {
            return Some(Self::Manifest(manifest));
        }

        let plist = artifact.join(INFO_PLIST);
        if plist.is_file() {
            return Some(Self::InfoPlist(plist));
        }

        None
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Manifest(path) | Self::InfoPlist(path) => path,
        }
    }

    fn declared_version(&self) -> Result<String> {
        let path = self.path();
        let raw = fs::read_to_string(path).map_err(|err| InstallError::metadata(path, err))?;

        match self {
            Self::Manifest(_) => toml::from_str::<SaverManifest>(&raw)
                .map(|manifest| manifest.version)
                .map_err(|err| InstallError::metadata(path, err)),
            Self::InfoPlist(_) => plist_version(&raw)
                .ok_or_else(|| InstallError::metadata(path, "no bundle version key")),
        }
    }
}

/// Read the version an artifact declares.
pub fn read_version(artifact: &Path) -> Result<Version> {
    let source = MetadataSource::locate(artifact)
        .ok_or_else(|| InstallError::metadata(artifact, "no saver.toml or Info.plist"))?;

    let declared = source.declared_version()?;
    Version::parse(&declared).ok_or_else(|| {
        InstallError::metadata(source.path(), format!("malformed version {declared:?}"))
    })
}

fn plist_version(raw: &str) -> Option<String> {
    let mut bundle_version = None;

    for caps in PLIST_STRING_ENTRY_RE.captures_iter(raw) {
        let value = caps[2].to_string();
        match &caps[1] {
            SHORT_VERSION_KEY => return Some(value),
            BUNDLE_VERSION_KEY if bundle_version.is_none() => bundle_version = Some(value),
            _ => {}
        }
    }

    bundle_version
}
