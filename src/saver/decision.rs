use crate::model::version::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallAction {
    /// Nothing installed yet; copy the bundle in.
    Install,
    /// Installed copy is older than the bundle.
    Update,
    None,
}

impl InstallAction {
    pub fn label(&self) -> &'static str {
        match self {
            InstallAction::Install => "install",
            InstallAction::Update => "update",
            InstallAction::None => "no-op",
        }
    }
}

/// True only when both versions are known and the bundle is strictly newer.
pub fn should_update(installed: Option<&Version>, bundled: Option<&Version>) -> bool {
    match (installed, bundled) {
        (Some(installed), Some(bundled)) => bundled > installed,
        _ => false,
    }
}

pub fn decide(
    is_installed: bool,
    installed: Option<&Version>,
    bundled: Option<&Version>,
) -> InstallAction {
    if !is_installed {
        return if bundled.is_some() {
            InstallAction::Install
        } else {
            InstallAction::None
        };
    }

    if should_update(installed, bundled) {
        InstallAction::Update
    } else {
        InstallAction::None
    }
}
