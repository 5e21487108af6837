//! Settings File Resolution
//!
//! A `.verilog-format.properties` next to the document beats the globally
//! configured settings file. The filesystem is consulted on every request.

use std::path::{Path, PathBuf};

/// Settings file looked up in the document's directory
pub const LOCAL_SETTINGS_FILE: &str = ".verilog-format.properties";

/// Where the settings passed with `-s` came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    Local(PathBuf),
    Global(PathBuf),
}

impl SettingsSource {
    pub fn path(&self) -> &Path {
        match self {
            SettingsSource::Local(path) | SettingsSource::Global(path) => path,
        }
    }
}

/// Pick the settings file for a document.
///
/// The global path is used as configured; whether it exists is left for the
/// formatter to report.
pub fn resolve_settings_file(
    document_path: Option<&Path>,
    global: Option<&Path>,
) -> Option<SettingsSource> {
    let local = document_path
        .and_then(Path::parent)
        .map(|dir| dir.join(LOCAL_SETTINGS_FILE))
        .filter(|candidate| candidate.is_file());

    if let Some(local) = local {
        log::info!("Local settings found: {}", local.display());
        return Some(SettingsSource::Local(local));
    }

    let global = global.filter(|p| !p.as_os_str().is_empty())?;
    log::info!("Global settings found: {}", global.display());
    Some(SettingsSource::Global(global.to_path_buf()))
}
