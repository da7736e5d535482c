//! Settings and machine identity for a command run
//!
//! Flags override settings, and settings override what the host reports.

use std::env;
use std::fs;
use std::path::Path;

use reposync_core::Settings;

use crate::error::Result;

const HOSTNAME_FILE: &str = "/etc/hostname";
const FALLBACK_MACHINE: &str = "localhost";

/// Load settings from `explicit`, or from the per-user settings file.
///
/// Missing files yield defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match Settings::default_path() {
            Some(path) => path,
            None => {
                tracing::debug!("No config directory on this platform, using default settings");
                return Ok(Settings::default());
            }
        },
    };

    tracing::debug!(path = %path.display(), "Loading settings");
    Ok(Settings::load(&path)?)
}

/// Resolve the identity matched against system filters.
pub fn resolve_machine(flag: Option<&str>, settings: &Settings) -> String {
    machine_identity(
        flag,
        settings.machine_name.as_deref(),
        |key| env::var(key).ok(),
        Path::new(HOSTNAME_FILE),
    )
}

fn machine_identity(
    flag: Option<&str>,
    configured: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
    hostname_file: &Path,
) -> String {
    let non_empty = |value: &str| {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    };

    flag.and_then(non_empty)
        .or_else(|| configured.and_then(non_empty))
        .or_else(|| {
            ["COMPUTERNAME", "HOSTNAME"]
                .into_iter()
                .find_map(|key| lookup(key).as_deref().and_then(non_empty))
        })
        .or_else(|| {
            fs::read_to_string(hostname_file)
                .ok()
                .as_deref()
                .and_then(non_empty)
        })
        .unwrap_or_else(|| FALLBACK_MACHINE.to_string())
}
