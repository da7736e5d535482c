//! Scan command implementation

use std::path::Path;

use colored::Colorize;
use reposync_core::{ManifestFormat, Settings, manifest};
use reposync_fs::RobustnessConfig;

use crate::error::Result;

/// Run the scan command
///
/// Prints the discovered records (JSON unless `format` says otherwise), or
/// writes them to `output` as a manifest.
pub fn run_scan(
    settings: &Settings,
    path: &Path,
    check_remote: bool,
    output: Option<&Path>,
    format: Option<ManifestFormat>,
) -> Result<()> {
    let engine = super::engine(settings)?;
    let records = engine.scan(path, check_remote && settings.check_remote)?;

    match output {
        Some(output) => {
            let format = ManifestFormat::resolve(output, format, settings.manifest_format);
            manifest::save(output, &records, format, RobustnessConfig::default())?;
            println!(
                "{} Wrote {} records to {} ({})",
                "OK".green().bold(),
                records.len(),
                output.display(),
                format
            );
        }
        None => match format {
            Some(format) => print!("{}", format.encode(&records)?),
            None => println!("{}", serde_json::to_string_pretty(&records)?),
        },
    }

    Ok(())
}
