//! Manifest encoding and persistence
//!
//! A manifest is an ordered list of [`RepositoryRecord`]s. JSON, CSV, XML,
//! TOML and YAML are supported; all use the PascalCase field names of the
//! record. Whitespace-only content is an empty manifest in every format.

mod markup;
mod tabular;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use reposync_fs::{NormalizedPath, RobustnessConfig, io};
use serde::{Deserialize, Serialize};

use crate::record::RepositoryRecord;
use crate::{Error, Result};

/// Serialization format of a manifest file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestFormat {
    #[default]
    Json,
    Csv,
    Xml,
    Toml,
    Yaml,
}

impl ManifestFormat {
    pub const ALL: [Self; 5] = [Self::Json, Self::Csv, Self::Xml, Self::Toml, Self::Yaml];

    /// Detect the format from a file extension (case-insensitive).
    pub fn from_extension(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "xml" => Some(Self::Xml),
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Pick the format for `path`: explicit override, then extension, then `fallback`.
    pub fn resolve(path: &Path, explicit: Option<Self>, fallback: Self) -> Self {
        explicit
            .or_else(|| Self::from_extension(path))
            .unwrap_or(fallback)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Xml => "xml",
            Self::Toml => "toml",
            Self::Yaml => "yaml",
        }
    }

    /// Encode `records` in this format.
    pub fn encode(self, records: &[RepositoryRecord]) -> Result<String> {
        let encoded = match self {
            Self::Json => serde_json::to_string_pretty(records).map_err(|e| e.to_string()),
            Self::Csv => tabular::encode(records),
            Self::Xml => markup::encode(records),
            Self::Toml => toml::to_string_pretty(&TomlManifest {
                repositories: records.to_vec(),
            })
            .map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::to_string(records).map_err(|e| e.to_string()),
        };

        encoded.map_err(|message| Error::ManifestEncode {
            format: self.to_string(),
            message,
        })
    }

    /// Decode records from `content`.
    ///
    /// Returns the codec's message on failure; [`load`] attaches the path.
    pub fn decode(self, content: &str) -> std::result::Result<Vec<RepositoryRecord>, String> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        match self {
            Self::Json => serde_json::from_str::<OneOrMany>(content)
                .map(OneOrMany::into_vec)
                .map_err(|e| e.to_string()),
            Self::Csv => tabular::decode(content),
            Self::Xml => markup::decode(content),
            Self::Toml => toml::from_str::<TomlManifest>(content)
                .map(|manifest| manifest.repositories)
                .map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str::<Option<Vec<RepositoryRecord>>>(content)
                .map(Option::unwrap_or_default)
                .map_err(|e| e.to_string()),
        }
    }
}

impl FromStr for ManifestFormat {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "xml" => Ok(Self::Xml),
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// TOML has no top-level arrays, so records live under `[[Repository]]`.
#[derive(Serialize, Deserialize)]
struct TomlManifest {
    #[serde(rename = "Repository", default)]
    repositories: Vec<RepositoryRecord>,
}

/// Manifests written by hand sometimes hold a single object instead of a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<RepositoryRecord>),
    One(Box<RepositoryRecord>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<RepositoryRecord> {
        match self {
            Self::Many(records) => records,
            Self::One(record) => vec![*record],
        }
    }
}

/// Read and decode the manifest at `path`.
///
/// # Errors
///
/// I/O failures and [`Error::ManifestParse`] are fatal for a sync run.
pub fn load(path: &Path, format: ManifestFormat) -> Result<Vec<RepositoryRecord>> {
    let content = io::read_text(&NormalizedPath::new(path))?;
    let records = format
        .decode(&content)
        .map_err(|message| Error::ManifestParse {
            path: path.to_path_buf(),
            format: format.to_string(),
            message,
        })?;

    tracing::debug!(path = %path.display(), %format, count = records.len(), "Loaded manifest");
    Ok(records)
}

/// Encode `records` and write them atomically to `path`.
pub fn save(
    path: &Path,
    records: &[RepositoryRecord],
    format: ManifestFormat,
    robustness: RobustnessConfig,
) -> Result<()> {
    let content = format.encode(records)?;
    io::write_atomic(&NormalizedPath::new(path), content.as_bytes(), robustness)?;

    tracing::debug!(path = %path.display(), %format, count = records.len(), "Wrote manifest");
    Ok(())
}
