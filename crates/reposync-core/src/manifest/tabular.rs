//! CSV manifests
//!
//! Every column is always written; an empty cell means the value is unknown.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::RepositoryRecord;

const HEADERS: [&str; 10] = [
    "RootPath",
    "RelativePath",
    "FullPath",
    "RemoteName",
    "RemoteUrl",
    "UserName",
    "UserEmail",
    "StatusDate",
    "IsRemoteAccessible",
    "SystemFilter",
];

/// Flat row with every cell as text.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Row {
    root_path: String,
    relative_path: String,
    full_path: String,
    remote_name: String,
    remote_url: String,
    user_name: String,
    user_email: String,
    status_date: String,
    is_remote_accessible: String,
    system_filter: String,
}

impl From<&RepositoryRecord> for Row {
    fn from(record: &RepositoryRecord) -> Self {
        Self {
            root_path: record.root_path.clone(),
            relative_path: record.relative_path.clone(),
            full_path: record.full_path.clone(),
            remote_name: record.remote_name.clone(),
            remote_url: record.remote_url.clone(),
            user_name: record.user_name.clone().unwrap_or_default(),
            user_email: record.user_email.clone().unwrap_or_default(),
            status_date: record
                .status_date
                .map(|date| date.to_rfc3339())
                .unwrap_or_default(),
            is_remote_accessible: record
                .is_remote_accessible
                .map(|accessible| accessible.to_string())
                .unwrap_or_default(),
            system_filter: record.system_filter.clone().unwrap_or_default(),
        }
    }
}

impl Row {
    fn into_record(self) -> RepositoryRecord {
        RepositoryRecord {
            status_date: parse_date(&self.status_date, &self.relative_path),
            is_remote_accessible: parse_bool(&self.is_remote_accessible),
            root_path: self.root_path,
            relative_path: self.relative_path,
            full_path: self.full_path,
            remote_name: self.remote_name,
            remote_url: self.remote_url,
            user_name: non_empty(self.user_name),
            user_email: non_empty(self.user_email),
            system_filter: non_empty(self.system_filter),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_date(value: &str, relative_path: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc3339(value) {
        Ok(date) => Some(date.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(path = %relative_path, value, error = %e, "Ignoring unreadable StatusDate");
            None
        }
    }
}

pub(super) fn encode(records: &[RepositoryRecord]) -> Result<String, String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADERS).map_err(|e| e.to_string())?;
    for record in records {
        writer
            .serialize(Row::from(record))
            .map_err(|e| e.to_string())?;
    }

    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}

pub(super) fn decode(content: &str) -> Result<Vec<RepositoryRecord>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    reader
        .deserialize::<Row>()
        .map(|row| row.map(Row::into_record).map_err(|e| e.to_string()))
        .collect()
}
