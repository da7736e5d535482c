//! Tests for manifest formats and persistence

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use reposync_core::manifest::{self, ManifestFormat};
use reposync_core::{Error, RepositoryRecord};
use reposync_fs::{NormalizedPath, RelativePath, RobustnessConfig};
use proptest::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn sample_records() -> Vec<RepositoryRecord> {
    let root = NormalizedPath::new("/srv/code");
    let mut full = RepositoryRecord::new(&root, &RelativePath::normalize("app/api"))
        .with_remote("origin", "https://x/api.git");
    full.user_name = Some("Build Bot".into());
    full.user_email = Some("bot@example.com".into());
    full.status_date = Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
    full.is_remote_accessible = Some(false);
    full.system_filter = Some("DEV-*,!DEV-TEST".into());

    let minimal = RepositoryRecord::new(&root, &RelativePath::normalize("lib/x & y"))
        .with_remote("upstream", "git@example.com:team/x.git");

    vec![full, minimal]
}

#[rstest]
#[case(ManifestFormat::Json)]
#[case(ManifestFormat::Csv)]
#[case(ManifestFormat::Xml)]
#[case(ManifestFormat::Toml)]
#[case(ManifestFormat::Yaml)]
fn test_round_trip(#[case] format: ManifestFormat) {
    let records = sample_records();

    let encoded = format.encode(&records).unwrap();
    let decoded = format.decode(&encoded).unwrap();

    assert_eq!(decoded, records);
}

#[rstest]
#[case(ManifestFormat::Json)]
#[case(ManifestFormat::Csv)]
#[case(ManifestFormat::Xml)]
#[case(ManifestFormat::Toml)]
#[case(ManifestFormat::Yaml)]
fn test_padded_values_survive(#[case] format: ManifestFormat) {
    let root = NormalizedPath::new("/srv/code");
    let mut record = RepositoryRecord::new(&root, &RelativePath::normalize("team/proj "))
        .with_remote("origin", "  https://h/spaced.git  ");
    record.user_name = Some(" Build Bot\t".into());

    let decoded = format.decode(&format.encode(&[record.clone()]).unwrap()).unwrap();

    assert_eq!(decoded, vec![record]);
}

fn relative_path() -> impl Strategy<Value = RelativePath> {
    prop::collection::vec("[a-zA-Z0-9 _.&'-]{1,10}", 1..4)
        .prop_map(|segments| RelativePath::normalize(&segments.join("/")))
}

proptest! {
    #[test]
    fn test_paths_and_urls_survive_every_format(
        relative in relative_path(),
        url in "[ \t]{0,2}[a-zA-Z0-9:/@._~&<>'\"#%+=-]{0,30}[ \t]{0,2}",
    ) {
        let record = RepositoryRecord::new(&NormalizedPath::new("/srv/code"), &relative)
            .with_remote("origin", &url);

        for format in ManifestFormat::ALL {
            let encoded = format.encode(std::slice::from_ref(&record)).unwrap();
            let decoded = format.decode(&encoded).unwrap();

            prop_assert_eq!(decoded.len(), 1, "{}: {}", format, encoded);
            prop_assert_eq!(&decoded[0].relative_path, &record.relative_path, "{}", format);
            prop_assert_eq!(&decoded[0].remote_url, &record.remote_url, "{}", format);
        }
    }
}

#[rstest]
#[case(ManifestFormat::Json)]
#[case(ManifestFormat::Csv)]
#[case(ManifestFormat::Xml)]
#[case(ManifestFormat::Toml)]
#[case(ManifestFormat::Yaml)]
fn test_empty_manifest(#[case] format: ManifestFormat) {
    assert_eq!(format.decode("  \n\t ").unwrap(), Vec::new());

    let encoded = format.encode(&[]).unwrap();
    assert_eq!(format.decode(&encoded).unwrap(), Vec::new());
}

#[test]
fn test_csv_writes_every_column() {
    let encoded = ManifestFormat::Csv.encode(&sample_records()[1..]).unwrap();

    let header = encoded.lines().next().unwrap();
    assert_eq!(
        header,
        "RootPath,RelativePath,FullPath,RemoteName,RemoteUrl,UserName,UserEmail,StatusDate,IsRemoteAccessible,SystemFilter"
    );
}

#[test]
fn test_csv_unreadable_date_is_unknown() {
    let content = "RelativePath,RemoteUrl,StatusDate\napp,https://x/app.git,yesterday\n";

    let records = ManifestFormat::Csv.decode(content).unwrap();

    assert_eq!(records[0].relative_path, "app");
    assert_eq!(records[0].status_date, None);
    assert_eq!(records[0].user_name, None);
}

#[test]
fn test_xml_layout() {
    let encoded = ManifestFormat::Xml.encode(&sample_records()).unwrap();

    assert!(encoded.contains("<Repositories>"), "got: {encoded}");
    assert_eq!(encoded.matches("<Repository>").count(), 2, "got: {encoded}");
    assert!(encoded.contains("<RelativePath>app/api</RelativePath>"), "got: {encoded}");
}

#[test]
fn test_toml_layout() {
    let encoded = ManifestFormat::Toml.encode(&sample_records()).unwrap();
    assert_eq!(encoded.matches("[[Repository]]").count(), 2, "got: {encoded}");
}

#[test]
fn test_json_uses_pascal_case_and_omits_unknowns() {
    let encoded = ManifestFormat::Json.encode(&sample_records()[1..]).unwrap();

    assert!(encoded.contains("\"RelativePath\": \"lib/x & y\""), "got: {encoded}");
    assert!(!encoded.contains("UserName"), "got: {encoded}");
}

#[test]
fn test_json_single_object_is_accepted() {
    let content = r#"{ "RelativePath": "app/api", "RemoteUrl": "https://x/api.git" }"#;

    let records = ManifestFormat::Json.decode(content).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].remote_url, "https://x/api.git");
    assert_eq!(records[0].root_path, "");
}

#[rstest]
#[case("repos.json", Some(ManifestFormat::Json))]
#[case("repos.CSV", Some(ManifestFormat::Csv))]
#[case("repos.xml", Some(ManifestFormat::Xml))]
#[case("repos.toml", Some(ManifestFormat::Toml))]
#[case("repos.yml", Some(ManifestFormat::Yaml))]
#[case("repos.yaml", Some(ManifestFormat::Yaml))]
#[case("repos.txt", None)]
#[case("repos", None)]
fn test_format_from_extension(#[case] file: &str, #[case] expected: Option<ManifestFormat>) {
    assert_eq!(ManifestFormat::from_extension(Path::new(file)), expected);
}

#[test]
fn test_format_resolution_order() {
    let path = Path::new("share/repos.csv");
    assert_eq!(
        ManifestFormat::resolve(path, Some(ManifestFormat::Xml), ManifestFormat::Json),
        ManifestFormat::Xml
    );
    assert_eq!(
        ManifestFormat::resolve(path, None, ManifestFormat::Json),
        ManifestFormat::Csv
    );
    assert_eq!(
        ManifestFormat::resolve(Path::new("share/repos"), None, ManifestFormat::Yaml),
        ManifestFormat::Yaml
    );
}

#[test]
fn test_format_names() {
    assert_eq!("XML".parse::<ManifestFormat>().unwrap(), ManifestFormat::Xml);
    assert_eq!(ManifestFormat::Toml.to_string(), "toml");
    assert!(matches!(
        "ini".parse::<ManifestFormat>(),
        Err(Error::UnsupportedFormat { value }) if value == "ini"
    ));
}

#[test]
fn test_save_and_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("share").join("repositories.yaml");
    let records = sample_records();

    manifest::save(&path, &records, ManifestFormat::Yaml, RobustnessConfig::no_retry()).unwrap();
    let loaded = manifest::load(&path, ManifestFormat::Yaml).unwrap();

    assert_eq!(loaded, records);
}

#[test]
fn test_load_parse_failure_names_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("repositories.json");
    fs::write(&path, "{ not json").unwrap();

    let result = manifest::load(&path, ManifestFormat::Json);

    match result {
        Err(Error::ManifestParse { path: reported, format, .. }) => {
            assert_eq!(reported, path);
            assert_eq!(format, "json");
        }
        other => panic!("expected ManifestParse, got {other:?}"),
    }
}
