//! XML manifests: `<Repositories>` holding one `<Repository>` per record.
//!
//! The quick-xml deserializer trims whitespace next to tags. Leading and
//! trailing whitespace of a value is therefore written as character
//! references, which survive the trim and decode back verbatim.

use serde::{Deserialize, Serialize};

use crate::record::RepositoryRecord;

#[derive(Serialize, Deserialize)]
#[serde(rename = "Repositories")]
struct Repositories {
    #[serde(rename = "Repository", default)]
    repositories: Vec<RepositoryRecord>,
}

pub(super) fn encode(records: &[RepositoryRecord]) -> Result<String, String> {
    let document = Repositories {
        repositories: records.to_vec(),
    };

    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    serializer.indent(' ', 2);
    document
        .serialize(serializer)
        .map_err(|e| e.to_string())?;

    Ok(format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n{}\n",
        protect_padding(&body)
    ))
}

pub(super) fn decode(content: &str) -> Result<Vec<RepositoryRecord>, String> {
    quick_xml::de::from_str::<Repositories>(content)
        .map(|document| document.repositories)
        .map_err(|e| e.to_string())
}

/// Rewrite outer whitespace of every leaf value as `&#N;` references.
fn protect_padding(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;
    let mut after_start_tag = false;

    while let Some(lt) = rest.find('<') {
        let text = &rest[..lt];
        if after_start_tag && rest[lt..].starts_with("</") {
            push_value(&mut out, text);
        } else {
            out.push_str(text);
        }

        let tag_end = rest[lt..].find('>').map_or(rest.len(), |gt| lt + gt + 1);
        let tag = &rest[lt..tag_end];
        out.push_str(tag);
        after_start_tag = !tag.starts_with("</") && !tag.starts_with("<?") && !tag.ends_with("/>");
        rest = &rest[tag_end..];
    }

    out.push_str(rest);
    out
}

fn push_value(out: &mut String, text: &str) {
    let is_space = |c: char| matches!(c, ' ' | '\t' | '\r' | '\n');
    let body_start = text.len() - text.trim_start_matches(is_space).len();
    let body_end = body_start + text[body_start..].trim_end_matches(is_space).len();

    push_references(out, &text[..body_start]);
    out.push_str(&text[body_start..body_end]);
    push_references(out, &text[body_end..]);
}

fn push_references(out: &mut String, padding: &str) {
    for c in padding.chars() {
        out.push_str(&format!("&#{};", u32::from(c)));
    }
}
