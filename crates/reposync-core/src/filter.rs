//! Per-record system filters
//!
//! A filter is a comma-separated list of machine patterns. `!` marks an
//! exclusion. A pattern ending in `*` matches by prefix, anything else must
//! match exactly. Matching ignores ASCII case and whitespace around items.

/// Whether a record carrying `filter` applies to the machine `machine`.
///
/// Exclusions always win. Without inclusion patterns every machine that is
/// not excluded matches.
pub fn matches(filter: Option<&str>, machine: &str) -> bool {
    let filter = filter.map(str::trim).unwrap_or_default();
    if filter.is_empty() || filter == "*" {
        return true;
    }

    let mut includes = Vec::new();
    let mut excludes = Vec::new();
    for item in filter.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        match item.strip_prefix('!') {
            Some(pattern) => excludes.push(pattern.trim()),
            None => includes.push(item),
        }
    }

    if excludes
        .iter()
        .any(|pattern| !pattern.is_empty() && pattern_matches(pattern, machine))
    {
        return false;
    }

    includes.is_empty() || includes.iter().any(|pattern| pattern_matches(pattern, machine))
}

fn pattern_matches(pattern: &str, machine: &str) -> bool {
    let machine = machine.trim().to_lowercase();
    let pattern = pattern.to_lowercase();
    match pattern.strip_suffix('*') {
        Some(prefix) => machine.starts_with(prefix),
        None => machine == pattern,
    }
}
