use crate::errors::ReportError;
use regex::{NoExpand, Regex};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static RATES_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)const rates\s*=\s*\{.*?\};").expect("placeholder pattern is valid"));

/// Replaces the first `const rates = {...};` span with `const rates = <json>;`.
/// Returns `None` when the template has no such span.
pub fn splice_rates(template: &str, rates_json: &str) -> Option<String> {
    if !RATES_PLACEHOLDER.is_match(template) {
        return None;
    }
    let statement = format!("const rates = {rates_json};");
    Some(
        RATES_PLACEHOLDER
            .replace(template, NoExpand(&statement))
            .into_owned(),
    )
}

/// Rewrites `path` in place. The file is left untouched if the placeholder is missing.
pub fn update_file(path: &Path, rates_json: &str) -> Result<(), ReportError> {
    let template = fs::read_to_string(path)?;
    let updated = splice_rates(&template, rates_json)
        .ok_or_else(|| ReportError::PlaceholderMissing(path.to_path_buf()))?;
    fs::write(path, updated)?;
    Ok(())
}
