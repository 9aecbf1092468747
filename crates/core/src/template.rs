//! `{key}` interpolation of collected answers into prompts.

use serde_json::Value;

use crate::record::Record;

/// Replaces every `{key}` placeholder in `template` with the matching value
/// from `record`.
///
/// Keys are looked up at the top level first, then inside grouped objects
/// one level down. Placeholders without a value, and braces that don't form
/// a placeholder (JSON samples in prompts, for one), are kept verbatim.
pub fn render(template: &str, record: &Record) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let key = after_open
            .find('}')
            .map(|close| &after_open[..close])
            .filter(|key| is_key(key));
        let Some(key) = key else {
            out.push('{');
            rest = after_open;
            continue;
        };
        match lookup(record, key) {
            Some(value) => out.push_str(&value),
            None => {
                out.push('{');
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &after_open[key.len() + 1..];
    }
    out.push_str(rest);
    out
}

/// Finds `key` in `record` and returns it as display text.
pub fn lookup(record: &Record, key: &str) -> Option<String> {
    let value = record.get(key).or_else(|| {
        record
            .values()
            .filter_map(Value::as_object)
            .find_map(|group| group.get(key))
    })?;
    Some(match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

#[inline]
fn is_key(key: &str) -> bool {
    !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
