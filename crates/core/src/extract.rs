//! Reply cleanup and structured extraction.

use serde_json::{Map, Value};

/// A pair of markers that delimit the model's reasoning inside a reply,
/// such as `<think>` and `</think>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReasoningMarkers {
    start: String,
    end: String,
}

impl ReasoningMarkers {
    /// Creates a marker pair.
    #[inline]
    pub fn new<S: Into<String>, E: Into<String>>(start: S, end: E) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Removes every reasoning span, markers included, and trims the
    /// remaining text.
    ///
    /// Spans may cross lines. A start marker without a matching end marker
    /// is left untouched.
    pub fn strip(&self, text: &str) -> String {
        if self.start.is_empty() || self.end.is_empty() {
            return text.trim().to_owned();
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start_idx) = rest.find(&self.start) {
            let after_start = &rest[start_idx + self.start.len()..];
            let Some(end_idx) = after_start.find(&self.end) else {
                break;
            };
            out.push_str(&rest[..start_idx]);
            rest = &after_start[end_idx + self.end.len()..];
        }
        out.push_str(rest);
        out.trim().to_owned()
    }
}

impl Default for ReasoningMarkers {
    #[inline]
    fn default() -> Self {
        Self::new("<think>", "</think>")
    }
}

/// The result of trying to read a reply as a structured record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extraction {
    /// The reply was a JSON object.
    Structured(Map<String, Value>),
    /// The reply was anything else, kept as text.
    RawText(String),
}

impl Extraction {
    /// Returns `true` if the reply carried the final structured record.
    #[inline]
    pub fn is_final(&self) -> bool {
        matches!(self, Extraction::Structured(_))
    }

    /// Returns the structured record, if any.
    #[inline]
    pub fn into_record(self) -> Option<Map<String, Value>> {
        match self {
            Extraction::Structured(record) => Some(record),
            Extraction::RawText(_) => None,
        }
    }
}

/// Strips reasoning spans from `reply` and tries to parse the rest as a
/// JSON object.
///
/// On failure the cleaned text is returned as [`Extraction::RawText`].
/// Only objects count as records; arrays and scalars are kept as text.
pub fn extract_structured(
    reply: &str,
    markers: &ReasoningMarkers,
) -> Extraction {
    let cleaned = markers.strip(reply);
    match parse_object(&cleaned) {
        Some(record) => Extraction::Structured(record),
        None => Extraction::RawText(cleaned),
    }
}

pub(crate) fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(record)) => Some(record),
        Ok(other) => {
            debug!("reply is JSON but not an object: {other}");
            None
        }
        Err(_) => None,
    }
}
