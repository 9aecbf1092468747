//! The game-brief script: free dialog until the model emits the brief as
//! JSON, then a review of the result by a fresh session.

use intake_core::collect::{Brief, Strategy};
use intake_core::record::Record;
use intake_core::template::lookup;
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};

/// The first user turn of the dialog.
pub const OPENING: &str = "Hello";

/// The only user turn of the review session.
pub const REVIEW_REQUEST: &str = "Check the brief for consistency";

/// A basic technical brief for a game.
///
/// Only the JSON Schema of this type is used at runtime, as part of the
/// system prompt. Collected records are kept as plain JSON objects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GameBrief {
    /// Game engine.
    #[schemars(description = "The game engine.")]
    pub engine: String,
    /// Genre or genres.
    #[schemars(description = "The genre or genres of the game.")]
    pub genre: String,
    /// Age rating.
    #[schemars(description = "The age rating, e.g. 16+.")]
    pub age_rating: String,
    /// Reference games.
    #[schemars(description = "Games to use as a reference.")]
    pub reference_games: String,
}

const FIELDS: [(&str, &str); 4] = [
    ("engine", "Game engine"),
    ("genre", "Genre or genres"),
    ("age_rating", "Age rating"),
    ("reference_games", "Reference games"),
];

/// Returns the system prompt for the collecting session.
pub fn system_prompt() -> String {
    let schema = serde_json::to_string_pretty(&schema_for!(GameBrief))
        .unwrap_or_default();
    include_str!("./prompts/brief_system.md").replace("{{SCHEMA}}", &schema)
}

/// Returns the collection strategy for the brief.
#[inline]
pub fn strategy() -> Strategy {
    Strategy::JsonUntilValid(Brief {
        opening: OPENING.to_owned(),
    })
}

/// Formats a collected brief as a numbered list. Missing fields are shown as
/// `not specified`.
pub fn numbered_list(record: &Record) -> String {
    FIELDS
        .iter()
        .enumerate()
        .map(|(idx, (key, title))| {
            let value = lookup(record, key)
                .unwrap_or_else(|| "not specified".to_owned());
            format!("{}. {title} - {value}", idx + 1)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns the system prompt for the review session.
pub fn review_prompt(record: &Record) -> String {
    include_str!("./prompts/review_system.md")
        .replace("{{BRIEF}}", &numbered_list(record))
}
