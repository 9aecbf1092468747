//! The structured-data collection loop.
//!
//! A [`Collector`] drives a [`Session`] until a record is complete, using
//! one of two strategies:
//!
//! - [`Strategy::JsonUntilValid`]: free dialog, steered by the session's
//!   system prompt, until the model answers with a JSON object.
//! - [`Strategy::FixedSequence`]: a hardcoded list of questions, each
//!   answer recorded verbatim and available to later prompts as `{key}`.

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use intake_model::Role;
use serde_json::{Map, Value};

use crate::console::{Console, Line, send_with_progress};
use crate::extract::Extraction;
use crate::record::{Record, save_record};
use crate::session::Session;
use crate::template::render;

/// How a [`Collector`] gathers the record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Ask a fixed list of questions.
    FixedSequence(Questionnaire),
    /// Chat until the model emits the record as JSON.
    JsonUntilValid(Brief),
}

/// Settings for [`Strategy::JsonUntilValid`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Brief {
    /// The first user turn, sent before the operator types anything.
    pub opening: String,
}

/// Settings for [`Strategy::FixedSequence`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Questionnaire {
    /// Sections, asked in order.
    pub sections: Vec<Section>,
    /// A prompt sent to the model once everything is collected. The reply
    /// is shown but not stored.
    pub summary: Option<String>,
}

impl Questionnaire {
    /// Creates an empty questionnaire.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a section.
    #[inline]
    pub fn section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Sets the summary prompt.
    #[inline]
    pub fn with_summary<S: Into<String>>(mut self, summary: S) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// A titled group of steps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    /// Shown to the operator before the section starts.
    pub title: String,
    /// If set, answers are stored under this key instead of at the top
    /// level of the record.
    pub group: Option<String>,
    /// A prompt sent to the model when the section starts, so it knows what
    /// comes next. The reply is shown to the operator.
    pub intro: Option<String>,
    /// Steps, in order.
    pub steps: Vec<Step>,
}

impl Section {
    /// Creates an empty section.
    #[inline]
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self {
            title: title.into(),
            group: None,
            intro: None,
            steps: vec![],
        }
    }

    /// Stores the answers of this section under `group`.
    #[inline]
    pub fn in_group<S: Into<String>>(mut self, group: S) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Sets the intro prompt.
    #[inline]
    pub fn with_intro<S: Into<String>>(mut self, intro: S) -> Self {
        self.intro = Some(intro.into());
        self
    }

    /// Appends an [`Step::Ask`] step.
    #[inline]
    pub fn ask<K: Into<String>, Q: Into<String>>(
        mut self,
        key: K,
        question: Q,
    ) -> Self {
        self.steps.push(Step::Ask {
            key: key.into(),
            question: question.into(),
        });
        self
    }

    /// Appends a [`Step::Derive`] step.
    #[inline]
    pub fn derive<K: Into<String>, P: Into<String>>(
        mut self,
        key: K,
        prompt: P,
    ) -> Self {
        self.steps.push(Step::Derive {
            key: key.into(),
            prompt: prompt.into(),
        });
        self
    }
}

/// One field of a [`Questionnaire`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Ask the operator and record the answer verbatim.
    Ask {
        /// Record key.
        key: String,
        /// Question template, may reference earlier answers as `{key}`.
        question: String,
    },
    /// Ask the model and record its reply.
    Derive {
        /// Record key.
        key: String,
        /// Prompt template, may reference earlier answers as `{key}`.
        prompt: String,
    },
}

/// A finished collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collected {
    /// The record, always a JSON object.
    pub record: Value,
    /// Where the record was written, if it was.
    pub persisted: Option<PathBuf>,
}

/// How a collection run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The record is complete.
    Completed(Collected),
    /// The operator input ended first.
    Aborted,
}

/// Runs a collection [`Strategy`] against a session and a console.
#[derive(Clone, Debug)]
pub struct Collector {
    strategy: Strategy,
    output: Option<PathBuf>,
}

impl Collector {
    /// Creates a collector that keeps the record in memory only.
    #[inline]
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            output: None,
        }
    }

    /// Writes the finished record to `path`.
    #[inline]
    pub fn with_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Runs the collection loop to completion.
    ///
    /// Model and disk failures are reported on the console and never end
    /// the run; only exhausted operator input does.
    pub async fn run(
        &self,
        session: &mut Session,
        console: &mut dyn Console,
    ) -> Outcome {
        let record = match &self.strategy {
            Strategy::JsonUntilValid(brief) => {
                json_until_valid(brief, session, console).await
            }
            Strategy::FixedSequence(questionnaire) => {
                fixed_sequence(questionnaire, session, console).await
            }
        };
        let Some(record) = record else {
            info!("collection aborted, operator input ended");
            return Outcome::Aborted;
        };

        let record = Value::Object(record);
        let persisted = self.persist(&record, console).await;
        Outcome::Completed(Collected { record, persisted })
    }

    async fn persist(
        &self,
        record: &Value,
        console: &mut dyn Console,
    ) -> Option<PathBuf> {
        let path = self.output.as_ref()?;
        match save_record(path, record).await {
            Ok(()) => {
                console.show(Line::Notice(&format!(
                    "Data saved to '{}'",
                    path.display()
                )));
                Some(path.clone())
            }
            Err(err) => {
                console.show(Line::Error(&format!("Failed to save the data: {err}")));
                None
            }
        }
    }
}

async fn json_until_valid(
    brief: &Brief,
    session: &mut Session,
    console: &mut dyn Console,
) -> Option<Record> {
    if let Some(reply) = send_with_progress(session, console, &brief.opening).await
    {
        console.show(Line::Assistant(&reply));
    }

    loop {
        let line = console.read_line().await?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(reply) = send_with_progress(session, console, line).await else {
            continue;
        };
        match session.extract_structured(&reply) {
            Extraction::Structured(record) => {
                debug!("got a structured record with {} fields", record.len());
                let pretty = serde_json::to_string_pretty(&record)
                    .unwrap_or_else(|_| reply.clone());
                console.show(Line::Assistant(&pretty));
                return Some(record);
            }
            Extraction::RawText(text) => console.show(Line::Assistant(&text)),
        }
    }
}

async fn fixed_sequence(
    questionnaire: &Questionnaire,
    session: &mut Session,
    console: &mut dyn Console,
) -> Option<Record> {
    let mut record = Record::new();

    for section in &questionnaire.sections {
        console.show(Line::Heading(&section.title));
        if let Some(intro) = &section.intro {
            let intro = render(intro, &record);
            if let Some(reply) = send_with_progress(session, console, &intro).await {
                console.show(Line::Assistant(&reply));
            }
        }

        for step in &section.steps {
            let (key, value) = match step {
                Step::Ask { key, question } => {
                    let question = render(question, &record);
                    console.show(Line::Prompt(&question));
                    let answer = console.read_line().await?;
                    let answer = answer.trim().to_owned();
                    session.append(Role::Assistant, question);
                    session.append(Role::User, answer.clone());
                    (key, answer)
                }
                Step::Derive { key, prompt } => {
                    let prompt = render(prompt, &record);
                    let reply = send_with_progress(session, console, &prompt)
                        .await
                        .unwrap_or_default();
                    if !reply.is_empty() {
                        console.show(Line::Assistant(&reply));
                    }
                    (key, reply)
                }
            };
            insert_field(&mut record, section.group.as_deref(), key, value);
        }
    }

    if let Some(summary) = &questionnaire.summary {
        let summary = render(summary, &record);
        if let Some(reply) = send_with_progress(session, console, &summary).await {
            console.show(Line::Heading("Summary"));
            console.show(Line::Assistant(&reply));
        }
    }

    Some(record)
}

fn insert_field(record: &mut Record, group: Option<&str>, key: &str, value: String) {
    let target = match group {
        Some(group) => {
            let entry = record
                .entry(group.to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                warn!("record field {group} is not a group, replacing it");
                *entry = Value::Object(Map::new());
            }
            match entry.as_object_mut() {
                Some(fields) => fields,
                None => return,
            }
        }
        None => record,
    };
    target.insert(key.to_owned(), Value::String(value));
}
