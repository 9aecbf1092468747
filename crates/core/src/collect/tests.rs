use std::path::PathBuf;

use intake_model::{ModelMessage, Role};
use intake_test_model::{PresetResponse, TestModelProvider};
use serde_json::{Value, json};

use super::*;
use crate::console::ScriptedConsole;
use crate::extract::ReasoningMarkers;
use crate::SessionBuilder;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("intake-collect-{}-{name}", std::process::id()))
}

fn game_brief_questions() -> Questionnaire {
    Questionnaire::new().section(
        Section::new("Game brief")
            .ask("engine", "Which game engine will you use?")
            .ask("genre", "What genre is the game built on {engine}?")
            .ask("age_rating", "What is the age rating?")
            .ask("reference_games", "Which games should it feel like?"),
    )
}

#[tokio::test]
async fn test_fixed_sequence_records_answers() {
    let model_provider = TestModelProvider::default();
    let mut session =
        SessionBuilder::with_model_provider(model_provider.clone()).build();
    let mut console =
        ScriptedConsole::new(["Unity", "RPG", "16+", "Dark Souls"]);
    let path = temp_path("fixed.json");

    let outcome = Collector::new(Strategy::FixedSequence(game_brief_questions()))
        .with_output(&path)
        .run(&mut session, &mut console)
        .await;

    let expected = json!({
        "engine": "Unity",
        "genre": "RPG",
        "age_rating": "16+",
        "reference_games": "Dark Souls",
    });
    assert_eq!(
        outcome,
        Outcome::Completed(Collected {
            record: expected.clone(),
            persisted: Some(path.clone()),
        })
    );

    let written: Value =
        serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap())
            .unwrap();
    assert_eq!(written, expected);
    tokio::fs::remove_file(&path).await.ok();

    // Earlier answers are interpolated into later questions.
    assert!(console
        .output()
        .contains(&"prompt: What genre is the game built on Unity?".to_owned()));
    // Questions and answers land in the transcript, no model call needed.
    assert_eq!(session.transcript().len(), 8);
    assert!(model_provider.requests().is_empty());
}

#[tokio::test]
async fn test_fixed_sequence_with_groups_and_model_steps() {
    let model_provider = TestModelProvider::default();
    model_provider.add_text_response("Let's talk about money.");
    model_provider.add_text_response("Low risk.");
    model_provider.add_text_response("Ann earns 5000 and is low risk.");

    let questionnaire = Questionnaire::new()
        .section(
            Section::new("Personal information")
                .in_group("personal_info")
                .ask("full_name", "Your full name?"),
        )
        .section(
            Section::new("Financial information")
                .in_group("financial_info")
                .with_intro("The borrower is {full_name}. Ask about income.")
                .ask("monthly_income", "Monthly income, {full_name}?")
                .derive("llm_credit_analysis", "Income {monthly_income}. Assess the risk."),
        )
        .with_summary("Summarize: {full_name}, {monthly_income}, {llm_credit_analysis}.");

    let mut session = SessionBuilder::with_model_provider(model_provider.clone())
        .with_system_prompt("You are a loan officer.")
        .build();
    let mut console = ScriptedConsole::new(["Ann Lee", "5000"]);

    let outcome = Collector::new(Strategy::FixedSequence(questionnaire))
        .run(&mut session, &mut console)
        .await;

    let Outcome::Completed(collected) = outcome else {
        panic!("collection should complete");
    };
    assert_eq!(collected.persisted, None);
    assert_eq!(
        collected.record,
        json!({
            "personal_info": { "full_name": "Ann Lee" },
            "financial_info": {
                "monthly_income": "5000",
                "llm_credit_analysis": "Low risk.",
            },
        })
    );

    let requests = model_provider.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(
        requests[0].messages.last(),
        Some(&ModelMessage::User(
            "The borrower is Ann Lee. Ask about income.".to_owned()
        ))
    );
    assert_eq!(
        requests[2].messages.last().map(ModelMessage::content),
        Some("Summarize: Ann Lee, 5000, Low risk..")
    );
    assert!(console
        .output()
        .contains(&"assistant: Ann earns 5000 and is low risk.".to_owned()));
}

#[tokio::test]
async fn test_fixed_sequence_model_failure_records_empty_value() {
    let model_provider = TestModelProvider::default();
    model_provider.add_response(PresetResponse::with_content("").with_failures(0));

    let questionnaire = Questionnaire::new()
        .section(Section::new("Analysis").derive("analysis", "Assess the risk."));
    let mut session =
        SessionBuilder::with_model_provider(model_provider).build();
    let mut console = ScriptedConsole::default();

    let outcome = Collector::new(Strategy::FixedSequence(questionnaire))
        .run(&mut session, &mut console)
        .await;

    let Outcome::Completed(collected) = outcome else {
        panic!("collection should complete");
    };
    assert_eq!(collected.record, json!({ "analysis": "" }));
    assert!(console.output().iter().any(|line| line.starts_with("error: ")));
}

#[tokio::test]
async fn test_fixed_sequence_aborts_on_eof() {
    let mut session =
        SessionBuilder::with_model_provider(TestModelProvider::default()).build();
    let mut console = ScriptedConsole::new(["Unity"]);

    let outcome = Collector::new(Strategy::FixedSequence(game_brief_questions()))
        .run(&mut session, &mut console)
        .await;
    assert_eq!(outcome, Outcome::Aborted);
}

#[tokio::test]
async fn test_json_until_valid() {
    let model_provider = TestModelProvider::default();
    model_provider.add_text_response("<think>start</think>Hi! Which engine?");
    model_provider.add_text_response("<think>ok</think>Which genre?");
    model_provider.add_text_response(
        "<think>\nAll fields are known.\n</think>\n{\"engine\": \"Unity\", \"genre\": \"RPG\"}",
    );
    let path = temp_path("brief.json");

    let mut session = SessionBuilder::with_model_provider(model_provider.clone())
        .with_system_prompt("Collect engine and genre, then reply with JSON.")
        .with_reasoning_markers(ReasoningMarkers::default())
        .build();
    let mut console = ScriptedConsole::new(["Unity", "", "RPG", "never read"]);

    let outcome = Collector::new(Strategy::JsonUntilValid(Brief {
        opening: "Hello".to_owned(),
    }))
    .with_output(&path)
    .run(&mut session, &mut console)
    .await;

    let expected = json!({ "engine": "Unity", "genre": "RPG" });
    assert_eq!(
        outcome,
        Outcome::Completed(Collected {
            record: expected.clone(),
            persisted: Some(path.clone()),
        })
    );
    assert_eq!(console.pending_inputs(), 1);
    assert_eq!(console.output()[0], "assistant: Hi! Which engine?");
    assert_eq!(console.output()[1], "assistant: Which genre?");

    // The blank line is never sent.
    let requests = model_provider.requests();
    assert_eq!(requests.len(), 3);
    let user_turns: Vec<_> = requests[2]
        .messages
        .iter()
        .filter(|msg| msg.role() == Role::User)
        .map(ModelMessage::content)
        .collect();
    assert_eq!(user_turns, ["Hello", "Unity", "RPG"]);

    let written: Value =
        serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap())
            .unwrap();
    assert_eq!(written, expected);
    tokio::fs::remove_file(&path).await.ok();
}

#[tokio::test]
async fn test_json_until_valid_survives_backend_failure() {
    let model_provider = TestModelProvider::default();
    model_provider.add_text_response("Which engine?");
    model_provider
        .add_response(PresetResponse::with_content("{\"engine\":\"Godot\"}").with_failures(1));

    let mut session =
        SessionBuilder::with_model_provider(model_provider).build();
    let mut console = ScriptedConsole::new(["Godot", "Godot, again"]);

    let outcome = Collector::new(Strategy::JsonUntilValid(Brief {
        opening: "Hello".to_owned(),
    }))
    .run(&mut session, &mut console)
    .await;

    let Outcome::Completed(collected) = outcome else {
        panic!("collection should complete");
    };
    assert_eq!(collected.record, json!({ "engine": "Godot" }));
    assert!(console.output().iter().any(|line| line.starts_with("error: ")));
}

#[tokio::test]
async fn test_json_until_valid_aborts_on_eof() {
    let model_provider = TestModelProvider::default();
    model_provider.add_text_response("Which engine?");
    model_provider.add_text_response("Unity is fine. And the genre?");

    let mut session =
        SessionBuilder::with_model_provider(model_provider).build();
    let mut console = ScriptedConsole::new(["Unity"]);

    let outcome = Collector::new(Strategy::JsonUntilValid(Brief {
        opening: "Hello".to_owned(),
    }))
    .run(&mut session, &mut console)
    .await;
    assert_eq!(outcome, Outcome::Aborted);
    assert_eq!(
        console.output().last().map(String::as_str),
        Some("assistant: Unity is fine. And the genre?")
    );
}

#[tokio::test]
async fn test_persist_failure_is_reported() {
    let mut session =
        SessionBuilder::with_model_provider(TestModelProvider::default()).build();
    let mut console = ScriptedConsole::new(["Unity", "RPG", "16+", "Dark Souls"]);
    let path = temp_path("no-such-dir").join("brief.json");

    let outcome = Collector::new(Strategy::FixedSequence(game_brief_questions()))
        .with_output(&path)
        .run(&mut session, &mut console)
        .await;

    let Outcome::Completed(collected) = outcome else {
        panic!("collection should complete");
    };
    assert_eq!(collected.persisted, None);
    assert_eq!(collected.record["engine"], "Unity");
    assert!(console
        .output()
        .last()
        .is_some_and(|line| line.starts_with("error: Failed to save the data")));
}
