//! Test fixtures and factory functions for creating test data.

use serde_json::json;
use uuid::Uuid;

use vocab_backend::services::import::NewCard;

/// Card content for a word.
pub fn new_card(english: &str) -> NewCard {
    NewCard {
        english: english.to_string(),
        part_of_speech: "noun".to_string(),
        chinese: format!("{}（中文）", english),
    }
}

/// Generate batch import text with a number of valid lines.
pub fn batch_text(num_cards: usize, delimiter: char) -> String {
    (0..num_cards)
        .map(|i| format!("word{i}{d}noun{d}詞{i}", i = i + 1, d = delimiter))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Create a notebook request body.
pub fn create_notebook_request(name: &str) -> serde_json::Value {
    json!({ "name": name })
}

/// Create a card request body.
pub fn create_card_request(english: &str, part_of_speech: &str, chinese: &str) -> serde_json::Value {
    json!({
        "english": english,
        "part_of_speech": part_of_speech,
        "chinese": chinese
    })
}

/// Create an import request body.
pub fn import_request(text: &str, delimiter: &str) -> serde_json::Value {
    json!({ "text": text, "delimiter": delimiter })
}

/// Create a start quiz request body.
pub fn start_quiz_request(notebook_ids: &[Uuid]) -> serde_json::Value {
    json!({ "notebook_ids": notebook_ids })
}

/// Create a grade request body.
pub fn grade_request(grade: &str) -> serde_json::Value {
    json!({ "grade": grade })
}

/// Generate a unique name to avoid collisions between test runs.
pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().to_string()[..8])
}
