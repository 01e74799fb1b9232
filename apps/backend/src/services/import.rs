//! Batch import of vocabulary cards from delimited text.
//!
//! # Format
//! One card per line, three fields separated by the chosen delimiter:
//! ```text
//! happy,adjective,快樂的
//! learn,verb,學習
//! ```
//! Fields are trimmed. Lines with fewer than three fields are reported as
//! invalid instead of failing the whole batch; extra fields are ignored.

use serde::{Deserialize, Serialize};

/// Field separator chosen by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    #[default]
    Comma,
    Slash,
    Pipe,
    Tab,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Slash => '/',
            Self::Pipe => '|',
            Self::Tab => '\t',
        }
    }
}

/// Card content ready to insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCard {
    pub english: String,
    pub part_of_speech: String,
    pub chinese: String,
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportLine {
    Valid {
        line: usize,
        #[serde(flatten)]
        card: NewCard,
    },
    Invalid {
        line: usize,
        raw: String,
    },
}

impl ImportLine {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

/// Parse every line of `text`.
pub fn parse(text: &str, delimiter: Delimiter) -> Vec<ImportLine> {
    let text = text.trim();
    if text.is_empty() {
        return vec![];
    }

    text.split('\n')
        .enumerate()
        .map(|(idx, line)| parse_line(line, idx + 1, delimiter))
        .collect()
}

/// Split parsed lines into insertable cards and rejected lines.
pub fn partition(lines: Vec<ImportLine>) -> (Vec<NewCard>, Vec<ImportLine>) {
    let mut cards = Vec::new();
    let mut invalid = Vec::new();

    for line in lines {
        match line {
            ImportLine::Valid { card, .. } => cards.push(card),
            other => invalid.push(other),
        }
    }

    (cards, invalid)
}

fn parse_line(line: &str, line_num: usize, delimiter: Delimiter) -> ImportLine {
    let parts: Vec<&str> = line.split(delimiter.as_char()).map(str::trim).collect();

    match parts.as_slice() {
        [english, part_of_speech, chinese, ..] => ImportLine::Valid {
            line: line_num,
            card: NewCard {
                english: english.to_string(),
                part_of_speech: part_of_speech.to_string(),
                chinese: chinese.to_string(),
            },
        },
        _ => ImportLine::Invalid {
            line: line_num,
            raw: line.to_string(),
        },
    }
}
