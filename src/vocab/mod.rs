//! Core drill engine: items, queries, scheduling, session state, and the
//! practice log.

pub mod maintenance;
pub mod practice_log;
pub mod repository;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod types;

use types::ItemKind;

/// Punctuation ignored when comparing sentence answers — the ASCII set plus
/// the fullwidth CJK forms learners paste in.
const SENTENCE_PUNCTUATION: [char; 14] = [
    '.', ',', '!', '?', ';', ':', '\'', '"', '，', '。', '！', '？', '；', '：',
];

/// Normalize user input (or a stored target) for answer comparison.
///
/// Words: trimmed and case-folded. Sentences: additionally stripped of the
/// fixed punctuation set, so `"Hello, world!"` matches `"hello world"`.
pub fn normalize_answer(kind: ItemKind, input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    match kind {
        ItemKind::Word => lowered,
        ItemKind::Sentence => lowered
            .chars()
            .filter(|c| !SENTENCE_PUNCTUATION.contains(c))
            .collect::<String>()
            .trim()
            .to_string(),
    }
}

/// Normalize primary text at creation time. Words are stored case-folded;
/// sentences keep their casing and are only trimmed.
pub fn normalize_primary_text(kind: ItemKind, text: &str) -> String {
    match kind {
        ItemKind::Word => text.trim().to_lowercase(),
        ItemKind::Sentence => text.trim().to_string(),
    }
}
