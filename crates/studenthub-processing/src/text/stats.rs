use super::{split_sentences, words};
use std::collections::HashSet;
use studenthub_core::TextStats;

const WORDS_PER_MINUTE: usize = 200;

pub fn analyze(text: &str) -> TextStats {
    let word_list: Vec<String> = words(text).collect();
    let unique: HashSet<&str> = word_list.iter().map(String::as_str).collect();
    let letters: usize = word_list.iter().map(|w| w.chars().count()).sum();

    let paragraphs = text
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .count();

    let average_word_length = if word_list.is_empty() {
        0.0
    } else {
        // Two decimals are plenty for display
        ((letters as f64 / word_list.len() as f64) * 100.0).round() / 100.0
    };

    TextStats {
        characters: text.chars().count(),
        characters_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
        words: word_list.len(),
        unique_words: unique.len(),
        sentences: split_sentences(text).len(),
        paragraphs,
        average_word_length,
        reading_time_minutes: word_list.len().div_ceil(WORDS_PER_MINUTE),
    }
}
