use super::{split_sentences, words};
use std::collections::HashMap;
use studenthub_core::Summary;

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have", "he",
    "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "it's", "more", "most", "my",
    "no", "not", "of", "on", "or", "our", "she", "so", "some", "such", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those", "to", "too", "very",
    "was", "we", "were", "what", "when", "which", "while", "who", "will", "with", "would", "you",
    "your",
];

/// Pick the `max_sentences` highest-scoring sentences, kept in reading order.
///
/// A sentence scores the mean normalized frequency of its content words.
pub fn summarize(text: &str, max_sentences: usize) -> Summary {
    let sentences = split_sentences(text);
    let original_sentences = sentences.len();

    if original_sentences <= max_sentences {
        return Summary {
            summary: join(sentences.iter().map(|(_, s)| *s)),
            sentence_indices: (0..original_sentences).collect(),
            original_sentences,
        };
    }

    let mut frequencies: HashMap<String, usize> = HashMap::new();
    for word in words(text).filter(|w| !is_stopword(w)) {
        *frequencies.entry(word).or_default() += 1;
    }
    let max_frequency = frequencies.values().copied().max().unwrap_or(1) as f64;

    let mut scored: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .map(|(index, (_, sentence))| {
            let content: Vec<String> = words(sentence).filter(|w| !is_stopword(w)).collect();
            let score = if content.is_empty() {
                0.0
            } else {
                content
                    .iter()
                    .map(|w| frequencies.get(w).copied().unwrap_or(0) as f64 / max_frequency)
                    .sum::<f64>()
                    / content.len() as f64
            };
            (index, score)
        })
        .collect();

    // Highest score first; earlier sentences win ties
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut sentence_indices: Vec<usize> = scored
        .into_iter()
        .take(max_sentences)
        .map(|(index, _)| index)
        .collect();
    sentence_indices.sort_unstable();

    Summary {
        summary: join(sentence_indices.iter().map(|&i| sentences[i].1)),
        sentence_indices,
        original_sentences,
    }
}

fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

fn join<'a>(sentences: impl Iterator<Item = &'a str>) -> String {
    sentences.collect::<Vec<_>>().join(" ")
}
