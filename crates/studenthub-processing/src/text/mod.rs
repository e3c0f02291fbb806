//! Text utilities: statistics, a rule-based grammar checker and an
//! extractive summarizer.

pub mod grammar;
pub mod stats;
pub mod summarize;

pub use grammar::check as check_grammar;
pub use stats::analyze;
pub use summarize::summarize;

/// Split text into sentences on terminal punctuation followed by whitespace
/// or end of input. Returned slices are trimmed and never empty.
pub(crate) fn split_sentences(text: &str) -> Vec<(usize, &str)> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let terminal = matches!(c, '.' | '!' | '?');
        let boundary = terminal
            && match chars.peek() {
                None => true,
                Some(&(_, next)) => next.is_whitespace(),
            };
        let paragraph_break = c == '\n' && matches!(chars.peek(), Some(&(_, '\n')));

        if boundary || paragraph_break {
            let end = idx + c.len_utf8();
            push_trimmed(&mut sentences, text, start, end);
            start = end;
        }
    }
    push_trimmed(&mut sentences, text, start, text.len());

    sentences
}

fn push_trimmed<'a>(out: &mut Vec<(usize, &'a str)>, text: &'a str, start: usize, end: usize) {
    let slice = &text[start..end];
    let trimmed = slice.trim_start();
    let offset = start + (slice.len() - trimmed.len());
    let trimmed = trimmed.trim_end();
    if !trimmed.is_empty() {
        out.push((offset, trimmed));
    }
}

/// Lowercased alphanumeric words, keeping inner apostrophes
pub(crate) fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let text = "First one. Second one?  Third!";
        let sentences: Vec<&str> = split_sentences(text).into_iter().map(|(_, s)| s).collect();
        assert_eq!(sentences, vec!["First one.", "Second one?", "Third!"]);
    }

    #[test]
    fn test_split_sentences_offsets_and_decimals() {
        let text = "Pi is 3.14 roughly. Next";
        let sentences = split_sentences(text);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[1], (20, "Next"));
    }

    #[test]
    fn test_paragraph_break_ends_sentence() {
        let sentences = split_sentences("A heading\n\nBody text.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].1, "A heading");
    }

    #[test]
    fn test_words() {
        let collected: Vec<String> = words("Don't stop, 'quoted' words!").collect();
        assert_eq!(collected, vec!["don't", "stop", "quoted", "words"]);
    }
}
