use super::split_sentences;
use regex::Regex;
use std::sync::OnceLock;
use studenthub_core::{GrammarIssue, GrammarIssueKind, GrammarReport};

/// Words that are legitimately doubled in English
const ALLOWED_REPEATS: &[&str] = &["had", "that"];
/// Minimum words before a missing final full stop is reported
const MIN_WORDS_FOR_TERMINAL_CHECK: usize = 3;

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\p{L}\p{N}']+").expect("valid word regex"))
}

fn double_space_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\S( {2,})\S").expect("valid spacing regex"))
}

fn article_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(an?)\s+([a-z][a-z'-]*)").expect("valid article regex")
    })
}

/// Run every rule over `text` and return issues ordered by position
pub fn check(text: &str) -> GrammarReport {
    let mut issues = Vec::new();
    repeated_words(text, &mut issues);
    double_spaces(text, &mut issues);
    sentence_starts(text, &mut issues);
    articles(text, &mut issues);
    terminal_punctuation(text, &mut issues);

    issues.sort_by_key(|issue| issue.offset);
    GrammarReport {
        issue_count: issues.len(),
        issues,
    }
}

fn repeated_words(text: &str, issues: &mut Vec<GrammarIssue>) {
    let mut previous: Option<regex::Match<'_>> = None;

    for current in word_regex().find_iter(text) {
        if let Some(prev) = previous {
            let gap = &text[prev.end()..current.start()];
            let word = current.as_str().to_lowercase();
            if !gap.is_empty()
                && gap.chars().all(char::is_whitespace)
                && prev.as_str().to_lowercase() == word
                && !ALLOWED_REPEATS.contains(&word.as_str())
            {
                issues.push(GrammarIssue {
                    kind: GrammarIssueKind::RepeatedWord,
                    offset: prev.start(),
                    excerpt: text[prev.start()..current.end()].to_string(),
                    message: format!("The word '{}' is repeated", current.as_str()),
                    suggestion: Some(prev.as_str().to_string()),
                });
            }
        }
        previous = Some(current);
    }
}

fn double_spaces(text: &str, issues: &mut Vec<GrammarIssue>) {
    for caps in double_space_regex().captures_iter(text) {
        if let (Some(whole), Some(spaces)) = (caps.get(0), caps.get(1)) {
            issues.push(GrammarIssue {
                kind: GrammarIssueKind::DoubleSpace,
                offset: spaces.start(),
                excerpt: whole.as_str().to_string(),
                message: "Use a single space between words".to_string(),
                suggestion: Some(" ".to_string()),
            });
        }
    }
}

fn sentence_starts(text: &str, issues: &mut Vec<GrammarIssue>) {
    for (offset, sentence) in split_sentences(text) {
        let Some(first) = sentence.chars().next() else {
            continue;
        };
        if !first.is_lowercase() {
            continue;
        }

        let first_word = sentence.split_whitespace().next().unwrap_or(sentence);
        let mut capitalized: String = first.to_uppercase().collect();
        capitalized.push_str(&first_word[first.len_utf8()..]);

        issues.push(GrammarIssue {
            kind: GrammarIssueKind::LowercaseSentenceStart,
            offset,
            excerpt: first_word.to_string(),
            message: "Sentences should start with a capital letter".to_string(),
            suggestion: Some(capitalized),
        });
    }
}

fn articles(text: &str, issues: &mut Vec<GrammarIssue>) {
    for caps in article_regex().captures_iter(text) {
        let (Some(whole), Some(article), Some(word)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };

        let wants_an = expects_an(word.as_str());
        let has_an = article.as_str().len() == 2;
        if wants_an == has_an {
            continue;
        }

        let replacement = match (wants_an, article.as_str().starts_with('A')) {
            (true, true) => "An",
            (true, false) => "an",
            (false, true) => "A",
            (false, false) => "a",
        };

        issues.push(GrammarIssue {
            kind: GrammarIssueKind::ArticleMisuse,
            offset: whole.start(),
            excerpt: whole.as_str().to_string(),
            message: format!(
                "Use '{}' before '{}'",
                replacement.to_lowercase(),
                word.as_str()
            ),
            suggestion: Some(format!("{} {}", replacement, word.as_str())),
        });
    }
}

/// Whether `word` takes "an", judged by its spelling
fn expects_an(word: &str) -> bool {
    let lower = word.to_lowercase();
    const VOWEL_SOUND_H: &[&str] = &["hour", "honest", "honor", "honour", "heir"];
    const CONSONANT_SOUND_VOWEL: &[&str] = &["uni", "use", "usu", "uti", "one", "once", "eu"];

    if VOWEL_SOUND_H.iter().any(|p| lower.starts_with(p)) {
        return true;
    }
    if CONSONANT_SOUND_VOWEL.iter().any(|p| lower.starts_with(p)) {
        return false;
    }
    matches!(lower.chars().next(), Some('a' | 'e' | 'i' | 'o' | 'u'))
}

fn terminal_punctuation(text: &str, issues: &mut Vec<GrammarIssue>) {
    let Some((offset, last)) = split_sentences(text).pop() else {
        return;
    };
    if last.split_whitespace().count() < MIN_WORDS_FOR_TERMINAL_CHECK {
        return;
    }

    let ends_cleanly = last
        .trim_end_matches(['"', '\'', ')', '\u{201d}', '\u{2019}'])
        .ends_with(['.', '!', '?', ':', ';']);
    if ends_cleanly {
        return;
    }

    issues.push(GrammarIssue {
        kind: GrammarIssueKind::MissingTerminalPunctuation,
        offset: offset + last.len(),
        excerpt: last.split_whitespace().last().unwrap_or(last).to_string(),
        message: "The text does not end with punctuation".to_string(),
        suggestion: Some(format!("{}.", last)),
    });
}
