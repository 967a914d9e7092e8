//! Human-readable names for spec types and methods.
//!
//! Reporters show `WhenPoppingAnEmptyStack::it_should_fail` as "When popping an empty stack / it should fail". The
//! transformation is pure and locale-independent.
//!
//! ## Notes
//! - Word breaks: `_` and `.` (both dropped), whitespace, lower→upper case changes, letter↔digit changes, and the last
//!   capital of an upper-case run when it begins a capitalised word (`HTTPServer` → `HTTP`, `Server`).
//! - Words of two or more characters with no lower-case letters are kept as-is (acronyms, numbers). Single-character
//!   words are kept as-is. Every other word is lower-cased.
//! - The case of the very first character is preserved.

/// Convert an identifier-like string into a readable sentence fragment.
///
/// ## Examples
/// ```rust
/// use contexts_core::readable::make_readable;
///
/// assert_eq!(make_readable("SimpleHTTPServer"), "Simple HTTP server");
/// assert_eq!(make_readable("BMW4Series"), "BMW 4 series");
/// assert_eq!(make_readable("snake_case_name"), "snake case name");
/// ```
pub fn make_readable(identifier: &str) -> String {
    let words = split_words(identifier);
    let mut readable = String::with_capacity(identifier.len() + words.len());

    for (index, word) in words.iter().enumerate() {
        if index > 0 {
            readable.push(' ');
        }
        let normalised = normalise_word(word);
        if index == 0 {
            readable.push_str(&preserve_first_char(word, &normalised));
        } else {
            readable.push_str(&normalised);
        }
    }

    readable
}

fn split_words(identifier: &str) -> Vec<String> {
    let chars: Vec<char> = identifier.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (index, &c) in chars.iter().enumerate() {
        if c == '_' || c == '.' || c.is_whitespace() {
            flush(&mut words, &mut current);
            continue;
        }
        if !current.is_empty() {
            let prev = chars[index - 1];
            if starts_new_word(prev, c, chars.get(index + 1).copied()) {
                flush(&mut words, &mut current);
            }
        }
        current.push(c);
    }
    flush(&mut words, &mut current);

    words
}

fn flush(words: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}

fn starts_new_word(prev: char, c: char, next: Option<char>) -> bool {
    let case_change = prev.is_lowercase() && c.is_uppercase();
    let into_digits = prev.is_alphabetic() && c.is_numeric();
    let out_of_digits = prev.is_numeric() && c.is_alphabetic();
    let end_of_acronym = prev.is_uppercase() && c.is_uppercase() && next.is_some_and(char::is_lowercase);
    case_change || into_digits || out_of_digits || end_of_acronym
}

fn normalise_word(word: &str) -> String {
    let mut chars = word.chars();
    let single = chars.next().is_some() && chars.next().is_none();
    let acronym = !word.chars().any(char::is_lowercase);
    if single || acronym {
        word.to_string()
    } else {
        word.to_lowercase()
    }
}

fn preserve_first_char(original: &str, normalised: &str) -> String {
    let mut chars = normalised.chars();
    match (original.chars().next(), chars.next()) {
        (Some(first), Some(_)) => std::iter::once(first).chain(chars).collect(),
        _ => normalised.to_string(),
    }
}
