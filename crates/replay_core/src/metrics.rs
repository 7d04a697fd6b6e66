pub const EXCERPT_MAX_CHARS: usize = 200;
pub const WORDS_PER_MINUTE: usize = 250;

/// Extra characters considered past the limit before cutting.
const EXCERPT_LOOKAHEAD: usize = 50;
/// A boundary at or before this index makes a too-short excerpt.
const EXCERPT_MIN_BOUNDARY: usize = 50;
const ELLIPSIS: &str = "...";
/// Tried in this order; the first mark found past the minimum boundary wins
/// even when a later mark appears after it.
const SENTENCE_ENDS: [char; 3] = ['.', '!', '?'];

/// Short lead-in for `text`: sentence boundary (full stop preferred over `!`
/// and `?`), else word boundary with an ellipsis, else a hard cut (ellipsis
/// only when something was cut).
pub fn excerpt(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = text.chars().collect();
    let chunk = &chars[..chars.len().min(EXCERPT_MAX_CHARS + EXCERPT_LOOKAHEAD)];
    let window = &chunk[..chunk.len().min(EXCERPT_MAX_CHARS)];

    if let Some(idx) = SENTENCE_ENDS.iter().find_map(|&mark| {
        window
            .iter()
            .rposition(|&c| c == mark)
            .filter(|&idx| idx > EXCERPT_MIN_BOUNDARY)
    }) {
        return chunk[..=idx].iter().collect();
    }

    if chunk.len() > EXCERPT_MAX_CHARS {
        if let Some(idx) = window
            .iter()
            .rposition(|c| c.is_whitespace())
            .filter(|&idx| idx > EXCERPT_MIN_BOUNDARY)
        {
            let mut cut: String = chunk[..idx].iter().collect();
            cut.push_str(ELLIPSIS);
            return cut;
        }
    }

    let mut cut: String = window.iter().collect();
    if chars.len() > EXCERPT_MAX_CHARS {
        cut.push_str(ELLIPSIS);
    }
    cut
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes at [`WORDS_PER_MINUTE`], rounded half-to-even, never below one.
pub fn reading_time_minutes(words: usize) -> u32 {
    let minutes = (words as f64 / WORDS_PER_MINUTE as f64).round_ties_even();
    (minutes as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::{excerpt, reading_time_minutes, word_count};

    #[test]
    fn short_text_is_returned_whole() {
        assert_eq!(excerpt("Short."), "Short.");
        assert_eq!(excerpt(""), "");
    }

    #[test]
    fn full_stop_is_preferred_over_later_marks() {
        let text = format!(
            "{} Second sentence ends here! Third one keeps going {}",
            "First sentence is reasonably long to pass fifty chars.",
            "word ".repeat(60)
        );
        let out = excerpt(&text);
        assert!(out.ends_with("fifty chars."), "{out:?}");
    }

    #[test]
    fn exclamation_is_used_when_no_full_stop_qualifies() {
        let text = format!(
            "{} Second one ends here? Third keeps going {}",
            "An opening line without a stop that runs past fifty chars!",
            "word ".repeat(60)
        );
        let out = excerpt(&text);
        assert!(out.ends_with("fifty chars!"), "{out:?}");
    }

    #[test]
    fn falls_back_to_word_boundary() {
        let text = "word ".repeat(100);
        let out = excerpt(text.trim());
        assert!(out.ends_with("word..."), "{out:?}");
        assert!(out.chars().count() <= 203);
    }

    #[test]
    fn hard_cut_without_whitespace() {
        let text = "x".repeat(300);
        let out = excerpt(&text);
        assert_eq!(out, format!("{}...", "x".repeat(200)));
    }

    #[test]
    fn counts_words_and_minutes() {
        let text = "word ".repeat(500);
        assert_eq!(word_count(&text), 500);
        assert_eq!(reading_time_minutes(500), 2);
        assert_eq!(reading_time_minutes(0), 1);
        assert_eq!(reading_time_minutes(625), 2);
        assert_eq!(reading_time_minutes(875), 4);
    }
}
