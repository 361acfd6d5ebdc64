//! Character and abbreviation tables used by the rule-based detector.

use std::collections::HashSet;

/// Abbreviations that never end a sentence: titles and Latin shorthands.
const NON_TERMINAL: &[&str] = &[
    "mr", "mrs", "ms", "mx", "dr", "prof", "rev", "hon", "st", "mt", "gen", "col", "capt", "lt",
    "sgt", "maj", "gov", "sen", "rep", "pres", "messrs", "mme", "mlle", "e.g", "i.e", "cf", "vs",
    "viz", "approx",
];

/// Abbreviations that end a sentence only when an uppercase letter follows.
const CONTEXTUAL: &[&str] = &[
    "etc", "inc", "ltd", "co", "corp", "jr", "sr", "esq", "dept", "est", "fig", "no", "vol", "pp",
    "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "mon",
    "tue", "tues", "wed", "thu", "thur", "thurs", "fri", "sat", "sun", "a.m", "p.m", "ph.d",
];

/// Sentence-ending punctuation.
pub fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '…' | '。' | '！' | '？')
}

/// Full-width terminators, which are not followed by a space in CJK text.
pub fn is_fullwidth_terminator(ch: char) -> bool {
    matches!(ch, '。' | '！' | '？')
}

/// Characters that may trail a terminator and still belong to its sentence.
pub fn is_closer(ch: char) -> bool {
    matches!(
        ch,
        '"' | '\'' | ')' | ']' | '}' | '”' | '’' | '»' | '」' | '』' | '】' | '）'
    )
}

pub fn is_opener(ch: char) -> bool {
    matches!(ch, '(' | '[' | '{' | '“' | '«' | '「' | '『' | '【' | '（')
}

fn opener_for(ch: char) -> Option<char> {
    match ch {
        ')' => Some('('),
        ']' => Some('['),
        '}' => Some('{'),
        '”' => Some('“'),
        '»' => Some('«'),
        '」' => Some('「'),
        '』' => Some('『'),
        '】' => Some('【'),
        '）' => Some('（'),
        _ => None,
    }
}

/// Open quotes and brackets seen since the start of the sentence.
///
/// Straight and curly single quotes are not tracked: they double as
/// apostrophes (`don't`, `'90s`) and would leave the stack open forever.
/// A `"` right after a digit is an inch mark (`5"`) unless it closes an open
/// quote, and an opener right after `:`, `;` or `=` is an emoticon (`:(`).
#[derive(Debug, Clone, Default)]
pub struct EnclosureStack {
    open: Vec<char>,
    /// Sentence boundaries hidden since the outermost enclosure opened.
    suppressed: usize,
}

impl EnclosureStack {
    /// Track `ch`, given the character right before it.
    pub fn update(&mut self, prev: Option<char>, ch: char) {
        if ch == '"' {
            if self.open.last() == Some(&'"') {
                self.pop();
            } else if !prev.is_some_and(|c| c.is_ascii_digit()) {
                self.open.push(ch);
            }
        } else if is_opener(ch) {
            if !matches!(prev, Some(':' | ';' | '=')) {
                self.open.push(ch);
            }
        } else if let Some(open) = opener_for(ch) {
            // Stray closers are ignored.
            if self.open.last() == Some(&open) {
                self.pop();
            }
        }
    }

    fn pop(&mut self) {
        self.open.pop();
        if self.open.is_empty() {
            self.suppressed = 0;
        }
    }

    /// Count one more sentence boundary hidden by the open enclosures.
    ///
    /// Returns `false` once more than `limit` boundaries were hidden. An
    /// enclosure that long was most likely never closed, so the boundary
    /// stands.
    pub fn suppress(&mut self, limit: usize) -> bool {
        self.suppressed += 1;
        self.suppressed <= limit
    }

    /// Whether `ch` would close the innermost open enclosure.
    pub fn closes_top(&self, ch: char) -> bool {
        match self.open.last() {
            Some(&'"') => ch == '"',
            Some(&top) => opener_for(ch) == Some(top),
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbbreviationKind {
    /// Never ends a sentence (`Dr.`, `e.g.`).
    NonTerminal,
    /// Ends a sentence only before an uppercase letter (`etc.`, `Inc.`).
    Contextual,
}

/// Abbreviation lookup, case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct Abbreviations {
    extra: HashSet<String>,
}

impl Abbreviations {
    pub fn new(extra: &[String]) -> Self {
        let extra = extra
            .iter()
            .map(|abbr| abbr.trim().trim_end_matches('.').to_lowercase())
            .filter(|abbr| !abbr.is_empty())
            .collect();
        Self { extra }
    }

    /// Classify the word that precedes a period.
    pub fn classify(&self, word: &str) -> Option<AbbreviationKind> {
        if word.is_empty() {
            return None;
        }

        let lower = word.to_lowercase();
        if NON_TERMINAL.contains(&lower.as_str()) || self.extra.contains(&lower) {
            return Some(AbbreviationKind::NonTerminal);
        }
        if CONTEXTUAL.contains(&lower.as_str()) || is_dotted_acronym(word) {
            return Some(AbbreviationKind::Contextual);
        }
        None
    }
}

/// `U.S`, `U.K`, `N.A.S.A`: short letter groups joined by periods.
fn is_dotted_acronym(word: &str) -> bool {
    word.contains('.')
        && word.split('.').all(|part| {
            let len = part.chars().count();
            (1..=2).contains(&len) && part.chars().all(char::is_alphabetic)
        })
}

#[cfg(test)]
mod tests {
    use super::{AbbreviationKind, Abbreviations, EnclosureStack};

    #[test]
    fn classifies_builtin_abbreviations() {
        let abbreviations = Abbreviations::default();
        assert_eq!(
            abbreviations.classify("Dr"),
            Some(AbbreviationKind::NonTerminal)
        );
        assert_eq!(
            abbreviations.classify("e.g"),
            Some(AbbreviationKind::NonTerminal)
        );
        assert_eq!(
            abbreviations.classify("etc"),
            Some(AbbreviationKind::Contextual)
        );
        assert_eq!(
            abbreviations.classify("U.S"),
            Some(AbbreviationKind::Contextual)
        );
        assert_eq!(abbreviations.classify("world"), None);
        assert_eq!(abbreviations.classify(""), None);
    }

    #[test]
    fn single_letters_are_plain_words() {
        // "A. B." is two sentences, so initials cannot be told apart.
        let abbreviations = Abbreviations::default();
        assert_eq!(abbreviations.classify("A"), None);
        assert_eq!(abbreviations.classify("a"), None);
    }

    #[test]
    fn extra_abbreviations_ignore_case_and_trailing_period() {
        let abbreviations = Abbreviations::new(&["Dept.".to_string(), " ".to_string()]);
        assert_eq!(
            abbreviations.classify("DEPT"),
            Some(AbbreviationKind::NonTerminal)
        );
    }

    fn stack_after(text: &str) -> EnclosureStack {
        let mut stack = EnclosureStack::default();
        let mut prev = None;
        for ch in text.chars() {
            stack.update(prev, ch);
            prev = Some(ch);
        }
        stack
    }

    #[test]
    fn enclosure_stack_matches_pairs() {
        let mut stack = stack_after("(\"a");
        assert!(stack.closes_top('"'));
        assert!(!stack.closes_top(')'));

        stack.update(Some('a'), '"');
        assert!(stack.closes_top(')'));
        stack.update(Some('"'), ']');
        assert!(!stack.is_empty(), "stray closer must not pop");
        stack.update(Some(']'), ')');
        assert!(stack.is_empty());
    }

    #[test]
    fn single_quotes_are_not_tracked() {
        assert!(stack_after("'90s don't ‘x").is_empty());
    }

    #[test]
    fn inch_marks_and_emoticons_do_not_open() {
        assert!(stack_after("a 5\" screw").is_empty());
        assert!(stack_after("sad :( and ;[ and =(").is_empty());
        assert!(!stack_after("the (page").is_empty());
    }

    #[test]
    fn quote_after_digit_still_closes_open_quote() {
        assert!(stack_after("\"Take 5\"").is_empty());
    }

    #[test]
    fn suppression_is_bounded_and_resets_on_close() {
        let mut stack = stack_after("(");
        assert!(stack.suppress(2));
        assert!(stack.suppress(2));
        assert!(!stack.suppress(2));

        stack.update(Some('x'), ')');
        stack.update(Some(' '), '(');
        assert!(stack.suppress(2));
    }
}
