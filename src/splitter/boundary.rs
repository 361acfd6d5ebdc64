use super::config::SplitterConfig;
use super::rules::{
    is_closer, is_fullwidth_terminator, is_opener, is_terminator, AbbreviationKind, Abbreviations,
    EnclosureStack,
};

/// Outcome of scanning a sentence prefix for its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The sentence is `text[..end]`; the next one starts at byte `next`.
    Confirmed { end: usize, next: usize },
    /// A candidate boundary reaches the end of the text, so more input decides it.
    Pending,
    /// No candidate boundary in the text.
    NotFound,
}

/// Where a detector stopped in the current sentence.
///
/// The stream keeps one per unfinalized sentence and resets it whenever a
/// sentence is finalized, so a detector can pick up where it left off
/// instead of rescanning settled text on every push.
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    offset: usize,
    enclosures: EnclosureStack,
}

impl ScanState {
    /// Bytes of the sentence that need no further examination.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Strategy that locates the end of the first sentence in a piece of text.
///
/// `text` always starts at the beginning of an unfinalized sentence.
/// Implementations must confirm a boundary using only `text[..=next]`:
/// anything that depends on later characters has to be reported as
/// [`Boundary::Pending`]. Streaming and one-shot splitting agree only under
/// that rule.
pub trait BoundaryDetector: Send + Sync {
    fn find_boundary(&self, text: &str) -> Boundary;

    /// Scan a sentence that has grown since the previous call with `scan`.
    ///
    /// `text` starts where it did before and only has text appended. The
    /// default ignores `scan` and rescans from the start.
    fn resume_boundary(&self, text: &str, scan: &mut ScanState) -> Boundary {
        let _ = scan;
        self.find_boundary(text)
    }
}

/// Punctuation-driven detector with abbreviation, number and quote handling.
#[derive(Debug, Clone)]
pub struct RuleBasedDetector {
    split_on_newlines: bool,
    max_enclosed_boundaries: usize,
    abbreviations: Abbreviations,
}

impl Default for RuleBasedDetector {
    fn default() -> Self {
        Self::new(&SplitterConfig::default())
    }
}

impl RuleBasedDetector {
    pub fn new(config: &SplitterConfig) -> Self {
        Self {
            split_on_newlines: config.split_on_newlines,
            max_enclosed_boundaries: config.max_enclosed_boundaries,
            abbreviations: Abbreviations::new(&config.extra_abbreviations),
        }
    }

    /// Decide a terminator at `idx`. `None` means the sentence continues.
    ///
    /// `enclosures` is only modified when a boundary is hidden by an open
    /// quote or bracket, never on the way to `Pending`.
    fn classify(
        &self,
        text: &str,
        idx: usize,
        ch: char,
        enclosures: &mut EnclosureStack,
    ) -> Option<Boundary> {
        let mut stack = enclosures.clone();
        let mut end = idx + ch.len_utf8();
        let mut prev = ch;
        for c in text[end..].chars() {
            let trailing = is_terminator(c) || (is_closer(c) && (c != '"' || stack.closes_top(c)));
            if !trailing {
                break;
            }
            stack.update(Some(prev), c);
            prev = c;
            end += c.len_utf8();
        }

        let Some(following) = text[end..].chars().next() else {
            return Some(Boundary::Pending);
        };
        if !following.is_whitespace() && !is_fullwidth_terminator(ch) {
            return None;
        }

        let Some(next) = next_sentence_start(text, end) else {
            return Some(Boundary::Pending);
        };
        let next_char = text[next..].chars().next()?;
        if next_char.is_lowercase() {
            return None;
        }
        if ch == '.' && self.is_continuation_period(text, idx, next_char) {
            return None;
        }
        if !stack.is_empty() && enclosures.suppress(self.max_enclosed_boundaries) {
            return None;
        }

        Some(Boundary::Confirmed { end, next })
    }

    fn is_continuation_period(&self, text: &str, idx: usize, next_char: char) -> bool {
        if is_list_marker(&text[..idx]) {
            return true;
        }

        match self.abbreviations.classify(word_before(text, idx)) {
            Some(AbbreviationKind::NonTerminal) => true,
            Some(AbbreviationKind::Contextual) => !next_char.is_uppercase(),
            None => false,
        }
    }
}

impl BoundaryDetector for RuleBasedDetector {
    fn find_boundary(&self, text: &str) -> Boundary {
        self.resume_boundary(text, &mut ScanState::default())
    }

    fn resume_boundary(&self, text: &str, scan: &mut ScanState) -> Boundary {
        if !text.is_char_boundary(scan.offset) {
            log::warn!("Discarding scan state past the end of the sentence");
            *scan = ScanState::default();
        }
        let start = scan.offset;
        let mut prev = text[..start].chars().next_back();

        for (idx, ch) in text[start..].char_indices().map(|(i, c)| (start + i, c)) {
            if ch == '\n' && self.split_on_newlines {
                return match next_sentence_start(text, idx) {
                    Some(next) => Boundary::Confirmed { end: idx, next },
                    None => {
                        scan.offset = idx;
                        Boundary::Pending
                    }
                };
            }

            // Terminators never change the stack, so resuming at one is safe.
            scan.enclosures.update(prev, ch);
            // A run like "?!" or "..." is decided at its first terminator.
            if is_terminator(ch) && !prev.is_some_and(is_terminator) {
                if let Some(boundary) = self.classify(text, idx, ch, &mut scan.enclosures) {
                    if boundary == Boundary::Pending {
                        scan.offset = idx;
                    }
                    return boundary;
                }
            }
            prev = Some(ch);
        }

        scan.offset = text.len();
        Boundary::NotFound
    }
}

/// Whether the line before a period is a bare number, as in `1. First item`.
fn is_list_marker(head: &str) -> bool {
    let mut chars = head
        .chars()
        .rev()
        .skip_while(|&c| c != '\n' && c.is_whitespace())
        .peekable();
    let mut digits = 0;
    while chars.next_if(|c| c.is_ascii_digit()).is_some() {
        digits += 1;
    }
    digits > 0 && chars.take_while(|&c| c != '\n').all(char::is_whitespace)
}

/// Byte offset of the first non-whitespace character at or after `from`.
fn next_sentence_start(text: &str, from: usize) -> Option<usize> {
    text[from..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(offset, _)| from + offset)
}

/// The word ending right before byte `idx`, without leading quotes or brackets.
fn word_before(text: &str, idx: usize) -> &str {
    let head = &text[..idx];
    let start = head
        .char_indices()
        .rev()
        .find(|&(_, c)| c.is_whitespace() || is_opener(c) || c == '"' || c == '\'')
        .map(|(pos, c)| pos + c.len_utf8())
        .unwrap_or(0);
    &head[start..]
}
