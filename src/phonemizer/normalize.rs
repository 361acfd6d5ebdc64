use std::sync::OnceLock;

use regex::{Captures, Regex};

struct Rules {
    horizontal_space: Regex,
    space_around_newline: Regex,
    doctor: Regex,
    mister: Regex,
    miss: Regex,
    missus: Regex,
    etc: Regex,
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();
    RULES.get_or_init(|| Rules {
        horizontal_space: Regex::new(r"[^\S\n]+").expect("valid regex"),
        space_around_newline: Regex::new(r" *\n *").expect("valid regex"),
        doctor: Regex::new(r"\bD[Rr]\.( [A-Z])").expect("valid regex"),
        mister: Regex::new(r"\b(?:Mr|MR)\.( [A-Z])").expect("valid regex"),
        miss: Regex::new(r"\b(?:Ms|MS)\.( [A-Z])").expect("valid regex"),
        missus: Regex::new(r"\b(?:Mrs|MRS)\.( [A-Z])").expect("valid regex"),
        etc: Regex::new(r"\betc\.( [A-Z])?").expect("valid regex"),
    })
}

/// Prepare English text for espeak-ng.
///
/// Maps curly quotes and full-width punctuation to ASCII, collapses runs of
/// spaces and tabs, and expands titles that espeak-ng would read letter by
/// letter. `etc.` keeps its period only where it ends a sentence.
pub fn normalize_text(text: &str) -> String {
    let rules = rules();

    let text: String = text
        .chars()
        .map(|ch| match ch {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201c}' | '\u{201d}' | '«' | '»' => '"',
            '、' | '，' => ',',
            '。' => '.',
            '！' => '!',
            '？' => '?',
            '：' => ':',
            '；' => ';',
            other => other,
        })
        .collect();

    let text = rules.horizontal_space.replace_all(&text, " ");
    let text = rules.space_around_newline.replace_all(&text, "\n");
    let text = rules.doctor.replace_all(&text, "Doctor${1}");
    let text = rules.mister.replace_all(&text, "Mister${1}");
    let text = rules.miss.replace_all(&text, "Miss${1}");
    let text = rules.missus.replace_all(&text, "Mrs${1}");
    let text = rules.etc.replace_all(&text, |caps: &Captures| match caps.get(1) {
        Some(next) => format!("etc.{}", next.as_str()),
        None => "etc".to_string(),
    });

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::normalize_text;

    #[test]
    fn maps_quotes_and_fullwidth_punctuation() {
        assert_eq!(
            normalize_text("\u{201c}Hi\u{201d}，she said\u{2019}s。"),
            "\"Hi\",she said's."
        );
    }

    #[test]
    fn collapses_spaces_but_keeps_line_breaks() {
        assert_eq!(normalize_text("  one \t two  \n  three "), "one two\nthree");
    }

    #[test]
    fn expands_titles_before_names() {
        assert_eq!(
            normalize_text("Dr. Smith met Mr. Brown, Ms. Green and Mrs. White."),
            "Doctor Smith met Mister Brown, Miss Green and Mrs White."
        );
        assert_eq!(normalize_text("Ask the dr. now"), "Ask the dr. now");
    }

    #[test]
    fn keeps_etc_period_only_at_sentence_end() {
        assert_eq!(
            normalize_text("Pens, paper, etc. and more"),
            "Pens, paper, etc and more"
        );
        assert_eq!(normalize_text("Pens, etc. Then go"), "Pens, etc. Then go");
    }
}
