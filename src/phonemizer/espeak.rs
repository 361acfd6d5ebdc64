use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use derive_builder::Builder;

use super::normalize::normalize_text;
use super::voices::{parse_voices, EspeakVoice};
use super::{Language, Phonemizer};
use crate::error::SplitterError;

/// Location of the espeak-ng binary and its data directory.
///
/// Either path can be `None` to fall back to the system default.
#[derive(Debug, Clone, Default, Builder)]
#[builder(default, setter(into, strip_option))]
pub struct EspeakConfig {
    pub bin_path: Option<PathBuf>,
    /// Directory that contains `espeak-ng-data`.
    pub data_path: Option<PathBuf>,
}

impl EspeakConfig {
    pub fn builder() -> EspeakConfigBuilder {
        EspeakConfigBuilder::default()
    }

    fn command(&self) -> Command {
        let bin = self
            .bin_path
            .as_deref()
            .unwrap_or_else(|| Path::new("espeak-ng"));
        let mut command = Command::new(bin);
        if let Some(data) = &self.data_path {
            command.arg(format!("--path={}", data.display()));
        }
        command
    }
}

/// Phonemizer that shells out to espeak-ng.
///
/// ```rust,no_run
/// use std::path::PathBuf;
/// use tts_splitter::phonemizer::{EspeakConfig, EspeakPhonemizer};
///
/// // Point to a bundled espeak-ng binary and data directory
/// let config = EspeakConfig::builder()
///     .bin_path(PathBuf::from("/app/resources/espeak-ng/espeak-ng"))
///     .data_path(PathBuf::from("/app/resources"))
///     .build()?;
/// let phonemizer = EspeakPhonemizer::with_config(config);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EspeakPhonemizer {
    config: EspeakConfig,
    normalize: bool,
}

impl EspeakPhonemizer {
    /// Create a phonemizer that uses `espeak-ng` from PATH.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EspeakConfig) -> Self {
        Self {
            config,
            normalize: false,
        }
    }

    /// Run [`normalize_text`] on the input before phonemizing.
    pub fn normalize(mut self, enabled: bool) -> Self {
        self.normalize = enabled;
        self
    }

    /// Phonemize `text` with an arbitrary espeak-ng voice, one entry per output line.
    pub fn phonemize_lines(&self, text: &str, voice: &str) -> Result<Vec<String>, SplitterError> {
        let output = run_espeak(&self.config, text, voice)?;
        Ok(output
            .lines()
            .map(clean_ipa)
            .filter(|line| !line.is_empty())
            .collect())
    }

    /// List installed espeak-ng voices, optionally only those for `language`.
    pub fn list_voices(&self, language: Option<&str>) -> Result<Vec<EspeakVoice>, SplitterError> {
        let mut command = self.config.command();
        match language {
            Some(language) => command.arg(format!("--voices={language}")),
            None => command.arg("--voices"),
        };

        log::info!("Listing espeak-ng voices (language filter: {language:?})");
        let output = command.output().map_err(map_spawn_error)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SplitterError::PhonemizerFailed(format!(
                "espeak-ng --voices exited with code {:?}: {stderr}",
                output.status.code()
            )));
        }

        Ok(parse_voices(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl Phonemizer for EspeakPhonemizer {
    fn phonemize(&self, text: &str, language: Language) -> Result<String, SplitterError> {
        let text = if self.normalize {
            Cow::Owned(normalize_text(text))
        } else {
            Cow::Borrowed(text)
        };

        let layout = Layout::of(&text);
        let ipa = if layout.runs.is_empty() {
            Vec::new()
        } else {
            phonemize_runs(&self.config, &layout.runs, language.espeak_voice())?
        };
        Ok(layout.assemble(&ipa))
    }
}

/// A sentence cut into word runs for espeak-ng and the punctuation kept
/// between them.
#[derive(Debug, Default, PartialEq, Eq)]
struct Layout {
    runs: Vec<String>,
    pieces: Vec<Piece>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    /// Index into `Layout::runs`.
    Run(usize),
    Mark(char),
}

impl Layout {
    fn of(text: &str) -> Self {
        let mut layout = Layout::default();
        let mut run = String::new();
        let mut prev = None;
        let mut chars = text.chars().peekable();

        while let Some(ch) = chars.next() {
            // "2.5" and "1,000" are read by espeak-ng as numbers.
            let in_number = matches!(ch, '.' | ',')
                && prev.is_some_and(|c: char| c.is_ascii_digit())
                && chars.peek().is_some_and(|c| c.is_ascii_digit());

            match spoken_mark(ch) {
                Some(mark) if !in_number => {
                    layout.end_run(&mut run);
                    layout.pieces.push(Piece::Mark(mark));
                }
                _ if ch.is_whitespace() => {
                    if !run.is_empty() && !run.ends_with(' ') {
                        run.push(' ');
                    }
                }
                _ => run.push(ch),
            }
            prev = Some(ch);
        }

        layout.end_run(&mut run);
        layout
    }

    fn end_run(&mut self, run: &mut String) {
        let words = run.trim_end();
        if !words.is_empty() {
            self.pieces.push(Piece::Run(self.runs.len()));
            self.runs.push(words.to_string());
        }
        run.clear();
    }

    /// Put phonemes for each run back between the punctuation marks.
    ///
    /// Runs and opening marks are separated from what precedes them by a
    /// space, and nothing separates an opening mark from the run it opens.
    fn assemble(&self, ipa: &[String]) -> String {
        let mut out = String::new();
        let mut quote_open = false;
        let mut after_opener = false;

        for piece in &self.pieces {
            match *piece {
                Piece::Run(index) => {
                    let Some(phonemes) = ipa.get(index).filter(|p| !p.is_empty()) else {
                        continue;
                    };
                    if !out.is_empty() && !after_opener {
                        out.push(' ');
                    }
                    out.push_str(phonemes);
                    after_opener = false;
                }
                Piece::Mark(mark) => {
                    let opens = match mark {
                        '(' | '“' => true,
                        '"' => {
                            quote_open = !quote_open;
                            quote_open
                        }
                        _ => false,
                    };
                    if opens && !out.is_empty() && !after_opener {
                        out.push(' ');
                    }
                    out.push(mark);
                    after_opener = opens;
                }
            }
        }
        out
    }
}

/// Punctuation that shapes prosody and is kept next to the phonemes.
/// Line breaks read as a full stop.
fn spoken_mark(ch: char) -> Option<char> {
    match ch {
        '.' | '!' | '?' | ',' | ';' | ':' | '—' | '…' | '"' | '(' | ')' | '“' | '”' => Some(ch),
        '\n' | '\r' => Some('.'),
        _ => None,
    }
}

/// Phonemize every run with one espeak-ng process, one run per line.
fn phonemize_runs(
    config: &EspeakConfig,
    runs: &[String],
    voice: &str,
) -> Result<Vec<String>, SplitterError> {
    let output = run_espeak(config, &runs.join("\n"), voice)?;
    let lines: Vec<String> = output.lines().map(clean_ipa).collect();
    if lines.len() == runs.len() {
        return Ok(lines);
    }

    log::warn!(
        "espeak-ng returned {} lines for {} runs, phonemizing one by one",
        lines.len(),
        runs.len()
    );
    runs.iter()
        .map(|run| {
            let output = run_espeak(config, run, voice)?;
            Ok(output
                .lines()
                .map(clean_ipa)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" "))
        })
        .collect()
}

fn run_espeak(config: &EspeakConfig, input: &str, voice: &str) -> Result<String, SplitterError> {
    let mut child = config
        .command()
        .args(["--ipa", "--stdin", "-q", "-v", voice])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(map_spawn_error)?;

    // Stdin is written on its own thread while stdout is drained here.
    // espeak-ng skips an unterminated last line.
    let mut payload = input.to_string();
    if !payload.ends_with('\n') {
        payload.push('\n');
    }
    let stdin = child.stdin.take();
    let writer = std::thread::spawn(move || -> std::io::Result<()> {
        match stdin {
            Some(mut stdin) => stdin.write_all(payload.as_bytes()),
            None => Ok(()),
        }
    });

    let output = child.wait_with_output()?;
    let written = writer
        .join()
        .map_err(|_| SplitterError::Task("espeak-ng stdin writer panicked".to_string()));

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SplitterError::PhonemizerFailed(format!(
            "espeak-ng exited with code {:?}: {stderr}",
            output.status.code()
        )));
    }
    written??;

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn map_spawn_error(e: std::io::Error) -> SplitterError {
    if e.kind() == std::io::ErrorKind::NotFound {
        SplitterError::EspeakNotFound
    } else {
        SplitterError::Io(e)
    }
}

/// Drop espeak-ng word separators and surrounding whitespace.
fn clean_ipa(line: &str) -> String {
    line.trim()
        .chars()
        .filter(|&ch| ch != '_')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{clean_ipa, run_espeak, EspeakConfig, EspeakPhonemizer, Layout, Piece};
    use crate::error::SplitterError;
    use crate::phonemizer::{Language, Phonemizer};
    use std::path::PathBuf;
    use std::process::Command;

    fn espeak_available() -> bool {
        Command::new("espeak-ng").arg("--version").output().is_ok()
    }

    fn missing_espeak() -> EspeakPhonemizer {
        EspeakPhonemizer::with_config(EspeakConfig {
            bin_path: Some(PathBuf::from("/nonexistent/espeak-ng")),
            data_path: None,
        })
    }

    #[test]
    fn layout_separates_runs_from_marks() {
        let layout = Layout::of("  Well,\tyes (mostly)!\nNext ");
        assert_eq!(layout.runs, vec!["Well", "yes", "mostly", "Next"]);
        assert_eq!(
            layout.pieces,
            vec![
                Piece::Run(0),
                Piece::Mark(','),
                Piece::Run(1),
                Piece::Mark('('),
                Piece::Run(2),
                Piece::Mark(')'),
                Piece::Mark('!'),
                Piece::Mark('.'),
                Piece::Run(3),
            ]
        );
    }

    #[test]
    fn layout_keeps_numbers_whole() {
        let layout = Layout::of("Pay 1,250.75 now, or 3.");
        assert_eq!(layout.runs, vec!["Pay 1,250.75 now", "or 3"]);
    }

    #[test]
    fn assemble_spaces_runs_but_not_after_openers() {
        let layout = Layout::of("He said \"go (now)\".");
        let ipa: Vec<String> = ["hiː sɛd", "ɡoʊ", "naʊ"].map(String::from).to_vec();
        assert_eq!(layout.assemble(&ipa), "hiː sɛd \"ɡoʊ (naʊ)\".");
    }

    #[test]
    fn assemble_spaces_after_closing_quote() {
        let layout = Layout::of("\"Go,\" she said.");
        let ipa: Vec<String> = ["ɡoʊ", "ʃiː sɛd"].map(String::from).to_vec();
        assert_eq!(layout.assemble(&ipa), "\"ɡoʊ,\" ʃiː sɛd.");
    }

    #[test]
    fn assemble_skips_runs_without_phonemes() {
        let layout = Layout::of("Hi, there.");
        let ipa = vec![String::new(), "ðɛɹ".to_string()];
        assert_eq!(layout.assemble(&ipa), ", ðɛɹ.");
    }

    #[test]
    fn cleans_word_separators_from_ipa() {
        assert_eq!(clean_ipa(" h_ə_l_ˈoʊ   w_ˈɜː_l_d "), "həlˈoʊ wˈɜːld");
    }

    #[test]
    fn missing_binary_is_reported() {
        let result = missing_espeak().phonemize("Hello", Language::AmericanEnglish);
        assert!(matches!(result, Err(SplitterError::EspeakNotFound)));
    }

    #[test]
    fn punctuation_only_text_skips_espeak() {
        assert_eq!(
            missing_espeak()
                .phonemize("?!", Language::AmericanEnglish)
                .unwrap(),
            "?!"
        );
    }

    #[test]
    fn long_input_does_not_block_on_pipes() {
        // Skip when espeak-ng is unavailable in the execution environment.
        if !espeak_available() {
            return;
        }

        let input = vec!["the quick brown fox jumps over the lazy dog"; 4_000].join("\n");
        let output = run_espeak(&EspeakConfig::default(), &input, "en-us")
            .expect("espeak should succeed");
        assert!(!output.trim().is_empty());
    }

    #[test]
    fn phonemize_keeps_punctuation_in_place() {
        if !espeak_available() {
            return;
        }

        let ipa = EspeakPhonemizer::new()
            .phonemize("Hello, world!", Language::AmericanEnglish)
            .expect("phonemize should succeed");
        assert!(ipa.contains(", "), "comma should separate words: {ipa}");
        assert!(ipa.ends_with('!'), "exclamation should be kept: {ipa}");
        assert!(ipa.contains('ə'), "American English 'hello' has a schwa: {ipa}");
    }
}
