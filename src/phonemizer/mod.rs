//! Phonemization front end backed by espeak-ng.
//!
//! espeak-ng is used as an external program; this module only prepares its
//! input and reassembles its output around the original punctuation.
//!
//! # System Requirements
//!
//! **espeak-ng** must be installed on your system:
//! - **Linux**: `sudo apt-get install espeak-ng`
//! - **macOS**: `brew install espeak-ng`
//! - **Windows**: Download installer from <https://espeak-ng.org/download>
//!
//! # Language Support
//!
//! | Code | Voice prefix | Language | espeak-ng voice |
//! |---|---|---|---|
//! | `a` | `af_`, `am_` | American English | `en-us` |
//! | `b` | `bf_`, `bm_` | British English | `en-gb` |
//!
//! # Examples
//!
//! ```rust,no_run
//! use tts_splitter::phonemizer::{EspeakPhonemizer, Language, Phonemizer};
//!
//! let phonemizer = EspeakPhonemizer::new().normalize(true);
//! let ipa = phonemizer.phonemize("Hello, world!", Language::AmericanEnglish)?;
//! println!("{ipa}");
//! # Ok::<(), tts_splitter::SplitterError>(())
//! ```

pub mod espeak;
pub mod normalize;
pub mod voices;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SplitterError;

pub use espeak::{EspeakConfig, EspeakConfigBuilder, EspeakPhonemizer};
pub use normalize::normalize_text;
pub use voices::{parse_voices, EspeakVoice, VoiceLanguage};

/// Kokoro language codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "a")]
    AmericanEnglish,
    #[serde(rename = "b")]
    BritishEnglish,
}

impl Language {
    /// Single-letter Kokoro code.
    pub fn code(self) -> char {
        match self {
            Language::AmericanEnglish => 'a',
            Language::BritishEnglish => 'b',
        }
    }

    /// espeak-ng voice used to phonemize this language.
    pub fn espeak_voice(self) -> &'static str {
        match self {
            Language::AmericanEnglish => "en-us",
            Language::BritishEnglish => "en-gb",
        }
    }

    /// Language of a Kokoro voice identifier such as `af_heart` or `bm_george`.
    ///
    /// Voice names follow the pattern `{prefix}_{name}` where the first
    /// character of the prefix is the language code.
    pub fn from_voice(voice: &str) -> Option<Self> {
        let prefix = voice.split('_').next()?;
        match prefix {
            "af" | "am" => Some(Language::AmericanEnglish),
            "bf" | "bm" => Some(Language::BritishEnglish),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = SplitterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "en-us" | "en_us" => Ok(Language::AmericanEnglish),
            "b" | "en-gb" | "en_gb" => Ok(Language::BritishEnglish),
            other => Err(SplitterError::Config(format!(
                "Unsupported language {other:?}, expected \"a\" or \"b\""
            ))),
        }
    }
}

/// Converts text into a phoneme string.
///
/// Implementations may block (espeak-ng runs as a child process); async
/// callers go through [`crate::pipeline::PhonemeStream`], which moves the work
/// onto the blocking pool.
pub trait Phonemizer: Send + Sync {
    fn phonemize(&self, text: &str, language: Language) -> Result<String, SplitterError>;
}
