//! Sentence splitting for streaming text-to-speech.
//!
//! [`split`] handles text that is fully available. [`TextSplitterStream`]
//! handles text that arrives in fragments, for example tokens from a language
//! model, and emits each sentence as soon as its end is certain.
//!
//! Both paths share one boundary detector, so pushing any fragmentation of a
//! text and closing the stream yields exactly `split(text)`.
//!
//! # Boundary rules
//!
//! The default [`RuleBasedDetector`] ends sentences at `. ! ? …` and at the
//! full-width `。！？`, and keeps them together across:
//!
//! - decimals and dotted names (`2.5`, `example.com`);
//! - numbered list markers (`1. First`);
//! - titles and shorthands (`Dr. Smith`, `e.g. this`), plus contextual
//!   abbreviations (`etc.`, `Inc.`) unless an uppercase letter follows;
//! - a lowercase continuation (`"Why?" she asked`);
//! - terminators inside quotes or brackets, up to
//!   [`SplitterConfig::max_enclosed_boundaries`] of them, so an unclosed
//!   bracket cannot hold back the rest of a paragraph. Inch marks (`5"`) and
//!   emoticons (`:(`) do not open anything.
//!
//! Line breaks are hard boundaries unless
//! [`SplitterConfig::split_on_newlines`] is off. Custom rules plug in through
//! [`BoundaryDetector`].

pub mod boundary;
pub mod config;
pub mod rules;
pub mod stream;

pub use boundary::{Boundary, BoundaryDetector, RuleBasedDetector, ScanState};
pub use config::{SplitterConfig, SplitterConfigBuilder};
pub use stream::{SentenceReader, SentenceStream, TextSplitterStream};

/// Split a complete text into sentences.
///
/// ```
/// let sentences = tts_splitter::split("Dr. Smith arrived. He was late!");
/// assert_eq!(sentences, vec!["Dr. Smith arrived.", "He was late!"]);
/// ```
pub fn split(text: &str) -> Vec<String> {
    split_with(text, SplitterConfig::default())
}

/// Split a complete text into sentences using a custom configuration.
pub fn split_with(text: &str, config: SplitterConfig) -> Vec<String> {
    let stream = TextSplitterStream::with_config(config);
    stream
        .push(text)
        .map(|()| stream.into_sentences())
        .unwrap_or_default()
}
