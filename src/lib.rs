//! # tts-splitter
//!
//! A Rust library that prepares streamed text for text-to-speech: it cuts
//! incoming text into sentences as soon as they are complete and turns each
//! sentence into phonemes with espeak-ng.
//!
//! ## Features
//!
//! - **Streaming splitting**: push text fragments as they arrive and read
//!   finished sentences asynchronously, from a thread, or as a `Stream`
//! - **One-shot splitting**: [`split`] gives the same sentences for text that
//!   is already complete
//! - **Pluggable boundary rules**: the default detector handles abbreviations,
//!   decimals, list markers, quotes and CJK punctuation
//! - **Phonemization**: American and British English through espeak-ng
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! tts-splitter = "2026.2"
//! ```
//!
//! ```rust
//! use tts_splitter::TextSplitterStream;
//!
//! # async fn run() -> Result<(), tts_splitter::SplitterError> {
//! let splitter = TextSplitterStream::new();
//! let mut reader = splitter.reader();
//!
//! // Tokens from a language model, for example.
//! for token in ["Hello wor", "ld. How", " are you?"] {
//!     splitter.push(token)?;
//! }
//! splitter.close()?;
//!
//! while let Some(sentence) = reader.next().await {
//!     println!("speak: {sentence}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod phonemizer;
pub mod pipeline;
pub mod splitter;

pub use error::SplitterError;
pub use splitter::{
    split, split_with, Boundary, BoundaryDetector, RuleBasedDetector, ScanState, SentenceReader,
    SentenceStream, SplitterConfig, TextSplitterStream,
};
