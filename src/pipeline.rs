//! Sentence-by-sentence phonemization of a splitter stream.

use std::sync::Arc;

use crate::error::SplitterError;
use crate::phonemizer::{Language, Phonemizer};
use crate::splitter::SentenceReader;

/// A finalized sentence and its phonemes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhonemizedSentence {
    pub text: String,
    pub phonemes: String,
}

/// Phonemizes sentences as a [`SentenceReader`] yields them.
///
/// The phonemizer runs on tokio's blocking pool, so a slow espeak-ng call
/// never stalls the task that pushes text into the splitter.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tts_splitter::phonemizer::{EspeakPhonemizer, Language};
/// use tts_splitter::pipeline::PhonemeStream;
/// use tts_splitter::TextSplitterStream;
///
/// # async fn run() -> Result<(), tts_splitter::SplitterError> {
/// let splitter = TextSplitterStream::new();
/// let mut phonemes = PhonemeStream::new(
///     splitter.reader(),
///     Arc::new(EspeakPhonemizer::new()),
///     Language::AmericanEnglish,
/// );
///
/// splitter.push("Hello there. How are you?")?;
/// splitter.close()?;
///
/// while let Some(sentence) = phonemes.next().await {
///     let sentence = sentence?;
///     println!("{} -> {}", sentence.text, sentence.phonemes);
/// }
/// # Ok(())
/// # }
/// ```
pub struct PhonemeStream {
    reader: SentenceReader,
    phonemizer: Arc<dyn Phonemizer>,
    language: Language,
}

impl PhonemeStream {
    pub fn new(reader: SentenceReader, phonemizer: Arc<dyn Phonemizer>, language: Language) -> Self {
        Self {
            reader,
            phonemizer,
            language,
        }
    }

    /// Wait for the next sentence and phonemize it.
    ///
    /// A failed sentence yields `Some(Err(_))`; later sentences are still
    /// delivered. Returns `None` once the splitter is closed and drained.
    pub async fn next(&mut self) -> Option<Result<PhonemizedSentence, SplitterError>> {
        let text = self.reader.next().await?;
        let phonemizer = Arc::clone(&self.phonemizer);
        let language = self.language;

        let result = tokio::task::spawn_blocking(move || -> Result<_, SplitterError> {
            let phonemes = phonemizer.phonemize(&text, language)?;
            Ok(PhonemizedSentence { text, phonemes })
        })
        .await
        .unwrap_or_else(|e| Err(SplitterError::Task(e.to_string())));

        if let Err(e) = &result {
            log::warn!("Failed to phonemize sentence: {e}");
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{PhonemeStream, PhonemizedSentence};
    use crate::error::SplitterError;
    use crate::phonemizer::{Language, Phonemizer};
    use crate::splitter::TextSplitterStream;

    struct UppercasePhonemizer;

    impl Phonemizer for UppercasePhonemizer {
        fn phonemize(&self, text: &str, language: Language) -> Result<String, SplitterError> {
            Ok(format!("{}:{}", language, text.to_uppercase()))
        }
    }

    struct RejectingPhonemizer;

    impl Phonemizer for RejectingPhonemizer {
        fn phonemize(&self, text: &str, _language: Language) -> Result<String, SplitterError> {
            if text.contains("bad") {
                Err(SplitterError::PhonemizerFailed(format!("cannot read {text:?}")))
            } else {
                Ok(text.to_string())
            }
        }
    }

    #[tokio::test]
    async fn phonemizes_sentences_in_order() {
        let splitter = TextSplitterStream::new();
        let mut phonemes = PhonemeStream::new(
            splitter.reader(),
            Arc::new(UppercasePhonemizer),
            Language::BritishEnglish,
        );

        splitter.push("Good morning. How are ").unwrap();
        splitter.push("you?").unwrap();
        splitter.close().unwrap();

        let mut results = Vec::new();
        while let Some(sentence) = phonemes.next().await {
            results.push(sentence.unwrap());
        }

        assert_eq!(
            results,
            vec![
                PhonemizedSentence {
                    text: "Good morning.".to_string(),
                    phonemes: "b:GOOD MORNING.".to_string(),
                },
                PhonemizedSentence {
                    text: "How are you?".to_string(),
                    phonemes: "b:HOW ARE YOU?".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn failed_sentence_does_not_end_the_stream() {
        let splitter = TextSplitterStream::new();
        let mut phonemes = PhonemeStream::new(
            splitter.reader(),
            Arc::new(RejectingPhonemizer),
            Language::AmericanEnglish,
        );

        splitter.push("A bad one. A good one.").unwrap();
        splitter.close().unwrap();

        assert!(matches!(
            phonemes.next().await,
            Some(Err(SplitterError::PhonemizerFailed(_)))
        ));
        assert_eq!(
            phonemes.next().await.unwrap().unwrap().phonemes,
            "A good one."
        );
        assert!(phonemes.next().await.is_none());
    }
}
