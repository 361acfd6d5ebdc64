use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;
use tokio_stream::Stream;
use tokio_util::sync::ReusableBoxFuture;

use super::boundary::{Boundary, BoundaryDetector, RuleBasedDetector, ScanState};
use super::config::SplitterConfig;
use crate::error::SplitterError;

struct State {
    /// Text pushed but not yet part of a finalized sentence.
    buffer: String,
    /// Detector progress through `buffer`.
    scan: ScanState,
    sentences: Vec<String>,
    closed: bool,
}

struct Shared {
    state: Mutex<State>,
    /// Wakes threads parked in `SentenceReader::blocking_next`.
    condvar: Condvar,
    /// Wakes tasks awaiting `SentenceReader::next`.
    notify: Notify,
}

impl Shared {
    fn wake(&self) {
        self.condvar.notify_all();
        self.notify.notify_waiters();
    }
}

/// Incremental sentence splitter fed by a single producer.
///
/// Text is pushed in arbitrary fragments; complete sentences are finalized
/// as soon as their boundary is certain. A boundary at the very end of the
/// buffered text is held back until more text arrives, the buffer is flushed,
/// or the stream is closed.
///
/// Consumers read finalized sentences through [`SentenceReader`]s, either
/// asynchronously, by parking a thread, or as a [`Stream`].
///
/// ```
/// use tts_splitter::TextSplitterStream;
///
/// let stream = TextSplitterStream::new();
/// stream.push("Hello world. This is a te")?;
/// stream.push("st.")?;
/// assert_eq!(stream.sentences(), vec!["Hello world."]);
///
/// stream.close()?;
/// assert_eq!(stream.sentences(), vec!["Hello world.", "This is a test."]);
/// # Ok::<(), tts_splitter::SplitterError>(())
/// ```
///
/// Dropping the stream closes it, so readers still waiting on it finish.
pub struct TextSplitterStream {
    shared: Arc<Shared>,
    detector: Box<dyn BoundaryDetector>,
    config: SplitterConfig,
}

impl Default for TextSplitterStream {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSplitterStream {
    /// Create an open, empty stream with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SplitterConfig::default())
    }

    /// Create a stream that uses the rule-based detector configured by `config`.
    pub fn with_config(config: SplitterConfig) -> Self {
        let detector = RuleBasedDetector::new(&config);
        Self::with_detector(config, detector)
    }

    /// Create a stream with a custom boundary strategy.
    pub fn with_detector(config: SplitterConfig, detector: impl BoundaryDetector + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    buffer: String::new(),
                    scan: ScanState::default(),
                    sentences: Vec::new(),
                    closed: false,
                }),
                condvar: Condvar::new(),
                notify: Notify::new(),
            }),
            detector: Box::new(detector),
            config,
        }
    }

    /// Push one text fragment.
    pub fn push(&self, text: &str) -> Result<(), SplitterError> {
        self.push_all([text])
    }

    /// Push several fragments, concatenated in order, then split once.
    pub fn push_all<I, S>(&self, fragments: I) -> Result<(), SplitterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = self.shared.state.lock();
        if state.closed {
            return Err(SplitterError::StreamClosed);
        }

        for fragment in fragments {
            state.buffer.push_str(fragment.as_ref());
        }
        let finalized = self.process(&mut state);
        drop(state);

        if finalized > 0 {
            self.shared.wake();
        }
        Ok(())
    }

    /// Finalize everything buffered as one sentence, keeping the stream open.
    pub fn flush(&self) -> Result<(), SplitterError> {
        let mut state = self.shared.state.lock();
        if state.closed {
            return Err(SplitterError::StreamClosed);
        }
        self.flush_locked(&mut state);
        drop(state);

        self.shared.wake();
        Ok(())
    }

    /// Flush, then refuse any further input.
    ///
    /// Readers finish once they have yielded every finalized sentence.
    pub fn close(&self) -> Result<(), SplitterError> {
        let mut state = self.shared.state.lock();
        if state.closed {
            return Err(SplitterError::StreamClosed);
        }
        self.close_locked(&mut state);
        drop(state);

        self.shared.wake();
        Ok(())
    }

    /// Snapshot of every sentence finalized so far.
    pub fn sentences(&self) -> Vec<String> {
        self.shared.state.lock().sentences.clone()
    }

    /// Text held back waiting for a boundary decision.
    pub fn pending(&self) -> String {
        self.shared.state.lock().buffer.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Flush (if still open) and iterate over the sentences collected so far.
    ///
    /// Never waits for more input. Sentences stay in the stream and remain
    /// visible to readers and to [`sentences`](Self::sentences).
    pub fn flushed_sentences(&self) -> std::vec::IntoIter<String> {
        let mut state = self.shared.state.lock();
        if !state.closed {
            self.flush_locked(&mut state);
        }
        let snapshot = state.sentences.clone();
        drop(state);

        self.shared.wake();
        snapshot.into_iter()
    }

    /// Close the stream if needed and take all of its sentences.
    pub fn into_sentences(self) -> Vec<String> {
        let mut state = self.shared.state.lock();
        if !state.closed {
            self.close_locked(&mut state);
        }
        let sentences = state.sentences.clone();
        drop(state);

        self.shared.wake();
        sentences
    }

    /// A new consumer cursor positioned before the first sentence.
    pub fn reader(&self) -> SentenceReader {
        SentenceReader {
            shared: Arc::clone(&self.shared),
            cursor: 0,
        }
    }

    /// Move every confirmed sentence out of the buffer. Returns how many were added.
    fn process(&self, state: &mut State) -> usize {
        let mut consumed = 0;
        let mut finalized = 0;

        while let Boundary::Confirmed { end, next } = self
            .detector
            .resume_boundary(&state.buffer[consumed..], &mut state.scan)
        {
            state.scan = ScanState::default();
            let Some(sentence) = state.buffer.get(consumed..consumed + end) else {
                log::warn!("Boundary detector returned an invalid end offset {end}");
                break;
            };
            if next == 0 || !state.buffer.is_char_boundary(consumed + next) {
                log::warn!("Boundary detector returned an invalid next offset {next}");
                break;
            }

            let sentence = sentence.trim().to_string();
            if !sentence.is_empty() {
                log::debug!("Finalized sentence: {sentence:?}");
                state.sentences.push(sentence);
                finalized += 1;
            }
            consumed += next;
        }

        if consumed > 0 {
            state.buffer.drain(..consumed);
        }
        if !state.buffer.trim().is_empty() {
            log::debug!("Holding back {} bytes pending a boundary", state.buffer.len());
        }
        finalized
    }

    fn flush_locked(&self, state: &mut State) {
        let remainder = state.buffer.trim().to_string();
        state.buffer.clear();
        state.scan = ScanState::default();
        if !remainder.is_empty() || self.config.emit_empty_sentences {
            log::debug!("Flushed sentence: {remainder:?}");
            state.sentences.push(remainder);
        }
    }

    fn close_locked(&self, state: &mut State) {
        self.flush_locked(state);
        state.closed = true;
        log::debug!("Stream closed with {} sentences", state.sentences.len());
    }
}

impl Drop for TextSplitterStream {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        if state.closed {
            return;
        }
        self.close_locked(&mut state);
        drop(state);
        self.shared.wake();
    }
}

enum Step {
    Ready(String),
    Wait,
    Done,
}

/// Consumer cursor over the sentences of a [`TextSplitterStream`].
///
/// Each reader yields every sentence exactly once, in emission order,
/// starting from the first. Readers never modify the stream: dropping one,
/// or abandoning a pending [`next`](Self::next), leaves buffered text alone.
pub struct SentenceReader {
    shared: Arc<Shared>,
    cursor: usize,
}

impl SentenceReader {
    /// Wait for the next sentence. Returns `None` once the stream is closed
    /// and every sentence has been read.
    pub async fn next(&mut self) -> Option<String> {
        let shared = Arc::clone(&self.shared);
        loop {
            let mut notified = std::pin::pin!(shared.notify.notified());
            // Register before looking at the state so a wake-up between the
            // check and the await is not lost.
            notified.as_mut().enable();

            match self.step() {
                Step::Ready(sentence) => return Some(sentence),
                Step::Done => return None,
                Step::Wait => notified.await,
            }
        }
    }

    /// Return the next sentence if one is already finalized.
    pub fn try_next(&mut self) -> Option<String> {
        match self.step() {
            Step::Ready(sentence) => Some(sentence),
            Step::Wait | Step::Done => None,
        }
    }

    /// Park the current thread until the next sentence or the end of the stream.
    ///
    /// Must not be called from an async task; use [`next`](Self::next) there.
    pub fn blocking_next(&mut self) -> Option<String> {
        let mut state = self.shared.state.lock();
        loop {
            if let Some(sentence) = state.sentences.get(self.cursor) {
                self.cursor += 1;
                return Some(sentence.clone());
            }
            if state.closed {
                return None;
            }
            self.shared.condvar.wait(&mut state);
        }
    }

    /// Number of sentences this reader has yielded.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn into_stream(self) -> SentenceStream {
        SentenceStream {
            inner: ReusableBoxFuture::new(next_with_reader(self)),
        }
    }

    fn step(&mut self) -> Step {
        let state = self.shared.state.lock();
        if let Some(sentence) = state.sentences.get(self.cursor) {
            self.cursor += 1;
            Step::Ready(sentence.clone())
        } else if state.closed {
            Step::Done
        } else {
            Step::Wait
        }
    }
}

async fn next_with_reader(mut reader: SentenceReader) -> (Option<String>, SentenceReader) {
    let sentence = reader.next().await;
    (sentence, reader)
}

/// [`Stream`] of sentences backed by a [`SentenceReader`].
pub struct SentenceStream {
    inner: ReusableBoxFuture<'static, (Option<String>, SentenceReader)>,
}

impl Stream for SentenceStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let (sentence, reader) = ready!(self.inner.poll(cx));
        self.inner.set(next_with_reader(reader));
        Poll::Ready(sentence)
    }
}
