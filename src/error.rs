/// Errors produced by the splitter, the phonemizer front end and the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SplitterError {
    #[error("Stream is closed. No further text can be pushed, flushed or closed.")]
    StreamClosed,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(
        "espeak-ng not found. Install: Linux: `sudo apt-get install espeak-ng`, \
         macOS: `brew install espeak-ng`, Windows: https://espeak-ng.org/download"
    )]
    EspeakNotFound,
    #[error("Phonemization failed: {0}")]
    PhonemizerFailed(String),
    #[error("Invalid splitter config: {0}")]
    Config(String),
    #[error("Background task failed: {0}")]
    Task(String),
}
