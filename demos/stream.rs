use std::io::Read;
use std::sync::Arc;
use std::time::Instant;

use tts_splitter::{
    phonemizer::{EspeakPhonemizer, Language},
    pipeline::PhonemeStream,
    TextSplitterStream,
};

const SAMPLE: &str = "Hello! This is Dr. Smith, reading at 2.5x speed. \
                      The meeting starts at 3 p.m. in Room 4. \"Are you ready?\" she asked. \
                      Yes (mostly). 今日は晴れです。";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let phonemize = std::env::args().any(|arg| arg == "--phonemize");
    let language = std::env::args()
        .skip_while(|arg| arg != "--lang")
        .nth(1)
        .map(|code| code.parse::<Language>())
        .transpose()?
        .unwrap_or_default();

    let mut text = String::new();
    if std::env::args().any(|arg| arg == "--stdin") {
        std::io::stdin().read_to_string(&mut text)?;
    } else {
        text.push_str(SAMPLE);
    }

    let splitter = TextSplitterStream::new();
    let reader = splitter.reader();
    let start = Instant::now();

    // Feed a few characters at a time, like tokens from a language model.
    let producer = std::thread::spawn(move || -> Result<(), tts_splitter::SplitterError> {
        let chars: Vec<char> = text.chars().collect();
        for chunk in chars.chunks(7) {
            splitter.push(&chunk.iter().collect::<String>())?;
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        splitter.close()
    });

    if phonemize {
        let mut phonemes = PhonemeStream::new(reader, Arc::new(EspeakPhonemizer::new()), language);
        while let Some(sentence) = phonemes.next().await {
            let sentence = sentence?;
            println!(
                "[{:>7.2?}] {}\n          {}",
                start.elapsed(),
                sentence.text,
                sentence.phonemes
            );
        }
    } else {
        let mut reader = reader;
        while let Some(sentence) = reader.next().await {
            println!("[{:>7.2?}] {}", start.elapsed(), sentence);
        }
    }

    producer
        .join()
        .map_err(|_| "producer thread panicked")??;
    Ok(())
}
