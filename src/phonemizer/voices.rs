use serde::{Deserialize, Serialize};

/// A language an espeak-ng voice can speak, lower priority is preferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceLanguage {
    pub name: String,
    pub priority: u32,
}

/// One installed espeak-ng voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EspeakVoice {
    /// Display name, e.g. `English (America)`.
    pub name: String,
    /// Voice file identifier, e.g. `gmw/en-US`.
    pub identifier: String,
    pub languages: Vec<VoiceLanguage>,
}

/// Parse the table printed by `espeak-ng --voices`.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  2  en-us           --/M      English_(America)  gmw/en-US            (en 3)
/// ```
///
/// The header and malformed rows are skipped.
pub fn parse_voices(output: &str) -> Vec<EspeakVoice> {
    output.lines().filter_map(parse_voice_line).collect()
}

fn parse_voice_line(line: &str) -> Option<EspeakVoice> {
    let columns: Vec<&str> = line.split_whitespace().collect();
    if columns.len() < 5 {
        return None;
    }

    let priority = columns[0].parse().ok()?;
    let mut languages = vec![VoiceLanguage {
        name: columns[1].to_string(),
        priority,
    }];

    let others = columns[5..].join(" ");
    for entry in others.split('(').skip(1) {
        let mut fields = entry.trim().trim_end_matches(')').split_whitespace();
        if let (Some(name), Some(priority)) = (fields.next(), fields.next()) {
            if let Ok(priority) = priority.parse() {
                languages.push(VoiceLanguage {
                    name: name.to_string(),
                    priority,
                });
            }
        }
    }

    Some(EspeakVoice {
        name: columns[3].replace('_', " "),
        identifier: columns[4].to_string(),
        languages,
    })
}
