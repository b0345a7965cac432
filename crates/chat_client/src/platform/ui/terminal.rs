//! Line-oriented output surface.
//!
//! Commands describe the whole screen; the surface remembers what it last
//! printed and writes only values that changed.

use std::collections::HashMap;
use std::io::{self, Write};

use super::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Summary,
    KeyPoints,
    Translation,
    WordCount,
    Pipeline,
    Errors,
    Upload,
    Notice,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Summary => LABEL_SUMMARY,
            Field::KeyPoints => LABEL_KEY_POINTS,
            Field::Translation => LABEL_TRANSLATION,
            Field::WordCount => LABEL_WORD_COUNT,
            Field::Pipeline => LABEL_PIPELINE,
            Field::Errors => LABEL_ERRORS,
            Field::Upload => LABEL_UPLOAD,
            Field::Notice => LABEL_NOTICE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub speaker: &'static str,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    Print(String),
    SetStatus { text: String, running: bool },
    SetField { field: Field, text: Option<String> },
    /// Entries that will not change any more, oldest first.
    ShowTranscript(Vec<TranscriptEntry>),
}

pub struct TerminalSurface<W: Write> {
    out: W,
    status: Option<(String, bool)>,
    fields: HashMap<Field, String>,
    transcript_len: usize,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            status: None,
            fields: HashMap::new(),
            transcript_len: 0,
        }
    }

    pub fn apply(&mut self, commands: &[TerminalCommand]) -> io::Result<()> {
        for command in commands {
            match command {
                TerminalCommand::Print(text) => writeln!(self.out, "{text}")?,
                TerminalCommand::SetStatus { text, running } => {
                    let next = (text.clone(), *running);
                    if self.status.as_ref() != Some(&next) {
                        let marker = if *running { '*' } else { ' ' };
                        writeln!(self.out, "[{marker}] {text}")?;
                        self.status = Some(next);
                    }
                }
                TerminalCommand::SetField { field, text } => {
                    self.set_field(*field, text.as_deref())?
                }
                TerminalCommand::ShowTranscript(entries) => {
                    for entry in entries.iter().skip(self.transcript_len) {
                        writeln!(self.out, "{}> {}", entry.speaker, entry.text)?;
                    }
                    self.transcript_len = self.transcript_len.max(entries.len());
                }
            }
        }
        self.out.flush()
    }

    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "! {text}")?;
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn set_field(&mut self, field: Field, text: Option<&str>) -> io::Result<()> {
        let previous = self.fields.get(&field).cloned();
        match (previous, text) {
            (previous, Some(text)) if previous.as_deref() != Some(text) => {
                writeln!(self.out, "{}: {}", field.label(), text)?;
                self.fields.insert(field, text.to_string());
            }
            (Some(_), None) => {
                writeln!(self.out, "{}: -", field.label())?;
                self.fields.remove(&field);
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn printed(surface: TerminalSurface<Vec<u8>>) -> String {
        String::from_utf8(surface.into_inner()).unwrap()
    }

    #[test]
    fn unchanged_values_are_not_reprinted() {
        let mut surface = TerminalSurface::new(Vec::new());
        let frame = vec![
            TerminalCommand::SetStatus {
                text: "Thinking".to_string(),
                running: true,
            },
            TerminalCommand::SetField {
                field: Field::WordCount,
                text: Some("1,204".to_string()),
            },
            TerminalCommand::SetField {
                field: Field::Summary,
                text: None,
            },
        ];
        surface.apply(&frame).unwrap();
        surface.apply(&frame).unwrap();

        assert_eq!(printed(surface), "[*] Thinking\nWord count: 1,204\n");
    }

    #[test]
    fn cleared_field_is_reported_once() {
        let mut surface = TerminalSurface::new(Vec::new());
        let set = TerminalCommand::SetField {
            field: Field::Upload,
            text: Some("uploading...".to_string()),
        };
        let clear = TerminalCommand::SetField {
            field: Field::Upload,
            text: None,
        };
        surface.apply(&[set]).unwrap();
        surface.apply(&[clear.clone()]).unwrap();
        surface.apply(&[clear]).unwrap();

        assert_eq!(printed(surface), "Upload: uploading...\nUpload: -\n");
    }

    #[test]
    fn transcript_prints_only_new_entries() {
        let mut surface = TerminalSurface::new(Vec::new());
        let first = TranscriptEntry {
            speaker: "you",
            text: "hello".to_string(),
        };
        let second = TranscriptEntry {
            speaker: "agent",
            text: "hi there".to_string(),
        };
        surface
            .apply(&[TerminalCommand::ShowTranscript(vec![first.clone()])])
            .unwrap();
        surface
            .apply(&[TerminalCommand::ShowTranscript(vec![first, second])])
            .unwrap();

        assert_eq!(printed(surface), "you> hello\nagent> hi there\n");
    }
}
