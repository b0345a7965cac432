use status_core::{AppViewModel, Role};

use super::constants::*;
use super::terminal::{Field, TerminalCommand, TranscriptEntry};

#[allow(clippy::vec_init_then_push)]
pub fn render(view: &AppViewModel) -> Vec<TerminalCommand> {
    let mut cmds = Vec::new();

    cmds.push(TerminalCommand::SetStatus {
        text: view.status.clone(),
        running: view.running,
    });

    cmds.push(field(Field::Summary, view.summary.clone()));
    cmds.push(field(Field::KeyPoints, bullet_list(&view.key_points)));
    cmds.push(field(Field::Translation, view.translated_text.clone()));
    cmds.push(field(
        Field::WordCount,
        view.word_count.map(format_with_commas),
    ));
    cmds.push(field(
        Field::Pipeline,
        bullet_list(
            &view
                .pipeline
                .iter()
                .map(|row| format!("{}: {}", row.title, row.detail))
                .collect::<Vec<_>>(),
        ),
    ));
    cmds.push(field(Field::Errors, bullet_list(&view.errors)));

    let upload = if view.uploading {
        Some(UPLOADING_TEXT.to_string())
    } else {
        view.upload_error.clone()
    };
    cmds.push(field(Field::Upload, upload));
    cmds.push(field(Field::Notice, view.notice.clone()));

    cmds.push(TerminalCommand::ShowTranscript(settled_transcript(view)));

    cmds
}

fn field(field: Field, text: Option<String>) -> TerminalCommand {
    TerminalCommand::SetField { field, text }
}

fn bullet_list(items: &[String]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    Some(
        items
            .iter()
            .map(|item| format!("\n  - {item}"))
            .collect(),
    )
}

/// Everything except an assistant reply that is still streaming.
fn settled_transcript(view: &AppViewModel) -> Vec<TranscriptEntry> {
    let streaming = view.running
        && view
            .transcript
            .last()
            .is_some_and(|line| line.role == Role::Assistant);
    let settled = if streaming {
        view.transcript.len() - 1
    } else {
        view.transcript.len()
    };
    view.transcript[..settled]
        .iter()
        .map(|line| TranscriptEntry {
            speaker: match line.role {
                Role::User => SPEAKER_USER,
                Role::Assistant => SPEAKER_AGENT,
            },
            text: line.text.clone(),
        })
        .collect()
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
