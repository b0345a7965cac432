use std::path::PathBuf;

use thiserror::Error;

/// One line typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Chat(String),
    Upload(PathBuf),
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("usage: /upload <path>")]
    MissingPath,
    #[error("unknown command /{0} (try /help)")]
    UnknownCommand(String),
}

pub fn parse_line(line: &str) -> Result<InputCommand, InputError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(InputCommand::Empty);
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return Ok(InputCommand::Chat(trimmed.to_string()));
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .unwrap_or((command, ""));
    match name {
        "upload" => {
            let path = rest.trim().trim_matches(['"', '\'']);
            if path.is_empty() {
                Err(InputError::MissingPath)
            } else {
                Ok(InputCommand::Upload(PathBuf::from(path)))
            }
        }
        "help" => Ok(InputCommand::Help),
        "quit" | "exit" => Ok(InputCommand::Quit),
        other => Err(InputError::UnknownCommand(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_chat() {
        assert_eq!(
            parse_line("  Summarize the attached scan\n"),
            Ok(InputCommand::Chat("Summarize the attached scan".to_string()))
        );
        assert_eq!(parse_line("   "), Ok(InputCommand::Empty));
    }

    #[test]
    fn upload_takes_the_rest_of_the_line() {
        assert_eq!(
            parse_line("/upload \"scans/page 1.png\""),
            Ok(InputCommand::Upload(PathBuf::from("scans/page 1.png")))
        );
        assert_eq!(parse_line("/upload"), Err(InputError::MissingPath));
    }

    #[test]
    fn known_and_unknown_commands() {
        assert_eq!(parse_line("/quit"), Ok(InputCommand::Quit));
        assert_eq!(parse_line("/help"), Ok(InputCommand::Help));
        assert_eq!(
            parse_line("/translate now"),
            Err(InputError::UnknownCommand("translate".to_string()))
        );
    }
}
