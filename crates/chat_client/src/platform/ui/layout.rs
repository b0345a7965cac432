use super::constants::APP_TITLE;
use super::terminal::TerminalCommand;

pub fn initial_commands(endpoint: &str) -> Vec<TerminalCommand> {
    vec![
        TerminalCommand::Print(format!("{APP_TITLE} - connected to {endpoint}")),
        TerminalCommand::Print(help_text()),
    ]
}

pub fn help_text() -> String {
    [
        "Type a message and press Enter to send it.",
        "  /upload <path>  upload an image or PDF for the agent",
        "  /help           show this help",
        "  /quit           leave",
    ]
    .join("\n")
}
