//! Slash commands for the chat loop.

use console::style;

/// A recognized slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Help,
    /// Show the current learning targets.
    Targets,
    /// Show recent lessons.
    Lessons,
    /// Show the wisdom point count.
    Points,
    Clear,
    Exit,
    Unknown(String),
}

/// Parse a line as a slash command. Non-command lines return `None` and are
/// sent as chat text.
pub fn parse(text: &str) -> Option<ChatCommand> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }

    let name = text.split_whitespace().next().unwrap_or(text);
    Some(match name {
        "/help" => ChatCommand::Help,
        "/targets" => ChatCommand::Targets,
        "/lessons" => ChatCommand::Lessons,
        "/points" => ChatCommand::Points,
        "/clear" => ChatCommand::Clear,
        "/exit" | "/quit" => ChatCommand::Exit,
        other => ChatCommand::Unknown(other.to_string()),
    })
}

pub fn print_help() {
    println!();
    println!("  {}", style("Commands").bold());
    println!("  /targets   show learning targets and proficiency");
    println!("  /lessons   show recent lessons");
    println!("  /points    show wisdom points");
    println!("  /clear     clear the screen");
    println!("  /exit      end the session");
    println!();
}
