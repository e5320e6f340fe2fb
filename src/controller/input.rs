//! Console command handling

use crate::error::Result;

use super::SessionCoordinator;

/// A line typed at the console
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    TogglePlayback,
    Next,
    Previous,
    /// Zero-based track index
    Select(usize),
    List,
    Status,
    Quit,
}

impl Command {
    /// Parse one input line. Track numbers are one-based.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line {
            "p" | "P" | "play" | "pause" => Some(Command::TogglePlayback),
            "n" | "N" | "next" => Some(Command::Next),
            "b" | "B" | "prev" | "previous" => Some(Command::Previous),
            "l" | "L" | "list" => Some(Command::List),
            "s" | "S" | "status" => Some(Command::Status),
            "q" | "Q" | "quit" | "exit" => Some(Command::Quit),
            _ => match line.parse::<usize>() {
                Ok(number) if number > 0 => Some(Command::Select(number - 1)),
                _ => None,
            },
        }
    }
}

/// What the console should do after a command ran
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    ShowStatus,
    ShowList,
    Quit,
}

impl SessionCoordinator {
    pub async fn handle_command(&self, command: Command) -> Result<CommandOutcome> {
        tracing::debug!(?command, "Console command");
        match command {
            Command::TogglePlayback => self.toggle().await?,
            Command::Next => self.next().await?,
            Command::Previous => self.previous().await?,
            Command::Select(index) => self.select_track(index).await?,
            Command::List => return Ok(CommandOutcome::ShowList),
            Command::Status => {
                // status is best effort before the session is ready
                if let Err(e) = self.poll_progress().await {
                    tracing::debug!(error = %e, "Progress poll skipped");
                }
            }
            Command::Quit => return Ok(CommandOutcome::Quit),
        }
        Ok(CommandOutcome::ShowStatus)
    }
}
