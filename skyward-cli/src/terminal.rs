//! Terminal [`Ui`]: coloured stdout plus dialoguer prompts.

use colored::Colorize;
use dialoguer::{Confirm, Input, Select};

use skyward_sync::{Log, SyncError, Ui};

pub struct TerminalUi {
    auto_confirm: bool,
}

impl TerminalUi {
    pub fn new(auto_confirm: bool) -> Self {
        Self { auto_confirm }
    }
}

impl Ui for TerminalUi {
    fn auto_confirm(&self) -> bool {
        self.auto_confirm
    }

    fn print(&self, log: Log) {
        match log {
            Log::Text(text) => println!("{text}"),
            Log::List { title, items } => {
                println!("{title}");
                for item in items {
                    println!("  {}", colorize_change(&item));
                }
            }
            Log::Warning(message) => eprintln!("{} {message}", "warning:".yellow().bold()),
            Log::Followup { title, items } => {
                println!("{title}");
                for item in items {
                    println!("  {} {}", "$".dimmed(), item.cyan());
                }
            }
        }
    }

    fn confirm(&self, message: &str) -> Result<bool, SyncError> {
        if self.auto_confirm {
            return Ok(true);
        }
        Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .map_err(prompt_err)
    }

    fn input(&self, message: &str, default: Option<&str>) -> Result<String, SyncError> {
        let mut input = Input::<String>::new().with_prompt(message);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(prompt_err)
    }

    fn select(
        &self,
        message: &str,
        options: &[String],
        default: Option<&str>,
    ) -> Result<String, SyncError> {
        let selected = default
            .and_then(|d| options.iter().position(|o| o == d))
            .unwrap_or(0);
        let index = Select::new()
            .with_prompt(message)
            .items(options)
            .default(selected)
            .interact()
            .map_err(prompt_err)?;
        options
            .get(index)
            .cloned()
            .ok_or_else(|| SyncError::Prompt(format!("no option at index {index}")))
    }
}

fn prompt_err(err: dialoguer::Error) -> SyncError {
    SyncError::Prompt(err.to_string())
}

/// Colour a change line by its leading marker.
fn colorize_change(line: &str) -> String {
    let marker = line.trim_start().chars().next();
    match marker {
        Some('+') => line.green().to_string(),
        Some('-') => line.red().to_string(),
        Some('*') => line.yellow().to_string(),
        _ => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_confirm_never_prompts() {
        let ui = TerminalUi::new(true);
        assert!(ui.auto_confirm());
        assert!(ui.confirm("Please confirm the changes shown above").unwrap());
    }

    #[test]
    fn change_lines_keep_their_text() {
        colored::control::set_override(false);
        assert_eq!(colorize_change("  + /index.html"), "  + /index.html");
        assert_eq!(colorize_change("New hosting files"), "New hosting files");
    }
}
