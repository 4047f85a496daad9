//! Terminal prompts and notices.

use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, FuzzySelect};
use qbuild_common::{Interaction, NoticeLevel};
use tracing::debug;

fn print_notice(level: NoticeLevel, message: &str) {
    let line = match level {
        NoticeLevel::Info => style(message).green(),
        NoticeLevel::Warning => style(message).yellow(),
        NoticeLevel::Error => style(message).red().bold(),
    };
    eprintln!("{}", line);
}

/// Prompts on the controlling terminal.
pub struct TerminalInteraction {
    theme: ColorfulTheme,
}

impl TerminalInteraction {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Interaction for TerminalInteraction {
    fn pick_action(&self, names: &[String]) -> Option<String> {
        FuzzySelect::with_theme(&self.theme)
            .with_prompt("Action")
            .items(names)
            .default(0)
            .interact_opt()
            .unwrap_or_else(|e| {
                debug!("action prompt failed: {}", e);
                None
            })
            .and_then(|index| names.get(index).cloned())
    }

    fn confirm(&self, prompt: &str) -> bool {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    fn notify(&self, level: NoticeLevel, message: &str) {
        print_notice(level, message);
    }
}

/// Answers prompts without a terminal.
///
/// A single candidate action is taken; more than one needs `--action`.
/// Confirmations follow `--yes`.
pub struct BatchInteraction {
    assume_yes: bool,
}

impl BatchInteraction {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Interaction for BatchInteraction {
    fn pick_action(&self, names: &[String]) -> Option<String> {
        match names {
            [only] => Some(only.clone()),
            _ => {
                print_notice(
                    NoticeLevel::Warning,
                    &format!(
                        "Several actions apply ({}); choose one with --action.",
                        names.join(", ")
                    ),
                );
                None
            }
        }
    }

    fn confirm(&self, prompt: &str) -> bool {
        debug!(prompt, answer = self.assume_yes, "non-interactive confirmation");
        self.assume_yes
    }

    fn notify(&self, level: NoticeLevel, message: &str) {
        print_notice(level, message);
    }
}

/// Prompt interactively only when stderr is a terminal and `--yes` is unset.
pub fn is_interactive(assume_yes: bool) -> bool {
    !assume_yes && Term::stderr().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_takes_single_candidate() {
        let batch = BatchInteraction::new(false);
        assert_eq!(
            batch.pick_action(&["CRTBNDRPG".to_string()]),
            Some("CRTBNDRPG".to_string())
        );
        assert_eq!(batch.pick_action(&["A".to_string(), "B".to_string()]), None);
        assert_eq!(batch.pick_action(&[]), None);
    }

    #[test]
    fn test_batch_confirm_follows_flag() {
        assert!(BatchInteraction::new(true).confirm("Create?"));
        assert!(!BatchInteraction::new(false).confirm("Create?"));
    }

    #[test]
    fn test_yes_disables_prompts() {
        assert!(!is_interactive(true));
    }
}
