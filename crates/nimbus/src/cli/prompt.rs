//! Terminal prompts

use std::io::IsTerminal;

use dialoguer::{Input, Password};

use nimbus_build::{BuildError, Prompter};

/// Prompts on the controlling terminal
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompter {
    interactive: bool,
}

impl TerminalPrompter {
    /// Interactive only when attached to a terminal outside CI
    pub fn detect() -> Self {
        let interactive = std::io::stdin().is_terminal()
            && console::user_attended()
            && std::env::var_os("CI").is_none();
        Self { interactive }
    }
}

impl Prompter for TerminalPrompter {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn get_string(&self, prompt: &str, allow_empty: bool) -> nimbus_build::Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(allow_empty)
            .interact_text()
            .map_err(|e| BuildError::Prompt(e.to_string()))
    }

    fn get_password(&self, prompt: &str) -> nimbus_build::Result<String> {
        Password::new()
            .with_prompt(prompt)
            .interact()
            .map_err(|e| BuildError::Prompt(e.to_string()))
    }
}
