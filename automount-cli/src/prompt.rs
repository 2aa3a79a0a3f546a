// SPDX-License-Identifier: GPL-3.0-only

//! Terminal confirmations and progress output

use std::io::{self, BufRead, Write};

use automount_sys::Prompt;

/// Asks y/N questions on the terminal unless `assume_yes` is set
pub(crate) struct TerminalPrompt {
    assume_yes: bool,
    table_path: String,
}

impl TerminalPrompt {
    pub(crate) fn new(assume_yes: bool, table_path: impl Into<String>) -> Self {
        Self {
            assume_yes,
            table_path: table_path.into(),
        }
    }

    fn ask(&self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("{question} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(_) => false,
        }
    }
}

impl Prompt for TerminalPrompt {
    fn confirm_entry(&mut self, entry_line: &str) -> bool {
        println!("The following entry will be added to {}:", self.table_path);
        println!("  {entry_line}");
        self.ask("Continue?")
    }

    fn confirm_unmount(&mut self, device_name: &str, mountpoint: &str) -> bool {
        self.ask(&format!(
            "Unmount {device_name} from {mountpoint} and remove its entry from {}?",
            self.table_path
        ))
    }

    fn progress(&mut self, message: &str) {
        println!("{message}");
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
