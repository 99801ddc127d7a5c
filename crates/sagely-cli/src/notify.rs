//! Console implementation of the notification surface.

use console::style;

use sagely_core::notify::{NoticeLevel, Notifier};

/// Prints notices to stderr, styled by severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Error => {
                eprintln!("  {} {message}", style("!").red().bold());
            }
            NoticeLevel::Success => {
                eprintln!("  {} {message}", style("*").green().bold());
            }
            NoticeLevel::Info => {
                eprintln!("  {} {message}", style("-").cyan());
            }
        }
    }
}
