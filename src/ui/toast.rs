//! Toasts printed to stderr.

use console::{Term, style};
use indicatif::MultiProgress;
use tracing::debug;

use super::icons::{CHECK, CROSS, INFO};
use crate::desk::notify::{Notifier, Toast, ToastLevel};

/// Prints each toast as one styled line on stderr.
///
/// Lines go through the same `MultiProgress` the spinners use, so a toast
/// raised mid-request is printed above the spinner instead of under it.
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    multi: MultiProgress,
    term: Term,
}

impl ConsoleNotifier {
    pub fn new(multi: MultiProgress) -> Self {
        Self {
            multi,
            term: Term::stderr(),
        }
    }
}

pub fn format_toast(toast: &Toast) -> String {
    match toast.level {
        ToastLevel::Success => format!("{}{}", CHECK, style(&toast.message).green()),
        ToastLevel::Info => format!("{}{}", INFO, style(&toast.message).cyan()),
        ToastLevel::Error => format!("{}{}", CROSS, style(&toast.message).red().bold()),
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, toast: Toast) {
        debug!(level = ?toast.level, message = %toast.message, "toast");
        let line = format_toast(&toast);
        // A hidden target swallows println, so plain stderr takes over.
        let printed = if self.multi.is_hidden() {
            self.term.write_line(&line)
        } else {
            self.multi.println(&line)
        };
        if printed.is_err() {
            eprintln!("{}", line);
        }
    }
}
