mod banner;
mod error;
mod progress;

pub use banner::{banner_for_help, print_banner};
pub use error::print_error;
pub use progress::Progress;

use std::io::IsTerminal;

#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub interactive: bool,
}

impl Context {
    pub fn detect() -> Self {
        Self {
            interactive: std::io::stderr().is_terminal(),
        }
    }

    pub fn with_quiet(self, quiet: bool) -> Self {
        if quiet {
            Self { interactive: false }
        } else {
            self
        }
    }
}
