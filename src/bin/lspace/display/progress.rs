use std::io::{self, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Stage spinner that collapses into a check-marked summary line, with the
/// stage's key numbers listed underneath.
pub struct StepSpinner {
    bar: Option<ProgressBar>,
    started: Instant,
    step_started: Instant,
    current: u8,
    total: u8,
}

impl StepSpinner {
    pub fn new(total: u8) -> Self {
        let now = Instant::now();
        Self {
            bar: None,
            started: now,
            step_started: now,
            current: 0,
            total,
        }
    }

    fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    pub fn step(&mut self, description: &str) {
        self.clear();
        self.current += 1;
        self.step_started = Instant::now();

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("   {spinner:.green} {msg}")
                .expect("invalid template")
                .tick_chars("◐◓◑◒◐"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message(format!(
            "({}/{}) {}...",
            self.current, self.total, description
        ));

        self.bar = Some(bar);
    }

    pub fn complete_step(&mut self, description: &str, substeps: &[&str]) {
        self.clear();

        let elapsed = self.step_started.elapsed().as_secs_f64();
        let mut stderr = io::stderr().lock();

        let _ = writeln!(
            stderr,
            "   \x1b[32m✓\x1b[0m {} \x1b[2m({:.1}s)\x1b[0m",
            description, elapsed
        );
        for substep in substeps {
            let _ = writeln!(stderr, "     \x1b[2m-\x1b[0m {}", substep);
        }
    }

    pub fn finish(mut self) {
        self.clear();
        print_footer(self.started.elapsed());
    }
}

fn print_footer(elapsed: Duration) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(
        stderr,
        "   \x1b[32m✓\x1b[0m All stages finished \x1b[2m({:.2}s total)\x1b[0m",
        elapsed.as_secs_f64()
    );
    let _ = writeln!(stderr);
}

pub struct SilentProgress {}

impl SilentProgress {
    pub fn new() -> Self {
        Self {}
    }

    pub fn step(&mut self, _description: &str) {}

    pub fn complete_step(&mut self, _description: &str, _substeps: &[&str]) {}
}

impl Default for SilentProgress {
    fn default() -> Self {
        Self::new()
    }
}

pub enum Progress {
    Interactive(StepSpinner),
    Silent(SilentProgress),
}

impl Progress {
    pub fn new(interactive: bool, total_steps: u8) -> Self {
        if interactive {
            Self::Interactive(StepSpinner::new(total_steps))
        } else {
            Self::Silent(SilentProgress::new())
        }
    }

    pub fn step(&mut self, description: &str) {
        match self {
            Self::Interactive(s) => s.step(description),
            Self::Silent(s) => s.step(description),
        }
    }

    pub fn complete_step(&mut self, description: &str, substeps: &[&str]) {
        match self {
            Self::Interactive(s) => s.complete_step(description, substeps),
            Self::Silent(s) => s.complete_step(description, substeps),
        }
    }

    pub fn finish(self) {
        match self {
            Self::Interactive(s) => s.finish(),
            Self::Silent(_) => {}
        }
    }
}
