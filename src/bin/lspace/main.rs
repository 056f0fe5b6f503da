use std::process::ExitCode;

mod cli;
mod commands;
mod config;
mod display;
mod util;

fn main() -> ExitCode {
    let cli = cli::parse();
    let quiet = match &cli.command {
        cli::Command::Preprocess(args) => args.pipeline.quiet,
        cli::Command::Train(args) => args.pipeline.quiet,
        cli::Command::Reduce(args) => args.pipeline.quiet,
        cli::Command::Package(args) => args.pipeline.quiet,
        cli::Command::Run(args) => args.pipeline.quiet,
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(quiet)))
        .init();

    let ctx = display::Context::detect().with_quiet(quiet);

    if ctx.interactive {
        display::print_banner();
    }

    match commands::dispatch(cli.command, ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// Default log filter; `--quiet` drops the per-record warnings so scripted
/// runs keep a clean stderr. `RUST_LOG` still overrides either default.
fn log_filter(quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        "warn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_lowers_the_default_log_filter() {
        assert_eq!(log_filter(false), "warn");
        assert_eq!(log_filter(true), "error");
    }
}
