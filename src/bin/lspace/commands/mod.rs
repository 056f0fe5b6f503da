mod package;
mod preprocess;
mod reduce;
mod run;
mod train;

use anyhow::Result;

use crate::cli::Command;
use crate::display::Context;

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Preprocess(args) => preprocess::run_preprocess(args, ctx),
        Command::Train(args) => train::run_train(args, ctx),
        Command::Reduce(args) => reduce::run_reduce(args, ctx),
        Command::Package(args) => package::run_package(args, ctx),
        Command::Run(args) => run::run_all(args, ctx),
    }
}
