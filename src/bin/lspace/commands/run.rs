use anyhow::Result;

use crate::cli::RunArgs;
use crate::display::{Context, Progress};

use super::{package, preprocess, reduce, train};

const TOTAL_STEPS: u8 = 4;

pub fn run_all(args: RunArgs, ctx: Context) -> Result<()> {
    let workdir = &args.pipeline.workdir;
    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    preprocess::execute(workdir, &args.input, &mut progress)?;
    train::execute(workdir, &args.train, &mut progress)?;
    reduce::execute(workdir, &args.reduce, &mut progress)?;
    package::execute(workdir, &args.package, &mut progress)?;

    progress.finish();
    Ok(())
}
