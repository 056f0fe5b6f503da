use std::path::Path;

use anyhow::{Context as _, Result};

use lipid_space::space::reduce;

use crate::cli::{ReduceArgs, ReduceOptions};
use crate::config::build_reduce_config;
use crate::display::{Context, Progress};

pub fn run_reduce(args: ReduceArgs, ctx: Context) -> Result<()> {
    let mut progress = Progress::new(ctx.interactive, 1);
    execute(&args.pipeline.workdir, &args.reduce, &mut progress)?;
    progress.finish();
    Ok(())
}

pub fn execute(workdir: &Path, options: &ReduceOptions, progress: &mut Progress) -> Result<()> {
    let config = build_reduce_config(options)?;

    progress.step("Projecting to 2D and 3D");
    let summary = reduce::run(workdir, &config).context("Dimensionality reduction failed")?;

    let substeps = [
        format!(
            "Run t-SNE over {} vectors (perplexity {})",
            summary.records, summary.perplexity
        ),
        "Write matched 2D and 3D coordinate tables".to_string(),
    ];
    let substeps_ref: Vec<&str> = substeps.iter().map(|s| s.as_str()).collect();
    progress.complete_step("Projecting to 2D and 3D", &substeps_ref);

    Ok(())
}
