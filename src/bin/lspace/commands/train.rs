use std::path::Path;

use anyhow::{Context as _, Result};

use lipid_space::space::train;

use crate::cli::{TrainArgs, TrainOptions};
use crate::config::build_train_config;
use crate::display::{Context, Progress};

pub fn run_train(args: TrainArgs, ctx: Context) -> Result<()> {
    let mut progress = Progress::new(ctx.interactive, 1);
    execute(&args.pipeline.workdir, &args.train, &mut progress)?;
    progress.finish();
    Ok(())
}

pub fn execute(workdir: &Path, options: &TrainOptions, progress: &mut Progress) -> Result<()> {
    let config = build_train_config(options)?;

    progress.step("Training token embeddings");
    let summary = train::run(workdir, &config).context("Embedding training failed")?;

    let mut substeps = vec![
        format!(
            "Train {}-dimensional skip-gram model ({} epochs)",
            config.vector_size, config.epochs
        ),
        format!("Vocabulary holds {} tokens", summary.vocabulary),
        format!("Embed {} records as token vector sums", summary.records),
    ];
    if summary.skipped > 0 {
        substeps.push(format!(
            "{} records dropped below the count threshold",
            summary.skipped
        ));
    }

    let substeps_ref: Vec<&str> = substeps.iter().map(|s| s.as_str()).collect();
    progress.complete_step("Training token embeddings", &substeps_ref);

    Ok(())
}
