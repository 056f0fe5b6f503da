use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};

use lipid_space::space::preprocess;
use lipid_space::SourceDb;

use crate::cli::{InputOptions, PreprocessArgs};
use crate::config::build_preprocess_config;
use crate::display::{Context, Progress};

pub fn run_preprocess(args: PreprocessArgs, ctx: Context) -> Result<()> {
    let mut progress = Progress::new(ctx.interactive, 1);
    execute(&args.pipeline.workdir, &args.input, &mut progress)?;
    progress.finish();
    Ok(())
}

pub fn execute(workdir: &Path, input: &InputOptions, progress: &mut Progress) -> Result<()> {
    fs::create_dir_all(workdir)
        .with_context(|| format!("Failed to create working directory '{}'", workdir.display()))?;

    progress.step("Preprocessing databases");
    let config = build_preprocess_config(input);
    let summary = preprocess::run(&input.sdf, &input.tsv, workdir, &config)
        .context("Preprocessing failed")?;

    let substeps = build_substeps(&summary);
    let substeps_ref: Vec<&str> = substeps.iter().map(|s| s.as_str()).collect();
    progress.complete_step("Preprocessing databases", &substeps_ref);

    Ok(())
}

fn build_substeps(summary: &preprocess::PreprocessSummary) -> Vec<String> {
    let mut steps = Vec::new();

    for source in &summary.sources {
        let name = match source.source {
            SourceDb::Lmsd => "LMSD",
            SourceDb::SwissLipids => "SwissLipids",
        };
        let mut line = format!("{}: {} of {} records kept", name, source.kept, source.read);
        if source.filtered > 0 {
            line.push_str(&format!(", {} below level", source.filtered));
        }
        if source.failed > 0 {
            line.push_str(&format!(", {} unparsed", source.failed));
        }
        if source.duplicates > 0 {
            line.push_str(&format!(", {} duplicate structures", source.duplicates));
        }
        steps.push(line);
    }

    steps.push(format!(
        "Write database, SMILES, and token tables ({} records)",
        summary.records
    ));
    steps
}
