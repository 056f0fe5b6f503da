use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};

use lipid_space::space::package;

use crate::cli::{PackageArgs, PackageOptions};
use crate::config::build_package_config;
use crate::display::{Context, Progress};

pub fn run_package(args: PackageArgs, ctx: Context) -> Result<()> {
    let mut progress = Progress::new(ctx.interactive, 1);
    execute(&args.pipeline.workdir, &args.package, &mut progress)?;
    progress.finish();
    Ok(())
}

pub fn execute(workdir: &Path, options: &PackageOptions, progress: &mut Progress) -> Result<()> {
    let out_dir = options.out.as_deref().unwrap_or(workdir);
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory '{}'", out_dir.display()))?;
    let config = build_package_config(options);

    progress.step("Packaging archives");
    let summary = package::run(workdir, out_dir, &config).context("Packaging failed")?;

    let mut substeps = vec![format!("Ship {} records present in every table", summary.rows)];
    if summary.dropped > 0 {
        substeps.push(format!(
            "{} records dropped by the key intersection",
            summary.dropped
        ));
    }
    for path in &summary.archives {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        substeps.push(format!("Write {}", name));
    }

    let substeps_ref: Vec<&str> = substeps.iter().map(|s| s.as_str()).collect();
    progress.complete_step("Packaging archives", &substeps_ref);

    Ok(())
}
