use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use autodeps_core::{AutoDepsRunner, TaskStatus};
use tracing::debug;
use walkdir::WalkDir;

use super::load_runner;

pub fn sync_command(paths: &[PathBuf], json: bool, config: Option<&Path>) -> Result<()> {
    let mut reports = Vec::new();
    let mut failed = 0;
    let mut total = 0;

    for path in paths {
        let mut runner = load_runner(path, config)?;
        for file in source_files(&runner, path)? {
            total += 1;
            match runner.sync_file(&file) {
                Ok(report) => {
                    if report.status == TaskStatus::Failed {
                        failed += 1;
                    }
                    if !json {
                        println!("{report}");
                    }
                    reports.push(report);
                }
                Err(e) => {
                    failed += 1;
                    eprintln!("❌ {}: {e}", file.display());
                }
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    if failed > 0 {
        bail!("{failed} of {total} file(s) failed to sync");
    }
    Ok(())
}

/// `path` itself, or every file below it with a role
fn source_files(runner: &AutoDepsRunner, path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(path).sort_by_file_name().into_iter().filter_entry(|entry| {
        let name = entry.file_name().to_string_lossy();
        entry.depth() == 0 || !(name.starts_with('.') || name == "node_modules")
    });
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
        let file = std::path::absolute(entry.path())?;
        if entry.file_type().is_file()
            && !runner.is_build_file(&file)
            && runner.role_of(&file).is_some()
        {
            files.push(file);
        } else {
            debug!("Skipping {}", entry.path().display());
        }
    }
    Ok(files)
}
