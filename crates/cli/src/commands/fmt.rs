use std::path::Path;

use anyhow::{Result, bail};

use super::load_runner;

pub fn fmt_command(file: &Path, check: bool, config: Option<&Path>) -> Result<()> {
    let mut runner = load_runner(file, config)?;
    let report = runner.format(file)?;

    if !report.errors.is_empty() {
        for error in &report.errors {
            eprintln!("{}:{error}", file.display());
        }
        bail!("{} does not parse", file.display());
    }

    if check {
        if report.changed {
            bail!(
                "{} is not formatted; run `autodeps fmt` to see the canonical form",
                file.display()
            );
        }
        println!("✅ {} is formatted", file.display());
    } else {
        print!("{}", report.formatted);
    }
    Ok(())
}
