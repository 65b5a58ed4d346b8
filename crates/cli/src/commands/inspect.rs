use std::path::Path;

use anyhow::Result;
use autodeps_core::qualifier::FieldValue;

use super::load_runner;

pub fn inspect_command(file: &Path, json: bool, config: Option<&Path>) -> Result<()> {
    let mut runner = load_runner(file, config)?;

    if json {
        println!("{}", runner.inspect_json(file)?);
        return Ok(());
    }

    let rules = runner.inspect(file)?;
    if rules.is_empty() {
        println!("No managed rules in {}", file.display());
        return Ok(());
    }
    for rule in rules {
        println!(
            "{} {} (line {})",
            rule.rule,
            rule.name.as_deref().unwrap_or("<unnamed>"),
            rule.line
        );
        for (field, value) in &rule.fields {
            println!("   {field}: {}", describe(value));
        }
    }
    Ok(())
}

fn describe(value: &FieldValue) -> String {
    match value {
        FieldValue::String(s) => s.clone(),
        FieldValue::Array(items) => items.join(", "),
        FieldValue::Glob(glob) if glob.exclude.is_empty() => {
            format!("glob({})", glob.include.join(", "))
        }
        FieldValue::Glob(glob) => format!(
            "glob({} excluding {})",
            glob.include.join(", "),
            glob.exclude.join(", ")
        ),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Number(n) => n.to_string(),
    }
}
