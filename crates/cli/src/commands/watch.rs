use std::path::Path;
use std::sync::mpsc;

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tracing::{debug, warn};

use super::load_runner;

pub fn watch_command(dir: &Path, config: Option<&Path>) -> Result<()> {
    let dir = std::path::absolute(dir)?;
    let mut runner = load_runner(&dir, config)?;

    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to start file watcher")?;
    watcher
        .watch(&dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", dir.display()))?;
    println!("👀 Watching {} (Ctrl-C to stop)", dir.display());

    for result in rx {
        let event = match result {
            Ok(event) => event,
            Err(e) => {
                warn!("Watch error: {}", e);
                continue;
            }
        };
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            continue;
        }
        for path in event.paths {
            // Our own writes land in declaration files and must not loop
            if !path.is_file() || runner.is_build_file(&path) || runner.role_of(&path).is_none() {
                debug!("Ignoring change to {}", path.display());
                continue;
            }
            match runner.sync_file(&path) {
                Ok(report) => println!("{report}"),
                Err(e) => eprintln!("❌ {}: {e}", path.display()),
            }
        }
    }
    Ok(())
}
