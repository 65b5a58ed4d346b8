//! Integration tests for syncing source files into declaration files

use autodeps_core::config::CONFIG_FILE_NAME;
use autodeps_core::{AutoDepsRunner, TaskStatus, WriteStrategy};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn workspace() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let ws = temp.path().join("ws");
    let config = serde_json::json!({
        "resolve": {
            "aliases": { "@shared/*": "src/shared/*" }
        }
    });
    write_file(
        &ws.join(CONFIG_FILE_NAME),
        &serde_json::to_string_pretty(&config).unwrap(),
    );
    write_file(
        &ws.join("src/app/BUILD"),
        "ts_library(\n    name = \"util\",\n    srcs = [\"util.ts\"],\n)\n",
    );
    write_file(&ws.join("src/app/util.ts"), "export const x = 1;\n");
    write_file(&ws.join("src/shared/types.ts"), "export type T = string;\n");
    write_file(
        &ws.join("src/app/main.ts"),
        "import { x } from \"./util\";\nimport { T } from \"@shared/types\";\nimport React from \"react\";\n",
    );
    (temp, ws)
}

#[test]
fn test_sync_appends_then_keeps_rule() {
    let (_temp, ws) = workspace();
    let main = ws.join("src/app/main.ts");
    let mut runner = AutoDepsRunner::for_path(&main).unwrap();

    let report = runner.sync_file(&main).unwrap();
    assert_eq!(report.dependencies, vec![":util", "//src/shared:types"]);
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(report.unresolved[0].import, "react");
    assert!(report.unresolved[0].hint.contains("resolve.aliases"));
    assert_eq!(report.status, TaskStatus::PartialSuccess);

    let outcome = report.outcome.unwrap();
    assert_eq!(outcome.strategy, WriteStrategy::Append);
    assert!(outcome.changed);
    assert_eq!(
        fs::read_to_string(ws.join("src/app/BUILD")).unwrap(),
        "ts_library(\n    name = \"util\",\n    srcs = [\"util.ts\"],\n)\n\nts_library(\n    name = \"main\",\n    srcs = [\"main.ts\"],\n    deps = [\":util\", \"//src/shared:types\"],\n)\n"
    );

    let again = runner.sync_file(&main).unwrap();
    let outcome = again.outcome.unwrap();
    assert_eq!(outcome.strategy, WriteStrategy::Update);
    assert!(!outcome.changed);
}

#[test]
fn test_sync_updates_only_the_owning_rule() {
    let (_temp, ws) = workspace();
    let main = ws.join("src/app/main.ts");
    let mut runner = AutoDepsRunner::for_path(&main).unwrap();
    runner.sync_file(&main).unwrap();

    fs::write(&main, "import { x } from './util';\n").unwrap();
    let report = runner.sync_file(&main).unwrap();
    assert_eq!(report.status, TaskStatus::Success);
    assert_eq!(report.outcome.unwrap().strategy, WriteStrategy::Update);
    let text = fs::read_to_string(ws.join("src/app/BUILD")).unwrap();
    assert!(text.starts_with("ts_library(\n    name = \"util\",\n    srcs = [\"util.ts\"],\n)\n"));
    assert!(text.contains("    deps = [\":util\"],\n"));
    assert!(!text.contains("//src/shared:types"));
}

#[test]
fn test_sync_creates_missing_declaration_file() {
    let (_temp, ws) = workspace();
    let types = ws.join("src/shared/types.ts");
    let mut runner = AutoDepsRunner::for_path(&types).unwrap();

    let report = runner.sync_file(&types).unwrap();
    assert_eq!(report.status, TaskStatus::Success);
    assert_eq!(report.outcome.unwrap().strategy, WriteStrategy::Create);
    assert_eq!(
        fs::read_to_string(ws.join("src/shared/BUILD")).unwrap(),
        "ts_library(\n    name = \"types\",\n    srcs = [\"types.ts\"],\n)\n"
    );
}

#[test]
fn test_test_file_depends_on_module_rule() {
    let (_temp, ws) = workspace();
    let main = ws.join("src/app/main.ts");
    let test = ws.join("src/app/main.test.ts");
    write_file(&test, "import { main } from './main';\n");
    let mut runner = AutoDepsRunner::for_path(&main).unwrap();
    runner.sync_file(&main).unwrap();

    let report = runner.sync_file(&test).unwrap();
    assert_eq!(report.dependencies, vec![":main"]);
    let text = fs::read_to_string(ws.join("src/app/BUILD")).unwrap();
    assert!(text.ends_with(
        "ts_test(\n    name = \"main_test\",\n    srcs = [\"main.test.ts\"],\n    deps = [\":main\"],\n)\n"
    ));
}

#[test]
fn test_unparsable_declaration_file_is_recreated() {
    let (_temp, ws) = workspace();
    fs::write(ws.join("src/app/BUILD"), "def nope(:\n").unwrap();
    let main = ws.join("src/app/main.ts");
    write_file(&main, "import { T } from \"@shared/types\";\n");
    let mut runner = AutoDepsRunner::for_path(&main).unwrap();

    let report = runner.sync_file(&main).unwrap();
    assert_eq!(report.status, TaskStatus::PartialSuccess);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].contains("parse error"));
    let outcome = report.outcome.unwrap();
    assert_eq!(outcome.strategy, WriteStrategy::Create);
    assert_eq!(
        fs::read_to_string(ws.join("src/app/BUILD")).unwrap(),
        "ts_library(\n    name = \"main\",\n    srcs = [\"main.ts\"],\n    deps = [\"//src/shared:types\"],\n)\n"
    );
}
