//! End-to-end integration tests for the actiongen CLI

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const SCHEMA: &str = r#"
actions:
  - ping:
      req: null
      resp:
        message: string
  - get_file_list:
      req:
        path: string
      resp:
        files: List<string>
  - subscribe_event:
      req:
        type: EventType
  - heart_beat:
"#;

/// A throwaway project with a schema at its root
struct TestProject {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl TestProject {
    fn new(schema: &str) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let root = dir.path().to_path_buf();
        std::fs::write(root.join("actions_meta.yml"), schema)?;
        Ok(Self { _dir: dir, root })
    }

    fn run(&self, subcommand: &str, extra: &[&str]) -> Result<Output> {
        Command::new(env!("CARGO_BIN_EXE_actiongen"))
            .arg(subcommand)
            .args(["--schema", "actions_meta.yml"])
            .args(["--out", "Daemon/Action/ActionTemplate.cs"])
            .arg("--project-root")
            .arg(&self.root)
            .args(["--extra-type", "EventType"])
            .args(extra)
            .output()
            .with_context(|| format!("Failed to run actiongen {subcommand}"))
    }

    fn read(&self, relative: &str) -> Result<String> {
        let path = self.root.join(relative);
        std::fs::read_to_string(&path).with_context(|| format!("Missing {}", path.display()))
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_generate_writes_source_and_enum() -> Result<()> {
    let project = TestProject::new(SCHEMA)?;
    let output = project.run("generate", &["--yes"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let source = project.read("Daemon/Action/ActionTemplate.cs")?;
    assert!(source.contains("namespace Daemon.Action;"));
    assert!(source.contains("public static class ActionTemplate"));
    assert!(source.contains("/// Generated by \"actions_meta.yml\""));
    assert!(source.contains("public static Empty.Request RequestOf(JObject? data)"));
    assert!(source.contains("public static IActionResponse ResponseOf(List<string> files)"));
    assert!(source.contains("public EventType Type;"));

    let enumeration = project.read("Daemon/Action/ActionType.cs")?;
    assert!(enumeration.contains(
        "public enum ActionType\n{\n    Ping,\n    GetFileList,\n    SubscribeEvent,\n    HeartBeat\n}"
    ));
    Ok(())
}

#[test]
fn test_check_detects_stale_output() -> Result<()> {
    let project = TestProject::new(SCHEMA)?;

    let output = project.run("check", &[])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("missing"));

    let output = project.run("generate", &["--yes"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let output = project.run("check", &[])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    std::fs::write(project.path("actions_meta.yml"), "actions:\n  - ping:\n")?;
    let output = project.run("check", &[])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("out of date"));
    Ok(())
}

#[test]
fn test_invalid_schema_writes_nothing() -> Result<()> {
    let project = TestProject::new("actions:\n  - ping:\n      req:\n        id: Uuid\n")?;
    let output = project.run("generate", &["--yes"])?;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown type `Uuid`"), "stderr: {}", stderr(&output));
    assert!(!Path::new(&project.path("Daemon")).exists());
    Ok(())
}

#[test]
fn test_output_path_without_namespace_is_rejected() -> Result<()> {
    let project = TestProject::new(SCHEMA)?;
    let output = Command::new(env!("CARGO_BIN_EXE_actiongen"))
        .args(["generate", "--yes", "--schema", "actions_meta.yml", "--out", "Actions.cs"])
        .arg("--project-root")
        .arg(&project.root)
        .output()?;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("namespace"), "stderr: {}", stderr(&output));
    Ok(())
}

#[test]
fn test_config_file_with_flag_overrides() -> Result<()> {
    let project = TestProject::new(SCHEMA)?;
    let config = format!(
        "schema_path: actions_meta.yml\noutput_path: Game/Net/Messages.cs\nproject_root: {}\nenum_file_name: MessageKind.cs\nextra_types: [EventType]\nserializer: JsonSerializer.Create(Settings.Json)\n",
        project.root.display()
    );
    let config_path = project.path("actiongen.yaml");
    std::fs::write(&config_path, config)?;

    let output = Command::new(env!("CARGO_BIN_EXE_actiongen"))
        .args(["generate", "--yes", "--config"])
        .arg(&config_path)
        .args(["--out", "Game/Net/Protocol.cs"])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let source = project.read("Game/Net/Protocol.cs")?;
    assert!(source.contains("public static class Protocol"));
    assert!(source.contains("Serializer = JsonSerializer.Create(Settings.Json);"));
    let enumeration = project.read("Game/Net/MessageKind.cs")?;
    assert!(enumeration.contains("public enum MessageKind"));
    Ok(())
}

/// Poll until `check` holds or the deadline passes
fn wait_for(mut check: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(15);
    while std::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
    false
}

#[test]
fn test_watch_regenerates_on_schema_change() -> Result<()> {
    let project = TestProject::new(SCHEMA)?;
    let mut child = Command::new(env!("CARGO_BIN_EXE_actiongen"))
        .args(["watch", "--schema", "actions_meta.yml", "--out", "Daemon/Action/ActionTemplate.cs"])
        .arg("--project-root")
        .arg(&project.root)
        .args(["--extra-type", "EventType"])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .context("Failed to start actiongen watch")?;

    let enum_path = project.path("Daemon/Action/ActionType.cs");
    let generated = wait_for(|| {
        std::fs::read_to_string(&enum_path).is_ok_and(|content| content.contains("HeartBeat"))
    });

    // Give the watcher time to register before touching the schema
    std::thread::sleep(std::time::Duration::from_millis(500));
    std::fs::write(project.path("actions_meta.yml"), "actions:\n  - ping:\n  - shutdown:\n")?;
    let regenerated = wait_for(|| {
        std::fs::read_to_string(&enum_path)
            .is_ok_and(|content| content.contains("Shutdown") && !content.contains("HeartBeat"))
    });

    child.kill()?;
    child.wait()?;
    assert!(generated, "initial generation did not happen");
    assert!(regenerated, "schema change was not picked up");
    Ok(())
}
