//! `TestWorld` pattern for declarative `jacques` CLI integration tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use assert_cmd::Command;
use tempfile::TempDir;

use crate::fixtures::ClaudeTranscriptBuilder;

/// Builder for constructing [`TestWorld`] with fine-grained control.
pub struct TestWorldBuilder {
    skip_workspace_creation: bool,
    env_vars: HashMap<String, String>,
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self { skip_workspace_creation: false, env_vars: HashMap::new() }
    }

    /// Skip pre-creating the workspace directory, for testing fresh-install
    /// scenarios (`doctor` against an empty `--data-dir`).
    pub fn without_workspace_dir(mut self) -> Self {
        self.skip_workspace_creation = true;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> TestWorld {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base_path = temp_dir.path().to_path_buf();
        let workspace_dir = base_path.join("workspace");
        let project_dir = base_path.join("project");

        if !self.skip_workspace_creation {
            std::fs::create_dir_all(&workspace_dir).expect("failed to create workspace dir");
        }
        std::fs::create_dir_all(&project_dir).expect("failed to create project dir");

        TestWorld { temp_dir, workspace_dir, project_dir, env_vars: self.env_vars }
    }
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Declarative test environment for the `jacques` binary.
///
/// # Example
/// ```no_run
/// use jacques_testing::TestWorld;
///
/// let world = TestWorld::new();
/// let result = world.run(&["doctor"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    workspace_dir: PathBuf,
    project_dir: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn builder() -> TestWorldBuilder {
        TestWorldBuilder::new()
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    /// The `--data-dir` workspace root (config, archive, search index).
    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }

    /// A project directory to use as `--project-root`.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a synthetic Claude Code transcript somewhere under the temp
    /// root and return its path, for use with `jacques archive --transcript`.
    pub fn write_transcript(&self, file_name: &str, builder: ClaudeTranscriptBuilder) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(file_name);
        Ok(builder.write_to(&path)?)
    }

    /// Configure a CLI command with this test environment's settings. The
    /// caller supplies the base command (typically `Command::cargo_bin("jacques")`).
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--data-dir").arg(&self.workspace_dir);
        cmd.current_dir(&self.project_dir);
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run `jacques` with the given arguments and collect its output.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("jacques")
            .map_err(|e| anyhow::anyhow!("failed to find jacques binary: {e}"))?;
        self.configure_command(&mut cmd);
        cmd.args(args);
        let output = cmd.output()?;
        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
