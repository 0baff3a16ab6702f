#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::assert::Assert;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Interpreter stand-in: answers the version probe, `pip list`, `pip freeze`
/// and the distribution mapping script, and appends every other pip call to
/// `pip.log` beside itself.
const FAKE_PYTHON: &str = r#"#!/bin/sh
here="$(dirname "$0")"
case "$1" in
  -c)
    case "$2" in
      *platform*) echo "3.11.4" ;;
      *) echo '{"requests": ["requests"], "six": ["six"]}' ;;
    esac
    ;;
  -m)
    shift 2
    case "$1" in
      list) echo '[{"name": "six", "version": "1.16.0"}, {"name": "requests", "version": "2.31.0"}]' ;;
      freeze) printf 'requests==2.31.0\nsix==1.16.0\n' ;;
      *) echo "$*" >> "$here/pip.log" ;;
    esac
    ;;
  *) echo "Python 3.11.4" ;;
esac
"#;

/// A workspace directory plus an isolated state file.
pub struct Sandbox {
    pub temp: TempDir,
    pub workspace: PathBuf,
    pub state_file: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let temp = tempfile::Builder::new()
            .prefix("venvx-cli")
            .tempdir()
            .expect("tempdir");
        let workspace = temp.path().join("workspace");
        fs::create_dir_all(&workspace).expect("workspace dir");
        let state_file = temp.path().join("state").join("state.json");
        Self {
            temp,
            workspace,
            state_file,
        }
    }

    /// `venvx` pinned to this sandbox's workspace and state, offline, with
    /// confirmations answered.
    pub fn venvx(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("venvx");
        cmd.current_dir(&self.workspace)
            .env("VENVX_STATE_FILE", &self.state_file)
            .env("VENVX_ONLINE", "0")
            .env("NO_COLOR", "1")
            .arg("--workspace")
            .arg(&self.workspace)
            .arg("--yes");
        cmd
    }

    pub fn state(&self) -> Value {
        let contents = fs::read_to_string(&self.state_file).expect("state file");
        serde_json::from_str(&contents).expect("state json")
    }
}

#[cfg(unix)]
pub fn fake_env(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let bin = dir.join("bin");
    fs::create_dir_all(&bin).expect("bin dir");
    let python = bin.join("python3");
    fs::write(&python, FAKE_PYTHON).expect("write fake python");
    let mut perms = fs::metadata(&python).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&python, perms).expect("chmod");
    fs::write(dir.join("pyvenv.cfg"), "home = /usr/bin\n").expect("pyvenv.cfg");
    python
}

pub fn pip_log(env_dir: &Path) -> String {
    fs::read_to_string(env_dir.join("bin").join("pip.log")).unwrap_or_default()
}

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}

pub fn stdout(assert: &Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout")
}

pub fn stderr(assert: &Assert) -> String {
    String::from_utf8(assert.get_output().stderr.clone()).expect("utf8 stderr")
}
