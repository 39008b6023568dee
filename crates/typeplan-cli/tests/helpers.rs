//! Shared test utilities for CLI tests
//!
//! Provides a scratch project directory and a fake compiler script that
//! behaves enough like tsc for the CLI:
//!
//! - `--version` exits 0
//! - `--out DEST FILES...` concatenates FILES into DEST
//! - a file containing `ERROR` prints a TS1005 diagnostic and exits 1

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FAKE_COMPILER: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "Version 0.0.0-fake"
  exit 0
fi
out=""
files=""
while [ $# -gt 0 ]; do
  case "$1" in
    --out) out="$2"; shift 2 ;;
    --target|--module) shift 2 ;;
    --*) shift ;;
    *) files="$files $1"; shift ;;
  esac
done
status=0
: > "$out"
for f in $files; do
  if grep -q ERROR "$f"; then
    echo "$f(1,1): error TS1005: ';' expected."
    status=1
  fi
  cat "$f" >> "$out"
done
exit $status
"#;

pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn file(&self, relative: &str, text: &str) -> &Self {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
        self
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    /// Install the fake compiler and return its absolute path.
    #[cfg(unix)]
    pub fn fake_compiler(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.path("bin/fake-tsc");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, FAKE_COMPILER).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Write typeplan.json from a JSON value.
    pub fn config(&self, value: serde_json::Value) -> &Self {
        self.file(
            "typeplan.json",
            &serde_json::to_string_pretty(&value).unwrap(),
        )
    }

    /// `typeplan` running in the project directory with colors off.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("typeplan").unwrap();
        cmd.current_dir(self.root())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("TYPEPLAN_COMPILER")
            .env_remove("TYPEPLAN_JOBS");
        cmd
    }
}
