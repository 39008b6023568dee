//! End-to-end tests of the `typeplan` binary.

#![cfg(unix)]

mod helpers;

use helpers::Project;
use predicates::prelude::*;
use serde_json::json;
use serial_test::serial;

fn project_with_app_target() -> Project {
    let project = Project::new();
    let compiler = project.fake_compiler();
    project
        .file("src/a.ts", "var a = 1;\n")
        .file("src/nested/b.ts", "var b = 2;\n")
        .config(json!({
            "compiler": compiler,
            "targets": {
                "app": { "files": [{ "src": ["src/**/*.ts"], "dest": "build/" }] }
            }
        }));
    project
}

#[test]
#[serial]
fn build_compiles_every_target() {
    let project = project_with_app_target();

    project
        .cmd()
        .arg("build")
        .assert()
        .success()
        .stderr(predicate::str::contains("Build completed"));

    assert_eq!(project.read("build/a.js"), "var a = 1;\n");
    assert_eq!(project.read("build/nested/b.js"), "var b = 2;\n");
}

#[test]
#[serial]
fn build_reports_compiler_errors_and_fails() {
    let project = project_with_app_target();
    project.file("src/bad.ts", "var ERROR\n");

    project
        .cmd()
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("';' expected."))
        .stderr(predicate::str::contains("1 of 3 jobs failed"));

    // Other jobs still ran.
    assert!(project.path("build/a.js").exists());
}

#[test]
#[serial]
fn referenced_files_are_compiled_first() {
    let project = Project::new();
    let compiler = project.fake_compiler();
    project
        .file("src/main.ts", "/// <reference path=\"lib.ts\" />\nvar main;\n")
        .file("src/lib.ts", "var lib;\n");

    project
        .cmd()
        .args(["build", "--src", "src/main.ts", "--dest", "app.js", "--compiler"])
        .arg(&compiler)
        .assert()
        .success();

    let output = project.read("app.js");
    let lib = output.find("var lib;").unwrap();
    let main = output.find("var main;").unwrap();
    assert!(lib < main, "dependency must come first:\n{output}");
}

#[test]
#[serial]
fn check_prints_plan_as_json_without_writing() {
    let project = project_with_app_target();

    let output = project
        .cmd()
        .args(["check", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let planned: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(planned[0]["target"], "app");
    let jobs = planned[0]["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 2);
    assert!(
        jobs[0]["destination"]
            .as_str()
            .unwrap()
            .ends_with("build/a.js")
    );
    assert!(!project.path("build").exists());
}

#[test]
#[serial]
fn unknown_target_lists_available_ones() {
    let project = project_with_app_target();

    project
        .cmd()
        .args(["build", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Target 'nope' not found"))
        .stderr(predicate::str::contains("app"));
}

#[test]
#[serial]
fn missing_compiler_suggests_install() {
    let project = Project::new();
    project.file("src/a.ts", "var a;\n").config(json!({
        "compiler": "/nonexistent/typeplan-test-tsc",
        "targets": { "app": { "files": [{ "src": ["src/a.ts"], "dest": "out.js" }] } }
    }));

    project
        .cmd()
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("npm install -g typescript"));

    assert!(!project.path("out.js").exists());
}

#[test]
#[serial]
fn missing_explicit_config_is_an_error() {
    let project = Project::new();

    project
        .cmd()
        .args(["check", "--config", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
#[serial]
fn zero_jobs_is_rejected_by_the_parser() {
    let project = project_with_app_target();

    project
        .cmd()
        .args(["build", "--jobs", "0"])
        .assert()
        .failure();
}

#[test]
#[serial]
fn init_writes_a_config_that_checks_clean() {
    let project = Project::new();

    project
        .cmd()
        .arg("init")
        .assert()
        .success()
        .stderr(predicate::str::contains("Created typeplan.json"));
    assert!(project.read("typeplan.json").contains("\"targets\""));

    project.cmd().arg("check").assert().success();
    project.cmd().arg("init").assert().failure();
}

#[test]
#[serial]
fn init_schema_prints_json_schema() {
    let project = Project::new();

    let output = project
        .cmd()
        .args(["init", "--schema"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let schema: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert!(schema["properties"]["targets"].is_object());
    assert!(!project.path("typeplan.json").exists());
}
