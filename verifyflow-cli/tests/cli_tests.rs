//! Tests of the `verifyflow` binary: output streams and exit codes.

use std::io::{Cursor, Write};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|text| format!(r#"<w:p><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#))
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::default();
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// Temp dir holding `thesis.docx` and a `steps` profile with one rule
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("thesis.docx"),
        docx(&["Москва 2024", "Текст\u{00A0}с неразрывным пробелом"]),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("steps.yaml"),
        "rules:\n  text_formatting: {}\n",
    )
    .unwrap();
    dir
}

fn run(dir: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_verifyflow"))
        .arg("-i")
        .arg(dir.join("thesis.docx"))
        .arg("--profiles-dir")
        .arg(dir)
        .args(extra)
        .env("HOME", dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn stdout_stays_json_with_step_timings() {
    let dir = workspace();
    let output = run(dir.path(), &["-p", "steps", "--profile-steps"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["profile_name"], "steps");
    assert_eq!(report["summary"]["total"], 1);
    assert_eq!(report["issues"][0]["rule_id"], "TextFormatting.nonstandard_char");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Performance Summary"), "{stderr}");
}

#[test]
fn output_file_receives_the_report() {
    let dir = workspace();
    let target = dir.path().join("report.json");
    let output = run(
        dir.path(),
        &["-p", "steps", "--pretty", "-o", target.to_str().unwrap()],
    );

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(report["format"], "docx");
}

#[test]
fn unknown_profile_exits_with_code_two() {
    let dir = workspace();
    let output = run(dir.path(), &["-p", "missing"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}
