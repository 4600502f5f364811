//! Integration tests for the `schema` subcommand.

mod common;

use common::{cmd, sample_form, write_pdf};
use predicates::prelude::*;

#[test]
fn offline_schema_writes_output_json_beside_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(&dir, "intake_form.pdf", &sample_form());

    cmd()
        .args(["schema", &pdf, "--offline"])
        .env_remove("ANTHROPIC_API_KEY")
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 4 fields in 2 sections"));

    let text = std::fs::read_to_string(dir.path().join("output.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["form_id"], "intake_form");
    assert_eq!(json["title"], "Intake Form");
    assert_eq!(json["total_fields"], 4);
    assert_eq!(json["metadata"]["source_pdf"], "intake_form.pdf");
    assert_eq!(json["metadata"]["pages"], 2);
    assert_eq!(json["metadata"]["failed_fields"], 0);

    let page1 = &json["sections"][0];
    assert_eq!(page1["section_id"], "page_1");
    assert_eq!(page1["fields"][0]["field_id"], "field_001");
    assert_eq!(page1["fields"][0]["label"], "Full Name");
    assert_eq!(page1["fields"][1]["type"], "date");
    assert_eq!(page1["fields"][1]["placeholder"], "MM/DD/YYYY");

    let page2 = &json["sections"][1];
    assert_eq!(page2["fields"][0]["type"], "checkbox");
    assert_eq!(page2["fields"][1]["type"], "dropdown");
    assert_eq!(
        page2["fields"][1]["options"],
        serde_json::json!(["California", "Nevada, USA"])
    );
}

#[test]
fn output_dash_prints_json_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(&dir, "form.pdf", &sample_form());

    let output = cmd()
        .args(["schema", &pdf, "--offline", "--output", "-", "--pretty"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_fields"], 4);
    assert!(String::from_utf8_lossy(&output.stdout).contains("\n  \"form_id\""));
    assert!(!dir.path().join("output.json").exists());
}

#[test]
fn explicit_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(&dir, "form.pdf", &sample_form());
    let out = dir.path().join("schema.json");

    cmd()
        .args(["schema", &pdf, "--offline", "-o", out.to_str().unwrap()])
        .assert()
        .success();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["sections"].as_array().unwrap().len(), 2);
}

#[test]
fn missing_api_key_fails_without_offline() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(&dir, "form.pdf", &sample_form());

    cmd()
        .args(["schema", &pdf])
        .env_remove("ANTHROPIC_API_KEY")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"))
        .stderr(predicate::str::contains("--offline"));
    assert!(!dir.path().join("output.json").exists());
}

#[test]
fn missing_file_fails() {
    cmd()
        .args(["schema", "/nonexistent/form.pdf", "--offline"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn non_pdf_extension_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(&dir, "form.txt", &sample_form());

    cmd()
        .args(["schema", &path, "--offline"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("expected a .pdf file"));
}

#[test]
fn unparsable_pdf_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(&dir, "broken.pdf", b"this is not a pdf");

    cmd()
        .args(["schema", &path, "--offline"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to open PDF"));
}
