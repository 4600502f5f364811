//! Integration tests for the `labels` subcommand.

mod common;

use common::{cmd, sample_form, write_pdf};
use predicates::prelude::*;

#[test]
fn ranks_nearby_text_and_shows_heuristic_type() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(&dir, "form.pdf", &sample_form());

    cmd()
        .args(["labels", &pdf])
        .assert()
        .success()
        .stdout(predicate::str::contains("page\tname\ttype\theuristic_type"))
        .stdout(predicate::str::contains("1\tfull_name\ttext\ttext\t1\t"))
        .stdout(predicate::str::contains("Full Name:"))
        .stdout(predicate::str::contains("1\tdob\ttext\tdate\t1\t"));
}

#[test]
fn small_max_distance_leaves_fields_without_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(&dir, "form.pdf", &sample_form());

    cmd()
        .args(["labels", &pdf, "--pages", "1", "--max-distance", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1\tfull_name\ttext\ttext\t\t\t"))
        .stdout(predicate::str::contains("Full Name:").not());
}

#[test]
fn verbose_flag_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(&dir, "form.pdf", &sample_form());

    cmd().args(["-v", "labels", &pdf]).assert().success();
}
