use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CONTRACT: &str =
    "The vendor shall deliver the goods by March 1. The buyer may inspect the goods on arrival.";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn locate_prints_spans_and_unmatched_ids() {
    let dir = TempDir::new().unwrap();
    let document = write(dir.path(), "contract.txt", CONTRACT);
    let statements = write(
        dir.path(),
        "statements.json",
        r#"[
            {"id": 1, "description": "The vendor shall deliver the goods by March 1."},
            {"id": "2", "description": "Nothing like this appears anywhere in the text."}
        ]"#,
    );

    let mut cmd = cargo_bin_cmd!("docspan");
    cmd.arg("locate")
        .arg(&document)
        .arg("--statements")
        .arg(&statements)
        .arg("--compact");

    cmd.assert().success().stdout(
        predicate::str::contains(r#""representation":"flat""#)
            .and(predicate::str::contains(r#""start":0,"end":46"#))
            .and(predicate::str::contains(r#""primary":"1""#))
            .and(predicate::str::contains(r#""unmatched":["2"]"#)),
    );
}

#[test]
fn locate_reads_wrapped_yaml_statements() {
    let dir = TempDir::new().unwrap();
    let document = write(dir.path(), "contract.txt", CONTRACT);
    let statements = write(
        dir.path(),
        "statements.yaml",
        "statements:\n  - id: 7\n    description: The buyer may inspect the goods on arrival.\n",
    );

    let mut cmd = cargo_bin_cmd!("docspan");
    cmd.arg("locate")
        .arg(&document)
        .arg("-s")
        .arg(&statements)
        .arg("--compact");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""primary":"7""#));
}

#[test]
fn segments_split_the_document() {
    let dir = TempDir::new().unwrap();
    let document = write(dir.path(), "contract.txt", CONTRACT);
    let statements = write(
        dir.path(),
        "statements.json",
        r#"{"statements": [{"id": "a", "description": "The buyer may inspect the goods on arrival."}]}"#,
    );

    let mut cmd = cargo_bin_cmd!("docspan");
    cmd.arg("locate")
        .arg(&document)
        .arg("--statements")
        .arg(&statements)
        .arg("--format")
        .arg("segments")
        .arg("--compact");

    cmd.assert().success().stdout(
        predicate::str::contains(r#""kind":"plain""#)
            .and(predicate::str::contains(r#""kind":"highlight""#))
            .and(predicate::str::contains(
                "The buyer may inspect the goods on arrival.",
            )),
    );
}

#[test]
fn html_documents_get_marks() {
    let dir = TempDir::new().unwrap();
    let document = write(
        dir.path(),
        "contract.html",
        "<p>The vendor shall deliver the goods by March 1.</p><p>Unrelated closing words.</p>",
    );
    let statements = write(
        dir.path(),
        "statements.json",
        r#"[{"id": 1, "description": "The vendor shall deliver the goods by March 1.", "directive": "shall"}]"#,
    );

    let mut cmd = cargo_bin_cmd!("docspan");
    cmd.arg("locate")
        .arg(&document)
        .arg("--statements")
        .arg(&statements)
        .arg("--format")
        .arg("html");

    cmd.assert().success().stdout(
        predicate::str::contains("<mark")
            .and(predicate::str::contains(r#"data-primary-id="1""#))
            .and(predicate::str::contains("docspan-directive-shall")),
    );
}

#[test]
fn directive_filter_hides_other_statements() {
    let dir = TempDir::new().unwrap();
    let document = write(dir.path(), "contract.txt", CONTRACT);
    let statements = write(
        dir.path(),
        "statements.json",
        r#"[
            {"id": 1, "description": "The vendor shall deliver the goods by March 1.", "directive": "shall"},
            {"id": 2, "description": "The buyer may inspect the goods on arrival.", "directive": "may"}
        ]"#,
    );

    let mut cmd = cargo_bin_cmd!("docspan");
    cmd.arg("locate")
        .arg(&document)
        .arg("--statements")
        .arg(&statements)
        .arg("--directive")
        .arg("may")
        .arg("--compact");

    cmd.assert().success().stdout(
        predicate::str::contains(r#""primary":"2""#)
            .and(predicate::str::contains(r#""primary":"1""#).not()),
    );
}

#[test]
fn diff_between_two_scans_reports_statuses() {
    let dir = TempDir::new().unwrap();
    let document = write(dir.path(), "contract.txt", CONTRACT);
    let older = write(
        dir.path(),
        "older.json",
        r#"[{"id": 1, "description": "The vendor shall deliver the goods by March 1."}]"#,
    );
    let newer = write(
        dir.path(),
        "newer.json",
        r#"[
            {"id": 1, "description": "The vendor shall deliver the goods by March 1."},
            {"id": 2, "description": "The buyer may inspect the goods on arrival."}
        ]"#,
    );

    let mut cmd = cargo_bin_cmd!("docspan");
    cmd.arg("diff")
        .arg(&document)
        .arg("--older")
        .arg(&older)
        .arg("--newer")
        .arg(&newer)
        .arg("--compact");

    cmd.assert().success().stdout(
        predicate::str::contains(r#""entries":["#)
            .and(predicate::str::contains(r#""status":"added""#))
            .and(predicate::str::contains(r#""status":"unchanged""#)),
    );
}

#[test]
fn diff_requires_a_source() {
    let dir = TempDir::new().unwrap();
    let document = write(dir.path(), "contract.txt", CONTRACT);

    let mut cmd = cargo_bin_cmd!("docspan");
    cmd.arg("diff").arg(&document);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Provide --diff"));
}

#[test]
fn html_format_is_rejected_for_flat_documents() {
    let dir = TempDir::new().unwrap();
    let document = write(dir.path(), "contract.txt", CONTRACT);
    let statements = write(dir.path(), "statements.json", "[]");

    let mut cmd = cargo_bin_cmd!("docspan");
    cmd.arg("locate")
        .arg(&document)
        .arg("--statements")
        .arg(&statements)
        .arg("--format")
        .arg("html");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not available for flat documents"));
}

#[test]
fn missing_document_fails() {
    let dir = TempDir::new().unwrap();
    let statements = write(dir.path(), "statements.json", "[]");

    let mut cmd = cargo_bin_cmd!("docspan");
    cmd.arg("locate")
        .arg(dir.path().join("absent.txt"))
        .arg("--statements")
        .arg(&statements);

    cmd.assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn config_file_changes_output_format() {
    let dir = TempDir::new().unwrap();
    let document = write(dir.path(), "contract.txt", CONTRACT);
    let statements = write(
        dir.path(),
        "statements.json",
        r#"[{"id": "a", "description": "The buyer may inspect the goods on arrival."}]"#,
    );
    let config = write(
        dir.path(),
        "docspan.toml",
        "[output]\nformat = \"segments\"\npretty = false\n",
    );

    let mut cmd = cargo_bin_cmd!("docspan");
    cmd.arg("locate")
        .arg(&document)
        .arg("--statements")
        .arg(&statements)
        .arg("--config")
        .arg(&config);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""kind":"highlight""#));
}
