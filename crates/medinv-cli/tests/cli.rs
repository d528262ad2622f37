use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const LABEL: &str = "Ibuprofen Akut\nWirkstoff: Ibuprofen 400 mg\nBeispiel Pharma GmbH\nVerwendbar bis: 05/26\n";

fn medinv(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("medinv").expect("bin");
    cmd.arg("--config").arg(config);
    cmd
}

fn workspace() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let config = dir.path().join("config.json");
    let database = dir.path().join("inventory.sqlite");
    let settings = serde_json::json!({ "inventory": { "database": database } });
    fs::write(&config, settings.to_string()).expect("config");
    (dir, config)
}

fn labels(dir: &Path, files: &[(&str, &[u8])]) -> PathBuf {
    let labels = dir.join("labels");
    fs::create_dir_all(&labels).expect("labels dir");
    for (name, content) in files {
        fs::write(labels.join(name), content).expect("label");
    }
    labels
}

fn pattern(labels: &Path) -> String {
    format!("{}/*", labels.display())
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

#[test]
fn date_normalizes_tokens() {
    let (_dir, config) = workspace();
    medinv(&config)
        .args(["date", "05/26", "31.01.26", "2025-12-31"])
        .assert()
        .success()
        .stdout("2026-05-31\n2026-01-31\n2025-12-31\n");
}

#[test]
fn date_display_format() {
    let (_dir, config) = workspace();
    medinv(&config)
        .args(["date", "--display", "12/2025"])
        .assert()
        .success()
        .stdout("31.12.2025\n");
}

#[test]
fn date_rejects_impossible_date() {
    let (_dir, config) = workspace();
    medinv(&config)
        .args(["date", "31.02.2025"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid date"));
}

#[test]
fn scan_file_to_json() {
    let (dir, config) = workspace();
    let label = dir.path().join("label.txt");
    fs::write(&label, LABEL).expect("label");

    medinv(&config)
        .arg("scan")
        .arg(&label)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#""activeIngredient":"Ibuprofen 400 mg""#,
        ))
        .stdout(predicate::str::contains(r#""expiryDate":"2026-05-31""#))
        .stderr(predicate::str::contains("4 field(s) pre-filled"));
}

#[test]
fn scan_stdin_without_fields() {
    let (_dir, config) = workspace();
    medinv(&config)
        .arg("scan")
        .write_stdin("???")
        .assert()
        .success()
        .stdout("{}\n")
        .stderr(predicate::str::contains("no clear fields found"));
}

#[test]
fn inventory_add_list_remove() {
    let (dir, config) = workspace();
    let database = dir.path().join("inventory.sqlite");
    let database = database.to_str().expect("utf8 path");

    medinv(&config)
        .args(["inventory", "--database", database, "add"])
        .args(["--name", "Ibuprofen Akut"])
        .args(["--manufacturer", "Beispiel Pharma GmbH"])
        .args(["--ingredient", "Ibuprofen 400 mg"])
        .args(["--expiry", "05/26"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added #1"));

    medinv(&config)
        .args(["inventory", "--database", database, "list"])
        .args(["--format", "json", "--today", "2026-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""expiryDate":"2026-05-31""#))
        .stdout(predicate::str::contains(r#""status":"ok""#));

    medinv(&config)
        .args(["inventory", "--database", database, "remove", "1"])
        .assert()
        .success();

    medinv(&config)
        .args(["inventory", "--database", database, "remove", "1"])
        .assert()
        .failure();
}

#[test]
fn inventory_add_rejects_short_name() {
    let (dir, config) = workspace();
    let database = dir.path().join("inventory.sqlite");

    medinv(&config)
        .args(["inventory", "--database"])
        .arg(&database)
        .args(["add", "--name", "X"])
        .args(["--manufacturer", "Beispiel Pharma GmbH"])
        .args(["--ingredient", "Ibuprofen 400 mg"])
        .args(["--expiry", "05/26"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("name must be between 2 and 120 chars"));
}

#[test]
fn inventory_remove_rejects_bad_id() {
    let (dir, config) = workspace();
    let database = dir.path().join("inventory.sqlite");

    medinv(&config)
        .args(["inventory", "--database"])
        .arg(&database)
        .args(["remove", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid medication id"));
}

#[test]
fn scan_save_adds_to_inventory() {
    let (dir, config) = workspace();
    let label = dir.path().join("label.txt");
    fs::write(&label, LABEL).expect("label");

    medinv(&config)
        .arg("scan")
        .arg(&label)
        .arg("--save")
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved as #1"));

    medinv(&config)
        .args(["inventory", "list", "--format", "json", "--today", "2026-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name":"Ibuprofen Akut""#));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let (dir, config) = workspace();
    let labels = labels(
        dir.path(),
        &[
            ("a.txt", LABEL.as_bytes()),
            ("b.txt", b"???".as_slice()),
            ("notes.md", LABEL.as_bytes()),
        ],
    );
    let out = dir.path().join("out");

    medinv(&config)
        .arg("batch")
        .arg(pattern(&labels))
        .arg("--output-dir")
        .arg(&out)
        .arg("--summary")
        .assert()
        .success()
        .stderr(predicate::str::contains("Found 2 files"));

    assert!(read(&out.join("a.json")).contains(r#""expiryDate":"2026-05-31""#));
    assert_eq!(read(&out.join("b.json")), "{}");
    assert!(!out.join("notes.json").exists());

    let summary = read(&out.join("summary.csv"));
    let rows: Vec<&str> = summary.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].starts_with(
        "filename,status,found,name,manufacturer,activeIngredient,expiryDate,saved_id,save_error"
    ));
    assert!(rows[1].starts_with(
        "a.txt,success,4,Ibuprofen Akut,Beispiel Pharma GmbH,Ibuprofen 400 mg,2026-05-31,,,"
    ));
    assert!(rows[2].starts_with("b.txt,success,0,,,,,,,"));
}

#[test]
fn batch_stops_on_unreadable_file() {
    let (dir, config) = workspace();
    let labels = labels(
        dir.path(),
        &[("a.txt", LABEL.as_bytes()), ("bad.txt", [0xffu8, 0xfe, 0x00].as_slice())],
    );
    let out = dir.path().join("out");

    medinv(&config)
        .arg("batch")
        .arg(pattern(&labels))
        .arg("--output-dir")
        .arg(&out)
        .arg("--summary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Scanning failed"));

    assert!(out.join("a.json").exists());
    assert!(!out.join("summary.csv").exists());
}

#[test]
fn batch_continues_past_unreadable_file() {
    let (dir, config) = workspace();
    let labels = labels(
        dir.path(),
        &[("a.txt", LABEL.as_bytes()), ("bad.txt", [0xffu8, 0xfe, 0x00].as_slice())],
    );
    let out = dir.path().join("out");

    medinv(&config)
        .arg("batch")
        .arg(pattern(&labels))
        .arg("--output-dir")
        .arg(&out)
        .args(["--summary", "--continue-on-error"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Failed files:"));

    let summary = read(&out.join("summary.csv"));
    assert!(summary.contains("\na.txt,success,4,"));
    assert!(summary.contains("\nbad.txt,error,,"));
    assert!(!out.join("bad.json").exists());
}

#[test]
fn batch_save_keeps_fields_of_rejected_scans() {
    let (dir, config) = workspace();
    let labels = labels(dir.path(), &[("a.txt", LABEL.as_bytes()), ("b.txt", b"???".as_slice())]);
    let out = dir.path().join("out");

    medinv(&config)
        .arg("batch")
        .arg(pattern(&labels))
        .arg("--output-dir")
        .arg(&out)
        .args(["--summary", "--save", "--continue-on-error"])
        .assert()
        .success();

    let summary = read(&out.join("summary.csv"));
    let rows: Vec<&str> = summary.lines().collect();
    assert!(rows[1].starts_with("a.txt,success,4,"));
    assert!(rows[1].contains(",2026-05-31,1,,"));
    assert!(rows[2].starts_with("b.txt,save_failed,0,,,,,,"));
    assert!(rows[2].contains("name must be between 2 and 120 chars"));
    assert_eq!(read(&out.join("b.json")), "{}");

    medinv(&config)
        .args(["inventory", "list", "--format", "json", "--today", "2026-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""id":1"#))
        .stdout(predicate::str::contains(r#""id":2"#).not());
}

#[test]
fn batch_save_stops_on_rejected_scan() {
    let (dir, config) = workspace();
    let labels = labels(dir.path(), &[("a.txt", LABEL.as_bytes()), ("b.txt", b"???".as_slice())]);
    let out = dir.path().join("out");

    medinv(&config)
        .arg("batch")
        .arg(pattern(&labels))
        .arg("--output-dir")
        .arg(&out)
        .arg("--save")
        .assert()
        .failure()
        .stderr(predicate::str::contains("name must be between 2 and 120 chars"));

    assert!(out.join("a.json").exists());
    assert!(out.join("b.json").exists());
}
