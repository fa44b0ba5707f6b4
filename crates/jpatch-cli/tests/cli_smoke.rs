use assert_cmd::Command;
use predicates::prelude::*;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Debug, Deserialize)]
struct Fixture {
    lhs: String,
    rhs: String,
    patch: serde_json::Value,
}

fn load_fixture(name: &str) -> Fixture {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../jpatch-core/tests/fixtures/diff")
        .join(format!("{name}.json"));
    let data = fs::read_to_string(path).expect("fixture readable");
    serde_json::from_str(&data).expect("fixture deserializes")
}

fn write_tempfile(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create tempfile");
    write!(file, "{contents}").expect("write tempfile");
    file
}

fn jpatch() -> Command {
    let mut cmd = Command::cargo_bin("jpatch").expect("binary jpatch should be built");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("stdout is JSON")
}

#[test]
fn help_succeeds() {
    jpatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Generate and apply RFC 6902 JSON Patches."));
}

#[test]
fn version_banner() {
    jpatch().arg("--version").assert().success().stdout(predicate::str::contains("jpatch version"));
}

#[test]
fn single_dash_version_is_normalized() {
    jpatch().arg("-version").assert().success().stdout(predicate::str::contains("jpatch version"));
}

#[test]
fn diff_matches_fixture() {
    for name in ["object_members", "array_mixed", "array_of_objects", "root_type_change"] {
        let fixture = load_fixture(name);
        let lhs = write_tempfile(&fixture.lhs);
        let rhs = write_tempfile(&fixture.rhs);

        let assert = jpatch()
            .arg(lhs.path())
            .arg(rhs.path())
            .assert()
            .code(1)
            .stderr(predicate::str::is_empty());
        assert_eq!(stdout_json(&assert.get_output().stdout), fixture.patch, "fixture {name}");
    }
}

#[test]
fn identical_inputs_exit_zero_with_empty_patch() {
    let fixture = load_fixture("identical");
    let lhs = write_tempfile(&fixture.lhs);
    let rhs = write_tempfile(&fixture.rhs);

    jpatch().arg(lhs.path()).arg(rhs.path()).assert().code(0).stdout("[]\n");
}

#[test]
fn diff_single_argument_reads_stdin() {
    let fixture = load_fixture("array_mixed");
    let lhs = write_tempfile(&fixture.lhs);

    let assert = jpatch()
        .arg(lhs.path())
        .write_stdin(fixture.rhs)
        .assert()
        .code(1)
        .stderr(predicate::str::is_empty());
    assert_eq!(stdout_json(&assert.get_output().stdout), fixture.patch);
}

#[test]
fn sort_keys_orders_operations() {
    let lhs = write_tempfile(r#"{"b":1,"a":1}"#);
    let rhs = write_tempfile(r#"{"b":2,"a":2}"#);

    jpatch()
        .arg("--sort-keys")
        .arg(lhs.path())
        .arg(rhs.path())
        .assert()
        .code(1)
        .stdout(concat!(
            r#"[{"op":"replace","path":"/a","value":2},"#,
            r#"{"op":"replace","path":"/b","value":2}]"#,
            "\n"
        ));
}

#[test]
fn yaml_inputs_are_diffed() {
    let lhs = write_tempfile("name: demo\ntags: [a, b]\n");
    let rhs = write_tempfile("name: demo\ntags: [a, c]\n");

    jpatch()
        .arg("--yaml")
        .arg(lhs.path())
        .arg(rhs.path())
        .assert()
        .code(1)
        .stdout("[{\"op\":\"replace\",\"path\":\"/tags/1\",\"value\":\"c\"}]\n");
}

#[test]
fn output_flag_writes_file() {
    let fixture = load_fixture("object_members");
    let lhs = write_tempfile(&fixture.lhs);
    let rhs = write_tempfile(&fixture.rhs);
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("patch.json");

    jpatch()
        .arg("-o")
        .arg(&out)
        .arg(lhs.path())
        .arg(rhs.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());

    let written = fs::read(&out).expect("output written");
    assert_eq!(stdout_json(&written), fixture.patch);
}

#[test]
fn patch_mode_applies_patch() {
    let fixture = load_fixture("array_of_objects");
    let patch = write_tempfile(&fixture.patch.to_string());
    let document = write_tempfile(&fixture.lhs);

    let assert = jpatch().arg("-p").arg(patch.path()).arg(document.path()).assert().code(0);
    let expected: serde_json::Value = serde_json::from_str(&fixture.rhs).expect("rhs is JSON");
    assert_eq!(stdout_json(&assert.get_output().stdout), expected);
}

#[test]
fn patch_mode_reads_document_from_stdin() {
    let patch = write_tempfile(r#"[{"op":"add","path":"/baz","value":"qux"}]"#);

    jpatch()
        .arg("-p")
        .arg(patch.path())
        .write_stdin(r#"{"foo":"bar"}"#)
        .assert()
        .code(0)
        .stdout("{\"foo\":\"bar\",\"baz\":\"qux\"}\n");
}

#[test]
fn patch_mode_reports_unresolvable_pointer() {
    let patch = write_tempfile(r#"[{"op":"remove","path":"/missing"}]"#);
    let document = write_tempfile(r#"{"foo":"bar"}"#);

    jpatch()
        .arg("-p")
        .arg(patch.path())
        .arg(document.path())
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("failed to apply patch"))
        .stderr(predicate::str::contains("/missing"));
}

#[test]
fn malformed_input_exits_with_error() {
    let lhs = write_tempfile("{not json");
    let rhs = write_tempfile("{}");

    jpatch()
        .arg(lhs.path())
        .arg(rhs.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to parse first input"));
}

#[test]
fn missing_file_exits_with_error() {
    jpatch()
        .arg("definitely-missing-lhs.json")
        .arg("definitely-missing-rhs.json")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read definitely-missing-lhs.json"));
}

#[test]
fn verbose_logs_to_stderr() {
    let lhs = write_tempfile("[1]");
    let rhs = write_tempfile("[2]");

    jpatch()
        .arg("-v")
        .arg(lhs.path())
        .arg(rhs.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("computed patch"));
}
