use std::{
    fs,
    path::Path,
    process::{Command, Output, Stdio},
};
use tempfile::tempdir;

const HANDLER: &str = "package svc\n\nimport \"context\"\n\nfunc f(ctx context.Context) {\n\tg(context.TODO())\n}\n";

fn bin_path() -> &'static str {
    env!("CARGO_BIN_EXE_ctxscope")
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(bin_path())
        .current_dir(dir)
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .output()
        .expect("failed to run ctxscope")
}

#[test]
fn rewrites_directory_and_prints_notices() {
    let dir = tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("svc")).expect("mkdir");
    fs::write(dir.path().join("svc/h.go"), HANDLER).expect("write");

    let output = run(dir.path(), &["svc"]);
    assert!(
        output.status.success(),
        "ctxscope failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(":6 → replaced context.TODO() with ctx"), "{stdout}");
    let written = fs::read_to_string(dir.path().join("svc/h.go")).expect("read");
    assert!(written.contains("\tg(ctx)\n"));
}

#[test]
fn dry_run_does_not_write() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("h.go"), HANDLER).expect("write");

    let output = run(dir.path(), &["--dry-run", "h.go"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("h.go:6 → "));
    assert_eq!(fs::read_to_string(dir.path().join("h.go")).expect("read"), HANDLER);
}

#[test]
fn syntax_errors_fail_with_status_one() {
    let dir = tempdir().expect("tempdir");
    let broken = "package svc\n\nfunc f( {\n";
    fs::write(dir.path().join("bad.go"), broken).expect("write");
    fs::write(dir.path().join("good.go"), HANDLER).expect("write");

    let output = run(dir.path(), &["bad.go", "good.go"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
    assert_eq!(fs::read_to_string(dir.path().join("bad.go")).expect("read"), broken);
    assert!(fs::read_to_string(dir.path().join("good.go"))
        .expect("read")
        .contains("\tg(ctx)\n"));
}

#[test]
fn invalid_config_fails_with_status_two() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("h.go"), HANDLER).expect("write");
    fs::write(dir.path().join("ctxscope.toml"), "[resource]\nname = \"1x\"\n").expect("write");

    let output = run(dir.path(), &["h.go"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(fs::read_to_string(dir.path().join("h.go")).expect("read"), HANDLER);
}

#[test]
fn missing_paths_is_a_usage_error() {
    let dir = tempdir().expect("tempdir");
    let output = run(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn config_file_renames_the_resource() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("ctxscope.toml"), "[resource]\nname = \"c\"\n").expect("write");
    let source = "package svc\n\nimport \"context\"\n\nfunc f(c context.Context) {\n\tg(context.TODO())\n}\n";
    fs::write(dir.path().join("h.go"), source).expect("write");

    let output = run(dir.path(), &["h.go"]);
    assert!(output.status.success());
    assert!(fs::read_to_string(dir.path().join("h.go"))
        .expect("read")
        .contains("\tg(c)\n"));
}

#[test]
fn background_flag_widens_placeholders() {
    let dir = tempdir().expect("tempdir");
    let source = "package svc\n\nimport \"context\"\n\nfunc f(ctx context.Context) {\n\tg(context.Background())\n}\n";
    fs::write(dir.path().join("h.go"), source).expect("write");

    let output = run(dir.path(), &["--dry-run", "h.go"]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let output = run(dir.path(), &["--background", "h.go"]);
    assert!(output.status.success());
    assert!(fs::read_to_string(dir.path().join("h.go"))
        .expect("read")
        .contains("\tg(ctx)\n"));
}
