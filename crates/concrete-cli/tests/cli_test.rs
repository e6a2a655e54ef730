//! Integration tests for the `concrete` command.

use clap::Parser;
use concrete_cli::cli::Cli;
use concrete_cli::{run, EXIT_FAILURE, EXIT_SUCCESS};
use std::fs;
use std::path::Path;
use termcolor::NoColor;

const RDR: &str = r#"package temperature

import "io"

type Celsius float64

type Rdr interface {
	Get() (string, error)
	Set(string) error
}

type Stream interface {
	io.Reader
	Rdr
}
"#;

struct Output {
    status: u8,
    stdout: String,
    stderr: String,
}

fn concrete(args: &[&str]) -> Output {
    let cli = Cli::try_parse_from(std::iter::once("concrete").chain(args.iter().copied())).unwrap();
    let mut stdout = Vec::new();
    let mut stderr = NoColor::new(Vec::new());
    let status = run(&cli, &mut stdout, &mut stderr);
    Output {
        status,
        stdout: String::from_utf8(stdout).unwrap(),
        stderr: String::from_utf8(stderr.into_inner()).unwrap(),
    }
}

fn package() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("rdr.go"), RDR).unwrap();
    dir
}

fn path(dir: &Path) -> &str {
    dir.to_str().unwrap()
}

#[test]
fn test_print_implementation() {
    let dir = package();
    let out = concrete(&[
        "-i",
        "Rdr",
        "--in-package",
        path(dir.path()),
        "--implementation",
        "My{{.Interface}}",
    ]);
    assert_eq!(out.status, EXIT_SUCCESS, "{}", out.stderr);
    assert_eq!(
        out.stdout,
        "package temperature\n\ntype MyRdr struct{}\n\nfunc (t *MyRdr) Get() (string, error) {\n}\n\nfunc (t *MyRdr) Set(_ string) (error) {\n\treturn nil\n}\n"
    );
    assert!(out.stderr.is_empty());
}

#[test]
fn test_list_interfaces() {
    let dir = package();
    let out = concrete(&["-l", "--in-package", path(dir.path())]);
    assert_eq!(out.status, EXIT_SUCCESS);
    assert_eq!(out.stdout, "Rdr\nStream\n");
}

#[test]
fn test_write_file() {
    let dir = package();
    let out = concrete(&["-i", "Stream", "--in-package", path(dir.path()), "-w"]);
    assert_eq!(out.status, EXIT_SUCCESS, "{}", out.stderr);
    assert!(out.stdout.is_empty());

    let written = fs::read_to_string(dir.path().join("stream_impl.go")).unwrap();
    // Read, Get and Set name no other package
    assert!(written.starts_with("package temperature\n\ntype StreamImpl struct{}\n"));
    assert!(written.contains("func (t *StreamImpl) Read(p []byte) (int, error) {\n}\n"));

    // StreamImpl now exists in the package
    let again = concrete(&["-i", "Stream", "--in-package", path(dir.path()), "-w"]);
    assert_eq!(again.status, EXIT_FAILURE);
    assert!(again.stderr.contains("already exists"), "{}", again.stderr);
}

#[test]
fn test_same_unit_and_receiver() {
    let dir = package();
    let out = concrete(&[
        "-i",
        "Stream",
        "--in-package",
        path(dir.path()),
        "--same-unit",
        "--receiver",
        "s",
    ]);
    assert_eq!(out.status, EXIT_SUCCESS);
    assert!(!out.stdout.contains("import"));
    assert!(out.stdout.contains("func (s *StreamImpl) Get() (string, error) {\n}\n"));
}

#[test]
fn test_config_file() {
    let dir = package();
    fs::write(
        dir.path().join("concrete.toml"),
        "[generate]\nimplementation = \"Fake{{.Interface}}\"\nreceiver = \"f\"\n",
    )
    .unwrap();

    let out = concrete(&["-i", "Rdr", "--in-package", path(dir.path())]);
    assert_eq!(out.status, EXIT_SUCCESS, "{}", out.stderr);
    assert!(out.stdout.contains("func (f *FakeRdr) Get()"));

    let out = concrete(&[
        "-i",
        "Rdr",
        "--in-package",
        path(dir.path()),
        "--receiver",
        "r",
    ]);
    assert!(out.stdout.contains("func (r *FakeRdr) Get()"));
}

#[test]
fn test_bad_config_file() {
    let dir = package();
    let config = dir.path().join("custom.toml");
    fs::write(&config, "[generate]\nimplementation = \"{{.Type}}\"\n").unwrap();

    let out = concrete(&[
        "-i",
        "Rdr",
        "--in-package",
        path(dir.path()),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert_eq!(out.status, EXIT_FAILURE);
    assert!(out.stderr.starts_with("concrete: loading configuration: "), "{}", out.stderr);
}

#[test]
fn test_generation_errors() {
    let dir = package();
    let missing = concrete(&["-i", "Writer", "--in-package", path(dir.path())]);
    assert_eq!(missing.status, EXIT_FAILURE);
    assert_eq!(
        missing.stderr,
        "concrete: could not find interface 'Writer' in package temperature\n"
    );

    let wrong = concrete(&["-i", "Celsius", "--in-package", path(dir.path())]);
    assert_eq!(
        wrong.stderr,
        "concrete: 'Celsius' is a float64, not an interface\n"
    );

    let cross = concrete(&[
        "-i",
        "Rdr",
        "--in-package",
        path(dir.path()),
        "--impl-package",
        "humidity",
    ]);
    assert_eq!(cross.status, EXIT_FAILURE);
    assert!(cross.stderr.contains("only the interface's package temperature"));
    assert!(cross.stdout.is_empty());
}

#[test]
fn test_json_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("bad.go"),
        "package p\n\ntype A interface {\n\tM() Missing\n}\n",
    )
    .unwrap();

    let out = concrete(&[
        "-i",
        "A",
        "--in-package",
        path(dir.path()),
        "--message-format",
        "json",
    ]);
    assert_eq!(out.status, EXIT_FAILURE);
    let value: serde_json::Value = serde_json::from_str(out.stderr.trim()).unwrap();
    assert_eq!(value["message"], "undefined: Missing");
    assert_eq!(value["severity"], "error");
}
