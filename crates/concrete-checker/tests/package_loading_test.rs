//! Tests for loading packages from disk

use concrete_checker::{CheckError, LoadError, LoaderConfig, SourceLoader, SymbolKind};
use concrete_types::{Type, TypeWriter};
use std::fs;
use std::path::Path;

fn write(dir: &Path, name: &str, source: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), source).unwrap();
}

fn check_errors(err: LoadError) -> Vec<CheckError> {
    match err {
        LoadError::TypeCheck(failure) => failure.errors,
        other => panic!("expected type check errors, got: {}", other),
    }
}

#[test]
fn test_multi_file_package() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "reader.go",
        r#"package temperature

import "io"

type Rdr interface {
	io.Closer
	Get() (Celsius, error)
	Set(Celsius) error
}
"#,
    );
    write(
        dir.path(),
        "units.go",
        r#"package temperature

type Celsius float64

func (c Celsius) Kelvin() float64 { return float64(c) + 273.15 }
"#,
    );

    let unit = SourceLoader::default().load_dir(dir.path()).unwrap();
    assert_eq!(unit.package().name, "temperature");
    assert_eq!(unit.sources().len(), 2);

    let rdr = unit.lookup("Rdr").unwrap();
    let methods = unit.ctx().method_set(rdr.ty.unwrap()).unwrap();
    let names: Vec<_> = methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Close", "Get", "Set"]);
}

#[test]
fn test_test_files_are_opt_in() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "api.go", "package api\n\ntype Client interface {\n\tDo()\n}\n");
    write(dir.path(), "api_test.go", "package api\n\ntype fakeClient struct{}\n");

    let unit = SourceLoader::default().load_dir(dir.path()).unwrap();
    assert!(unit.lookup("fakeClient").is_none());

    let unit = SourceLoader::new(LoaderConfig {
        include_tests: true,
    })
    .load_dir(dir.path())
    .unwrap();
    assert!(unit.lookup("fakeClient").is_some());
}

#[test]
fn test_relative_import() {
    let root = tempfile::tempdir().unwrap();
    write(
        &root.path().join("model"),
        "model.go",
        "package model\n\ntype ID int64\n\ntype User struct {\n\tName string\n}\n",
    );
    write(
        &root.path().join("app"),
        "app.go",
        r#"package app

import "../model"

type Repo interface {
	Find(id model.ID) (*model.User, error)
}
"#,
    );

    let unit = SourceLoader::default()
        .load_dir(&root.path().join("app"))
        .unwrap();
    let repo = unit.lookup("Repo").unwrap().ty.unwrap();
    let find = &unit.ctx().method_set(repo).unwrap()[0];
    let Type::Signature(sig) = unit.ctx().get(find.signature) else {
        panic!("method type is not a signature");
    };

    let id = unit.ctx().as_named(sig.params[0].ty).unwrap();
    let model = id.package.clone().unwrap();
    assert_eq!(model.name, "model");
    assert_eq!(unit.import_path_for(&model), "../model");

    let writer = TypeWriter::relative_to(unit.ctx(), &unit.package().path);
    assert_eq!(writer.type_string(sig.results[0].ty), "*model.User");
}

#[test]
fn test_relative_import_cycle() {
    let root = tempfile::tempdir().unwrap();
    write(
        &root.path().join("a"),
        "a.go",
        "package a\n\nimport \"../b\"\n\ntype A interface {\n\tB() b.B\n}\n",
    );
    write(
        &root.path().join("b"),
        "b.go",
        "package b\n\nimport \"../a\"\n\ntype B interface {\n\tA() a.A\n}\n",
    );

    let err = SourceLoader::default()
        .load_dir(&root.path().join("a"))
        .unwrap_err();
    let errors = check_errors(err);
    match &errors[0] {
        CheckError::UnresolvedImport { path, reason, .. } => {
            assert_eq!(path, "../b");
            assert!(reason.contains("import cycle not allowed"), "{}", reason);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_import_names() {
    let unit = SourceLoader::default()
        .load_source(
            "handler.go",
            r#"package web

import (
	. "context"
	_ "errors"
	h "net/http"
)

type Handler interface {
	Serve(ctx Context, w h.ResponseWriter, r *h.Request)
}
"#,
        )
        .unwrap();
    let handler = unit.lookup("Handler").unwrap();
    assert_eq!(handler.kind, SymbolKind::Type);
    assert!(unit.lookup("Context").is_none());
}

#[test]
fn test_unexported_member() {
    let err = SourceLoader::default()
        .load_source(
            "p.go",
            "package p\n\nimport \"io\"\n\ntype T interface {\n\tM() *io.pipe\n}\n",
        )
        .unwrap_err();
    let errors = check_errors(err);
    assert!(matches!(
        &errors[0],
        CheckError::NotExported { package, name, .. } if package == "io" && name == "pipe"
    ));
}

#[test]
fn test_import_conflicts_with_declaration() {
    let err = SourceLoader::default()
        .load_source("p.go", "package p\n\nimport \"io\"\n\ntype io int\n")
        .unwrap_err();
    let errors = check_errors(err);
    assert!(matches!(&errors[0], CheckError::Duplicate { name, .. } if name == "io"));
}

#[test]
fn test_all_errors_are_reported() {
    let err = SourceLoader::default()
        .load_source(
            "p.go",
            "package p\n\ntype A interface {\n\tM() X\n}\n\ntype B interface {\n\tN() Y\n}\n",
        )
        .unwrap_err();
    let errors = check_errors(err);
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_generics_are_rejected_at_parse_time() {
    let err = SourceLoader::default()
        .load_source("p.go", "package p\n\ntype Box[T any] interface {\n\tGet() T\n}\n")
        .unwrap_err();
    assert!(matches!(err, LoadError::Parse(_)));
}
