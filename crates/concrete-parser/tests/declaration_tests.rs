use concrete_parser::ast::*;
use concrete_parser::parse_source;

fn parse(source: &str) -> SourceFile {
    match parse_source(source) {
        Ok(file) => file,
        Err(errors) => panic!("parse failed: {:?}", errors),
    }
}

fn interface_elems(file: &SourceFile, name: &str) -> Vec<InterfaceElem> {
    let spec = file
        .type_specs()
        .find(|spec| spec.name.name == name)
        .unwrap_or_else(|| panic!("type {} not found", name));
    match &spec.ty.kind {
        TypeExprKind::Interface(elems) => elems.clone(),
        other => panic!("{} is not an interface: {:?}", name, other),
    }
}

// ============================================================================
// Interfaces
// ============================================================================

#[test]
fn test_reader_interface() {
    let file = parse(
        r#"package temperature

type Rdr interface {
	Get() (string, error)
	Set(string) error
}
"#,
    );

    assert_eq!(file.package.name, "temperature");
    let elems = interface_elems(&file, "Rdr");
    assert_eq!(elems.len(), 2);

    match &elems[0] {
        InterfaceElem::Method { name, signature } => {
            assert_eq!(name.name, "Get");
            assert!(signature.params.is_empty());
            assert_eq!(signature.results.len(), 2);
        }
        other => panic!("expected method, got {:?}", other),
    }
    match &elems[1] {
        InterfaceElem::Method { name, signature } => {
            assert_eq!(name.name, "Set");
            assert_eq!(signature.params.len(), 1);
            assert!(signature.params[0].name.is_none());
            assert_eq!(signature.results.len(), 1);
        }
        other => panic!("expected method, got {:?}", other),
    }
}

#[test]
fn test_embedded_interfaces_keep_order() {
    let file = parse(
        r#"package p

import "io"

type ReadCloser interface {
	io.Reader
	Extra
	Close() error
}
"#,
    );

    let elems = interface_elems(&file, "ReadCloser");
    assert!(matches!(&elems[0], InterfaceElem::Embed(ty)
        if matches!(&ty.kind, TypeExprKind::Name { package: Some(p), name } if p.name == "io" && name.name == "Reader")));
    assert!(matches!(&elems[1], InterfaceElem::Embed(_)));
    assert!(matches!(&elems[2], InterfaceElem::Method { .. }));
}

#[test]
fn test_single_line_interface() {
    let file = parse("package p\ntype Stringer interface{ String() string }\n");
    assert_eq!(interface_elems(&file, "Stringer").len(), 1);
}

#[test]
fn test_named_results_and_complex_types() {
    let file = parse(
        r#"package p

type Cache interface {
	Lookup(keys ...string) (hits map[string][]byte, misses int, err error)
	Subscribe(fn func(event string) bool) <-chan struct{}
	Matrix() [4][4]float64
}
"#,
    );

    let elems = interface_elems(&file, "Cache");
    let InterfaceElem::Method { signature, .. } = &elems[0] else {
        panic!("expected method");
    };
    assert!(signature.variadic);
    assert_eq!(signature.results.len(), 3);
    assert!(signature.results.iter().all(|r| r.name.is_some()));

    let InterfaceElem::Method { signature, .. } = &elems[1] else {
        panic!("expected method");
    };
    assert_eq!(signature.results.len(), 1);
    assert!(matches!(signature.results[0].ty.kind, TypeExprKind::Chan { .. }));
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_mixed_declarations() {
    let file = parse(
        r#"package server

import (
	"net/http"
	"sync"
)

const DefaultPort = 8080

var (
	mu      sync.Mutex
	handler http.Handler = nil
)

type (
	Config struct {
		Port int
	}
	Option func(*Config)
)

func New(opts ...Option) *Config {
	c := &Config{Port: DefaultPort}
	for _, opt := range opts {
		opt(c)
	}
	return c
}

func (c *Config) Addr() string { return ":" }
"#,
    );

    assert_eq!(file.imports.len(), 2);
    assert_eq!(file.imports[0].path, "net/http");
    assert_eq!(file.type_specs().count(), 2);
    assert_eq!(file.funcs().count(), 2);
    assert_eq!(file.funcs().filter(|f| f.is_method()).count(), 1);
}

#[test]
fn test_block_comments_and_line_comments() {
    let file = parse(
        "package p /* the package */\n\n// Doc comment.\ntype /* inline */ T int // trailing\n",
    );
    assert_eq!(file.type_specs().count(), 1);
}

#[test]
fn test_semicolons_written_explicitly() {
    let file = parse("package p; type A int; type B string;");
    assert_eq!(file.type_specs().count(), 2);
}

#[test]
fn test_function_body_with_nested_literals_is_skipped() {
    let file = parse(
        r#"package p

func run() {
	m := map[string]struct{ a, b int }{"x": {1, 2}}
	go func() {
		select {}
	}()
	_ = m
}

type After int
"#,
    );
    assert_eq!(file.type_specs().next().unwrap().name.name, "After");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_error_positions() {
    let errors = parse_source("package p\n\ntype T interface {\n\tM(a int, string)\n}\n").unwrap_err();
    assert_eq!(errors[0].span.line, 4);
    assert!(matches!(errors[0].kind, concrete_parser::ParseErrorKind::MixedParameters));
}

#[test]
fn test_lex_errors_become_parse_errors() {
    let errors = parse_source("package p\nvar s = \"unterminated\n").unwrap_err();
    assert!(matches!(errors[0].kind, concrete_parser::ParseErrorKind::Lex(_)));
}

#[test]
fn test_generic_declarations_parse_beside_interfaces() {
    let file = parse(
        r#"package p

func Map[T any](xs []T) []T { return xs }

type Number interface{ ~int | ~float64 }

type Tree[T Number] struct {
	Left, Right *Tree[T]
	Value       T
}

func (t *Tree[T]) Sum() T { return t.Value }

type R interface{ Get() string }
"#,
    );

    let map = file.funcs().find(|f| f.name.name == "Map").unwrap();
    assert_eq!(map.type_params.len(), 1);
    assert!(matches!(&interface_elems(&file, "Number")[0], InterfaceElem::TypeSet(terms) if terms.len() == 2));
    assert_eq!(interface_elems(&file, "R").len(), 1);
}

#[test]
fn test_interface_embedding_instantiation() {
    let file = parse("package p\n\ntype Ints interface {\n\tContainer[int]\n\tLen() int\n}\n");
    let elems = interface_elems(&file, "Ints");
    assert!(matches!(&elems[0], InterfaceElem::Embed(ty) if matches!(ty.kind, TypeExprKind::Instance { .. })));
}

#[test]
fn test_unclosed_function_body() {
    let errors = parse_source("package p\nfunc f() {\n\tif x {\n").unwrap_err();
    assert!(!errors.is_empty());
}
