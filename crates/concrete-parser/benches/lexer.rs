use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use concrete_parser::{parse_source, Lexer};

const INTERFACE_FILE: &str = r#"
package storage

import (
    "context"
    "io"
    "time"
)

// Store persists blobs.
type Store interface {
    io.Closer
    Get(ctx context.Context, key string) ([]byte, error)
    Put(ctx context.Context, key string, value []byte, ttl time.Duration) error
    Delete(ctx context.Context, keys ...string) (int, error)
    Watch(prefix string) (<-chan Event, func())
}

type Event struct {
    Key   string `json:"key"`
    Value []byte `json:"value,omitempty"`
}

func (e *Event) String() string {
    if e == nil {
        return "<nil>"
    }
    return e.Key
}
"#;

fn bench_keywords(c: &mut Criterion) {
    let source = "package import type interface struct func map chan const var return";

    c.bench_function("lex_keywords", |b| {
        b.iter(|| {
            let lexer = Lexer::new(black_box(source));
            lexer.tokenize().unwrap()
        });
    });
}

fn bench_literals(c: &mut Criterion) {
    let mut group = c.benchmark_group("literals");

    let numbers = "42 0xFF 0b1010 1_000_000 3.14 1e-9 2i";
    group.bench_with_input(BenchmarkId::new("numbers", "mixed"), &numbers, |b, source| {
        b.iter(|| {
            let lexer = Lexer::new(black_box(source));
            lexer.tokenize().unwrap()
        });
    });

    let strings = r#""net/http" "a\tb\n" `raw
string` 'x' '\n'"#;
    group.bench_with_input(BenchmarkId::new("strings", "mixed"), &strings, |b, source| {
        b.iter(|| {
            let lexer = Lexer::new(black_box(source));
            lexer.tokenize().unwrap()
        });
    });

    group.finish();
}

fn bench_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("file");
    group.throughput(Throughput::Bytes(INTERFACE_FILE.len() as u64));

    group.bench_function("tokenize", |b| {
        b.iter(|| {
            let lexer = Lexer::new(black_box(INTERFACE_FILE));
            lexer.tokenize().unwrap()
        });
    });

    group.bench_function("parse", |b| {
        b.iter(|| parse_source(black_box(INTERFACE_FILE)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_keywords, bench_literals, bench_file);
criterion_main!(benches);
