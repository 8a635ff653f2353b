//! Benchmarks comparing wiki tokenization vs pulldown-cmark (Markdown)
//!
//! Run with: cargo bench -p wikiscan-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pulldown_cmark::{Options, Parser as MdParser};
use wikiscan_core::{tokenize, Lexer, ScanCursor};

/// Sample wiki markup
const WIKI_SAMPLE: &str = r#"====== Introduction ======

This is a paragraph with //emphasis//, **strong text**, and __underline__.
It cites a source((Some book, page 12)) and one that is missing[citation needed].

===== Links and Images =====

See [[wp>Rust_(programming_language)|the Rust article]] and [[internal:page]].
{{diagram.png|A labelled diagram}} sits next to {{icon.svg}}.

<callout type="warning" title="Performance">
Tokenizing is a single forward pass.\\ No backtracking past a handler attempt.
</callout>

<table>
<thead><tr><th>Name</th><th>Speed</th></tr></thead>
<tbody>
<tr><td>Fast</td><td colspan="2">100ms</td></tr>
<tr><td>Slow</td><td>H<sub>2</sub>O x<sup>2</sup></td></tr>
</tbody>
</table>

<blockquote>
The best code is no code at all.
</blockquote>

(((unfinished|March 2024)))

----

<affili name="Ada Lovelace" school="Kings">
End of document.
"#;

/// Equivalent Markdown content (as close as possible)
const MARKDOWN_SAMPLE: &str = r#"# Introduction

This is a paragraph with *emphasis*, **strong text**, and <u>underline</u>.
It cites a source[^1] and one that is missing [citation needed].

## Links and Images

See [the Rust article](https://en.wikipedia.org/wiki/Rust) and [page](internal:page).
![A labelled diagram](diagram.png) sits next to ![](icon.svg).

> **Warning: Performance**
>
> Tokenizing is a single forward pass.
> No backtracking past a handler attempt.

| Name | Speed |
| ---- | ----- |
| Fast | 100ms |
| Slow | H<sub>2</sub>O x<sup>2</sup> |

> The best code is no code at all.

---

End of document.

[^1]: Some book, page 12
"#;

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    group.throughput(Throughput::Bytes(WIKI_SAMPLE.len() as u64));

    group.bench_function("wiki", |b| {
        b.iter(|| {
            let tokens = tokenize(black_box(WIKI_SAMPLE)).unwrap();
            black_box(tokens.len())
        })
    });

    // Reusing one lexer skips handler registration and sorting.
    let lexer = Lexer::new();
    group.bench_function("wiki_reused_lexer", |b| {
        b.iter(|| {
            let tokens = lexer.tokenize(black_box(WIKI_SAMPLE)).unwrap();
            black_box(tokens.len())
        })
    });

    group.throughput(Throughput::Bytes(MARKDOWN_SAMPLE.len() as u64));

    group.bench_function("markdown_pulldown", |b| {
        b.iter(|| {
            let parser = MdParser::new_ext(black_box(MARKDOWN_SAMPLE), Options::all());
            let events: Vec<_> = parser.collect();
            black_box(events.len())
        })
    });

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");
    let lexer = Lexer::new();

    for size in [1, 5, 10, 20].iter() {
        let wiki_content: String = WIKI_SAMPLE.repeat(*size);
        let markdown_content: String = MARKDOWN_SAMPLE.repeat(*size);

        group.throughput(Throughput::Bytes(wiki_content.len() as u64));

        group.bench_with_input(BenchmarkId::new("wiki", size), &wiki_content, |b, content| {
            b.iter(|| {
                let tokens = lexer.tokenize(black_box(content)).unwrap();
                black_box(tokens.len())
            })
        });

        group.throughput(Throughput::Bytes(markdown_content.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("markdown", size),
            &markdown_content,
            |b, content| {
                b.iter(|| {
                    let parser = MdParser::new_ext(black_box(content), Options::all());
                    let events: Vec<_> = parser.collect();
                    black_box(events.len())
                })
            },
        );
    }

    group.finish();
}

fn bench_cursor(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursor");
    let content = WIKI_SAMPLE.repeat(10);
    let chars = content.chars().count();

    group.throughput(Throughput::Bytes(content.len() as u64));

    group.bench_function("advance_single", |b| {
        b.iter(|| {
            let mut cursor = ScanCursor::new(black_box(&content));
            while !cursor.is_at_end() {
                cursor.advance(1);
            }
            black_box(cursor.line())
        })
    });

    group.bench_function("advance_bulk", |b| {
        b.iter(|| {
            let mut cursor = ScanCursor::new(black_box(&content));
            cursor.advance(chars);
            black_box(cursor.line())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_scaling, bench_cursor);
criterion_main!(benches);
