use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use iconfetch::mapping::{normalize_code_point, parse_code_point};
use iconfetch::parse_identifier;
use iconfetch::providers::{FontAwesome, FontAwesomeStyle, MaterialSymbols, MaterialSymbolsStyle, Provider, Remix};
use iconfetch::Endpoints;

/// Synthetic Remix-style stylesheet with `n` icon rules
fn remix_css(n: u32) -> String {
    (0..n)
        .map(|i| format!(".ri-icon-{i}-line:before {{ content: \"\\{:x}\"; }}\n", 0xea00 + i))
        .collect()
}

/// Synthetic Font Awesome `icons.json` with `n` icons
fn fontawesome_json(n: u32) -> String {
    let icons: Vec<String> = (0..n)
        .map(|i| format!("\"icon-{i}\": {{ \"unicode\": \"{:x}\", \"styles\": [\"solid\", \"regular\"] }}", 0xf000 + i))
        .collect();
    format!("{{{}}}", icons.join(","))
}

fn symbols_codepoints(n: u32) -> String {
    (0..n).map(|i| format!("icon_{i} {:x}\n", 0xe000 + i)).collect()
}

fn bench_parse_code_point(c: &mut Criterion) {
    let inputs = ["0xf004", "U+F004", "\\f004", "f004", "\"\\F0003\""];

    c.bench_function("parse_code_point", |b| {
        b.iter(|| {
            for raw in &inputs {
                let _ = parse_code_point(black_box(raw));
            }
        })
    });

    c.bench_function("normalize_code_point single", |b| {
        b.iter(|| normalize_code_point(black_box("\\F02DC")))
    });
}

fn bench_parse_identifier(c: &mut Criterion) {
    c.bench_function("parse_identifier", |b| {
        b.iter(|| {
            let _ = parse_identifier(black_box("fa.Heart"));
            let _ = parse_identifier(black_box("material-symbols:home-outline-rounded"));
        })
    });
}

fn bench_mapping_parsers(c: &mut Criterion) {
    let endpoints = Endpoints::default();
    let remix = Remix::new(&endpoints);
    let fontawesome = FontAwesome::new(FontAwesomeStyle::Regular, &endpoints);
    let symbols = MaterialSymbols::new(MaterialSymbolsStyle::Outlined, &endpoints);

    let mut group = c.benchmark_group("process_mapping");

    for size in [100u32, 1_000, 3_000] {
        let css = remix_css(size);
        group.bench_with_input(BenchmarkId::new("css", size), &css, |b, css| {
            b.iter(|| remix.process_mapping(black_box(css.as_bytes())))
        });

        let json = fontawesome_json(size);
        group.bench_with_input(BenchmarkId::new("fontawesome_json", size), &json, |b, json| {
            b.iter(|| fontawesome.process_mapping(black_box(json.as_bytes())))
        });

        let codepoints = symbols_codepoints(size);
        group.bench_with_input(BenchmarkId::new("codepoints", size), &codepoints, |b, text| {
            b.iter(|| symbols.process_mapping(black_box(text.as_bytes())))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_code_point,
    bench_parse_identifier,
    bench_mapping_parsers
);
criterion_main!(benches);
