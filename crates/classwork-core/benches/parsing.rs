use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use classwork_core::parser::{parse_exercise_list_str, validate_exercise_list};

fn make_list_json(len: usize) -> String {
    let items: Vec<String> = (0..len)
        .map(|i| {
            format!(
                r#"{{
        "Tema": "Aritmética",
        "Enunciado": "Quanto é {i} + 1?",
        "Alternativa A": "{a}",
        "Alternativa B": "{b}",
        "Alternativa C": "N/A",
        "RespostaCorreta": "a"
    }}"#,
                a = i + 1,
                b = i + 2,
            )
        })
        .collect();
    format!("[\n    {}\n]", items.join(",\n    "))
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_exercise_list");
    let source = Path::new("bench.json");

    for len in [10, 100, 1000] {
        let json = make_list_json(len);
        group.bench_function(format!("len={len}"), |b| {
            b.iter(|| parse_exercise_list_str("bench.json", black_box(&json), source))
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let json = make_list_json(500);
    let list = parse_exercise_list_str("bench.json", &json, Path::new("bench.json")).unwrap();

    c.bench_function("validate_exercise_list/len=500", |b| {
        b.iter(|| validate_exercise_list(black_box(&list)))
    });
}

criterion_group!(benches, bench_parse, bench_validate);
criterion_main!(benches);
