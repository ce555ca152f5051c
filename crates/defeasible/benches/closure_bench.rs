use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use defeasible::{
    explain, parse::parse_formula, parse::parse_knowledge_base, stratify, DpllOracle,
    KnowledgeBase, ReasonerKind, ReasonerParams,
};

/// A chain of ever more specific birds where each level flips whether it flies.
fn penguin_chain(n: usize) -> KnowledgeBase {
    let mut text = String::new();
    for i in 0..n {
        let negated = if i % 2 == 0 { "" } else { "!" };
        text.push_str(&format!("b{} ~> {}f; b{} => b{};", i, negated, i + 1, i));
        text.push_str(&format!("b{} ~> w{};", i, i));
    }
    parse_knowledge_base(&text).unwrap()
}

pub fn stratification(c: &mut Criterion) {
    let oracle = DpllOracle::new();
    let mut g = c.benchmark_group("Stratify");
    for n in [2, 4, 8] {
        let kb = penguin_chain(n);
        g.bench_with_input(BenchmarkId::new("parallel", n), &kb, |b, kb| {
            b.iter(|| black_box(stratify(kb, &oracle, &ReasonerParams::default()).unwrap()))
        });
        let sequential = ReasonerParams {
            parallel: false,
            ..Default::default()
        };
        g.bench_with_input(BenchmarkId::new("sequential", n), &kb, |b, kb| {
            b.iter(|| black_box(stratify(kb, &oracle, &sequential).unwrap()))
        });
    }
    g.finish();
}

pub fn closures(c: &mut Criterion) {
    let oracle = DpllOracle::new();
    let params = ReasonerParams::default();
    let base = stratify(&penguin_chain(4), &oracle, &params).unwrap();
    let query = parse_formula("b4 ~> w0").unwrap();

    let mut g = c.benchmark_group("Entail");
    for kind in ReasonerKind::ALL {
        g.bench_with_input(BenchmarkId::new("closure", kind), &kind, |b, kind| {
            b.iter(|| black_box(kind.entail(&oracle, &params, &base, &query).unwrap()))
        });
    }
    g.finish();

    let res = ReasonerKind::Rational
        .entail(&oracle, &params, &base, &parse_formula("b3 ~> !f").unwrap())
        .unwrap();
    c.bench_function("Explain", |b| {
        b.iter(|| black_box(explain(&oracle, res.clone()).unwrap()))
    });
}

criterion_group!(benches, stratification, closures);
criterion_main!(benches);
