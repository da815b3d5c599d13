use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mite_validate::{
    expand_alternatives, sanitize_reaction_smarts, DefaultEngine, Example, ReactionRecord,
    ReactionValidator, ValidatorConfig,
};

fn example(substrate: &str, products: &[&str]) -> Example {
    Example {
        substrate: substrate.to_string(),
        products: products.iter().map(|s| s.to_string()).collect(),
        ..Example::default()
    }
}

fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize");

    group.bench_function("ketcher_halogens", |b| {
        b.iter(|| {
            black_box(sanitize_reaction_smarts(black_box(
                "[#6:1]-Cl:2.[#7:3;h1]>>[#6:1]-[#7:3](-Cl).[#17:2;-]",
            )))
        })
    });
    group.bench_function("expand_alternatives", |b| {
        b.iter(|| {
            black_box(expand_alternatives(black_box(
                "[#6:1]-[#17,#35,#53:2].[#7,#8:3]>>[#6:1]-[#7,#8:3].[#17,#35,#53:2]",
            )))
        })
    });

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let engine = DefaultEngine;
    let validator = ReactionValidator::new(&engine, ValidatorConfig::default());

    let oxidation = ReactionRecord {
        smarts: "[C:1][OH:2]>>[C:1]=[O:2]".to_string(),
        examples: vec![
            example("CCO", &["CC=O"]),
            example("OCC(O)C", &["CC(O)C=O"]),
        ],
    };
    let lactonization = ReactionRecord {
        smarts: "[OH:1][C:2][C:3][C:4][C:5](=[O:6])[OH:7]>>[O:1]1[C:2][C:3][C:4][C:5]1=[O:6].[OH2:7]"
            .to_string(),
        examples: vec![example("OCCCC(=O)O", &["O=C1CCCO1", "O"])],
    };
    let methylation = ReactionRecord {
        smarts: "[c:1][OH:2].[CH3:3][S+:4]>>[c:1][O:2][CH3:3].[S+0:4]".to_string(),
        examples: vec![example(
            "Oc1ccc(O)cc1.C[S+](C)C",
            &["COc1ccc(O)cc1", "CSC"],
        )],
    };

    let mut group = c.benchmark_group("validate");

    group.bench_function("oxidation", |b| {
        b.iter(|| black_box(validator.validate(black_box(&oxidation))))
    });
    group.bench_function("lactonization", |b| {
        b.iter(|| black_box(validator.validate(black_box(&lactonization))))
    });
    group.bench_function("methylation_two_reactants", |b| {
        b.iter(|| black_box(validator.validate(black_box(&methylation))))
    });

    group.finish();
}

criterion_group!(benches, bench_sanitize, bench_validate);
criterion_main!(benches);
