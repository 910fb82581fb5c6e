use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ontotag::{Extractor, ExtractorConfig, InMemoryOntology, Term};

fn vocabulary() -> InMemoryOntology {
    InMemoryOntology::new(vec![
        Term::new("HP:0001290", "Hypotonia").with_synonyms(["Low muscle tone"]),
        Term::new("HP:0001263", "Developmental delay"),
        Term::new("HP:0000750", "Speech delay"),
        Term::new("HP:0001250", "Seizure"),
        Term::new("HP:0000252", "Microcephaly"),
        Term::new("HP:0000256", "Macrocephaly").with_synonyms(["Large head"]),
        Term::new("HP:0001252", "Muscular hypotonia"),
        Term::new("HP:0002360", "Sleep disturbance"),
        Term::new("HP:0000717", "Autism"),
        Term::new("HP:0001249", "Intellectual disability"),
    ])
}

const NOTE: &str = "Patient is a 3 year old with global developmental delay and \
    hypotonia noted since infancy. Parents report delayed speech, poor sleep, \
    and two episodes concerning for seizure activity. Head circumference is \
    enlarged; prior notes mention a large head. No evidence of microcephaly. \
    Behavioral screening raised a question of autism. Exam today shows low \
    muscle tone in all four limbs and mild intellectual disability per testing.";

fn bench_build(c: &mut Criterion) {
    let source = vocabulary();
    c.bench_function("build_extractor", |b| {
        b.iter(|| Extractor::from_source(black_box(&source), ExtractorConfig::default()).unwrap())
    });
}

fn bench_extract(c: &mut Criterion) {
    let source = vocabulary();
    let extractor = Extractor::from_source(&source, ExtractorConfig::default()).unwrap();
    c.bench_function("extract_clinical_note", |b| {
        b.iter(|| extractor.extract(black_box(NOTE)).unwrap())
    });

    let no_spell = Extractor::from_source(
        &source,
        ExtractorConfig::default().with_correct_spelling(false),
    )
    .unwrap();
    c.bench_function("extract_clinical_note_no_spellcheck", |b| {
        b.iter(|| no_spell.extract(black_box(NOTE)).unwrap())
    });
}

criterion_group!(benches, bench_build, bench_extract);
criterion_main!(benches);
