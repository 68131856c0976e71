//! Benchmarks for matching and translation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use rdg::{
    parse_turtle, ClassExpression, ProtocolDocument, ProtocolValidator, StoreReasoner, StructuralMatcher,
    Term, Translator, ValidationOptions,
};

const ONTOLOGY: &str = r#"
    @prefix ex: <http://example.org/> .
    @prefix owl: <http://www.w3.org/2002/07/owl#> .
    ex:Analysis owl:equivalentClass [
        a owl:Class ;
        owl:intersectionOf ( ex:Process [ a owl:Restriction ; owl:onProperty ex:hasInput ; owl:minCardinality 1 ] )
    ] .
    ex:Dataset a owl:Class .
"#;

fn ex(local: String) -> Term {
    Term::uri(format!("http://example.org/{}", local))
}

fn instance_turtle(subjects: usize, inputs: usize) -> String {
    let mut ttl = String::from(
        "@prefix ex: <http://example.org/> .\n\
         ex:resource a rdg:Resource ; rdg:hasGraph ex:graph .\n",
    );
    for s in 0..subjects {
        ttl.push_str(&format!("ex:graph rdg:hasSubject ex:s{} .\n", s));
        ttl.push_str(&format!("ex:s{} a ex:Process", s));
        for i in 0..inputs {
            ttl.push_str(&format!(" ; ex:hasInput ex:d{}_{}", s, i));
        }
        ttl.push_str(" .\n");
        for i in 0..inputs {
            ttl.push_str(&format!("ex:d{}_{} a ex:Dataset .\n", s, i));
        }
    }
    ttl
}

fn template_turtle(subjects: usize) -> String {
    let mut ttl = String::from(
        "@prefix ex: <http://example.org/> .\n\
         @prefix t: <http://example.org/template/> .\n\
         t:resource a rdg:Resource ; rdg:hasGraph t:graph .\n",
    );
    for s in 0..subjects {
        ttl.push_str(&format!("t:graph rdg:hasSubject t:s{} .\n", s));
        ttl.push_str(&format!("t:s{} a ex:Analysis ; ex:hasInput t:d{} .\nt:d{} a ex:Dataset .\n", s, s, s));
    }
    ttl
}

fn matcher_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("structural_matcher");

    for size in [2usize, 4, 8] {
        let instances: Vec<Term> = (0..size).map(|i| ex(format!("i{}", i))).collect();
        let templates: Vec<Term> = (0..size).map(|i| ex(format!("t{}", i))).collect();

        // Instance i only fits template i, and candidates are tried in
        // reverse so the search has to backtrack.
        let reversed: Vec<Term> = instances.iter().rev().cloned().collect();
        group.bench_with_input(BenchmarkId::new("diagonal", size), &size, |b, _| {
            b.iter(|| {
                let mapping = StructuralMatcher::find_mapping(&reversed, &templates, |i, t| {
                    i.short_name().trim_start_matches('i') == t.short_name().trim_start_matches('t')
                });
                black_box(mapping)
            });
        });

        group.bench_with_input(BenchmarkId::new("any", size), &size, |b, _| {
            b.iter(|| black_box(StructuralMatcher::find_mapping(&instances, &templates, |_, _| true)));
        });
    }

    group.finish();
}

fn translation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("translation");

    for inputs in [1usize, 8, 32] {
        let mut kb = parse_turtle(ONTOLOGY, None).expect("ontology parses");
        kb.merge(&parse_turtle(&instance_turtle(1, inputs), None).expect("instance parses"));
        let reasoner = StoreReasoner::new(kb);
        let class = ClassExpression::named("http://example.org/Analysis");
        let subject = ex("s0".to_string());

        group.bench_with_input(BenchmarkId::new("defined_class", inputs), &inputs, |b, _| {
            b.iter(|| {
                let mut translator = Translator::new(&reasoner);
                black_box(translator.translate(&class, &subject).map(|s| s.len()))
            });
        });
    }

    group.finish();
}

fn validation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation");
    group.sample_size(20);

    let ontology = parse_turtle(ONTOLOGY, None).expect("ontology parses");
    let reasoner = StoreReasoner::new(ontology);
    let options = ValidationOptions::default();

    for subjects in [1usize, 4] {
        let (Ok(template), Ok(instance)) = (
            ProtocolDocument::from_turtle(&template_turtle(subjects), None),
            ProtocolDocument::from_turtle(&instance_turtle(subjects, 2), None),
        ) else {
            continue;
        };

        group.bench_with_input(BenchmarkId::new("pass", subjects), &subjects, |b, _| {
            b.iter(|| {
                let outcome = ProtocolValidator::new(&reasoner).validate(&instance, &template, &options);
                black_box(outcome.is_accepted())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, matcher_benchmark, translation_benchmark, validation_benchmark);
criterion_main!(benches);
