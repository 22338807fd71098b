use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use triplemap::mapping::{DynamicObject, ScalarKind, ValueKind};
use triplemap::{
    ClassMapping, Identity, MappingConfig, MappingContext, MemberMapping, RdfStore, Schema,
    TriplePattern, Value,
};

fn tp(s: &str, p: &str, o: &str) -> TriplePattern {
    TriplePattern::parse(s, p, o).unwrap()
}

fn context() -> MappingContext {
    let point = ClassMapping::new("Point")
        .class_triple(tp("$this", "rdf:type", "ex:Point"))
        .class_triple(tp("$this", "ex:value", "_:v"))
        .class_triple(tp("_:v", "rdf:type", "ex:Vector3D"))
        .member(MemberMapping::new("x", ScalarKind::Float).triple(tp("_:v", "ex:x", "$that")))
        .member(MemberMapping::new("y", ScalarKind::Float).triple(tp("_:v", "ex:y", "$that")))
        .member(MemberMapping::new("z", ScalarKind::Float).triple(tp("_:v", "ex:z", "$that")));
    let path = ClassMapping::new("Path")
        .identity(Identity::PathTemplate("paths/{name}".into()))
        .class_triple(tp("$this", "rdf:type", "ex:Path"))
        .member(MemberMapping::new("name", ScalarKind::String).triple(tp("$this", "rdfs:label", "$that")))
        .member(
            MemberMapping::new("points", ValueKind::object("Point"))
                .triple(tp("$this", "ex:point", "$that.element")),
        );

    let schema = Schema::new()
        .with_class(point)
        .and_then(|s| s.with_class(path))
        .unwrap();
    let config = MappingConfig::new("http://example.org/").with_prefix("ex", "http://example.org/ns#");
    MappingContext::new(schema, config).unwrap()
}

fn path_of(len: usize) -> DynamicObject {
    let points = (0..len).map(|i| {
        let f = i as f64;
        Value::object(
            DynamicObject::new("Point")
                .with("x", Value::scalar(f))
                .with("y", Value::scalar(f * 0.5))
                .with("z", Value::scalar(-f)),
        )
    });
    DynamicObject::new("Path")
        .with("name", Value::scalar(format!("path{}", len)))
        .with("points", Value::list(points))
}

/// Benchmark writing a path with N nested points
fn bench_write(c: &mut Criterion) {
    let ctx = context();
    let mut group = c.benchmark_group("write");

    for size in [10, 100, 1000].iter() {
        let path = path_of(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut store = RdfStore::new();
                ctx.insert(&mut store, &path).unwrap();
                criterion::black_box(store.len());
            });
        });
    }
    group.finish();
}

/// Benchmark reading the same path back
fn bench_read(c: &mut Criterion) {
    let ctx = context();
    let mut group = c.benchmark_group("read");

    for size in [10, 100, 1000].iter() {
        let mut store = RdfStore::new();
        let subject = ctx.insert(&mut store, &path_of(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut back = DynamicObject::new("Path");
                ctx.read(&store, &subject, &mut back).unwrap();
                criterion::black_box(back.len());
            });
        });
    }
    group.finish();
}

/// Benchmark identity resolution from a path template
fn bench_identity(c: &mut Criterion) {
    let ctx = context();
    let store = RdfStore::new();
    let path = DynamicObject::new("Path").with("name", Value::scalar("p"));

    c.bench_function("identity_of", |b| {
        b.iter(|| criterion::black_box(ctx.identity_of(&store, &path).unwrap()));
    });
}

criterion_group!(benches, bench_write, bench_read, bench_identity);
criterion_main!(benches);
