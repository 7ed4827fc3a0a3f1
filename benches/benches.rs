use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use keystretch::hasher::{HashRequest, Pbkdf2Hasher, Pbkdf2Params};

fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute");
    group.sample_size(10);

    for iterations in [10_000, 100_000, 400_000] {
        let hasher = Pbkdf2Hasher::new(Pbkdf2Params {
            iterations,
            ..Pbkdf2Params::default()
        });
        let descriptor = hasher.generate_salt().unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            &descriptor,
            |b, descriptor| {
                b.iter(|| {
                    hasher
                        .compute_blocking(&HashRequest::with_salt(
                            "correct horse battery staple",
                            descriptor.clone(),
                        ))
                        .unwrap()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_compute);
criterion_main!(benches);
