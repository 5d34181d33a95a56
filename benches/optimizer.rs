use bin_packer_ils::*;
use criterion::*;
use rand::prelude::*;

fn build_instance(num_types: usize) -> Instance {
    let mut rng: StdRng = SeedableRng::seed_from_u64(1);
    Instance::random(150, num_types, 20, 100, 5, &mut rng).unwrap()
}

pub fn benchmark_construct(c: &mut Criterion) {
    let instance = build_instance(100);
    c.bench_function("first fit decreasing", |b| {
        b.iter(|| first_fit_decreasing(black_box(&instance)))
    });
    c.bench_function("best fit decreasing", |b| {
        b.iter(|| best_fit_decreasing(black_box(&instance)))
    });
}

pub fn benchmark_local_search(c: &mut Criterion) {
    let instance = build_instance(40);
    let initial = first_fit_decreasing(&instance);
    c.bench_function("local search from ffd", |b| {
        b.iter(|| {
            LocalSearch::default().run(
                instance.capacity(),
                black_box(initial.clone()),
                &Deadline::unbounded(),
            )
        })
    });
}

pub fn benchmark_optimize(c: &mut Criterion) {
    let instance = build_instance(20);
    c.bench_function("optimize random items", |b| {
        b.iter(|| {
            let _ = Optimizer::new()
                .set_instance(&instance)
                .set_random_seed(1)
                .set_max_iterations(50)
                .optimize(|_| {});
        })
    });
}

criterion_group!(
    benches,
    benchmark_construct,
    benchmark_local_search,
    benchmark_optimize
);
criterion_main!(benches);
