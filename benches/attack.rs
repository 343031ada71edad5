use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use frodo_lwe::algebraic::arora_ge_attack;
use frodo_lwe::attack::{babai_attack, recover_lwe_secret, LweInstance, SecretDistribution};
use frodo_lwe::kem::{decapsulate, encapsulate, keygen};
use frodo_lwe::lattice::{build_embedding, LllReducer};
use frodo_lwe::params::FrodoParams;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn kem_benchmark(c: &mut Criterion) {
    let params = FrodoParams::reference();
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let (pk, sk) = keygen(&params, &mut rng).unwrap();
    let (ct, _, _) = encapsulate(&params, &pk, None, &mut rng).unwrap();

    let mut group = c.benchmark_group("kem");
    group.bench_function("keygen", |b| b.iter(|| keygen(&params, &mut rng).unwrap()));
    group.bench_function("encapsulate", |b| {
        b.iter(|| encapsulate(&params, &pk, None, &mut rng).unwrap())
    });
    group.bench_function("decapsulate", |b| {
        b.iter(|| decapsulate(&params, &pk, &sk, &ct).unwrap())
    });
    group.finish();
}

fn lll_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("lll");
    group.sample_size(10);

    for (n, m) in [(8, 24), (10, 40), (16, 48)] {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let instance = LweInstance::generate(n, m, 65537, SecretDistribution::Uniform, &[-1, 0, 1], &mut rng);
        let embedding = build_embedding(&instance.a, &instance.b, instance.q);
        let reducer = LllReducer::default();

        group.bench_with_input(BenchmarkId::new("embedding", format!("n{}_m{}", n, m)), &embedding, |b, basis| {
            b.iter(|| reducer.reduce(basis).unwrap());
        });
    }

    group.finish();
}

fn attack_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("attack");
    group.sample_size(10);

    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let instance = LweInstance::generate(10, 40, 65537, SecretDistribution::Uniform, &[-1, 0, 1], &mut rng);
    group.bench_function("primal_n10_m40", |b| {
        b.iter(|| recover_lwe_secret(&instance, 1).unwrap())
    });
    group.bench_function("babai_n10_m40", |b| b.iter(|| babai_attack(&instance).unwrap()));

    let small = LweInstance::generate(3, 40, 65537, SecretDistribution::Uniform, &[-1, 0, 1], &mut rng);
    group.bench_function("arora_ge_n3_m40", |b| {
        b.iter(|| arora_ge_attack(&small.a, &small.b, &[-1, 0, 1], small.q).unwrap())
    });

    group.finish();
}

criterion_group!(benches, kem_benchmark, lll_benchmark, attack_benchmark);
criterion_main!(benches);
