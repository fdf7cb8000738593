use std::collections::HashSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use commissary_auth::Actor;
use commissary_infra::accounts::authenticate;
use commissary_infra::bootstrap::seed_default_users;
use commissary_infra::writes::CreateItem;
use commissary_infra::{Database, MutationPipeline};
use commissary_inventory::{Barcode, BarcodeAllocator, NewItem, SizeCode, ThreadRngSerials, TypeCode};

/// Pure allocation against a taken-set of growing occupancy.
fn bench_allocate_in_memory(c: &mut Criterion) {
    let type_code = TypeCode::parse("TS").unwrap();
    let size_code = SizeCode::parse("M").unwrap();
    let allocator = BarcodeAllocator::new(type_code.clone(), size_code.clone());

    let mut group = c.benchmark_group("allocate_in_memory");
    group.throughput(Throughput::Elements(1));
    for occupied in [0u32, 100_000, 500_000, 900_000] {
        let taken: HashSet<Barcode> = (0..occupied)
            .map(|n| Barcode::compose(&type_code, &size_code, n))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(occupied), &taken, |b, taken| {
            b.iter(|| black_box(allocator.allocate(&ThreadRngSerials, |candidate| taken.contains(candidate))));
        });
    }
    group.finish();
}

/// Full pipeline: authorise, allocate, insert, audit, commit.
fn bench_create_item_pipeline(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let (pipeline, admin) = rt.block_on(async {
        let db = Database::in_memory().await.unwrap();
        seed_default_users(db.pool()).await.unwrap();
        let account = authenticate(db.pool(), "admin", "admin123").await.unwrap();
        (MutationPipeline::new(db.pool().clone()), Actor::new(account.id, account.role))
    });

    let mut group = c.benchmark_group("create_item_pipeline");
    group.throughput(Throughput::Elements(1));
    group.bench_function("create_item", |b| {
        b.iter(|| {
            let item = NewItem::new(
                Some("T-Shirt".into()),
                Some("TS".into()),
                Some("M".into()),
                None,
                Some(4.0),
                None,
                None,
            )
            .unwrap();
            rt.block_on(pipeline.perform(&admin, CreateItem(item))).unwrap()
        });
    });
    group.finish();
}

criterion_group!(benches, bench_allocate_in_memory, bench_create_item_pipeline);
criterion_main!(benches);
