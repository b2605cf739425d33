use criterion::{
    BenchmarkId,
    criterion_group,
    criterion_main,
    Criterion,
    Throughput,
};

use tiled_splats::{
    random_splats,
    sort::engine::DepthSorter,
    SortCamera,
    SortMode,
    SortRequest,
};


const SPLAT_COUNTS: [usize; 4] = [
    1000,
    10000,
    100_000,
    1_000_000,
];

const BATCH_SIZE: u32 = 1024;
const CAMERA: SortCamera = SortCamera {
    xyz: [4.0, 2.0, 8.0],
    vpm: None,
};


fn visible_sorter(count: usize, mode: SortMode) -> DepthSorter {
    let data = random_splats(count);
    let batches = count.div_ceil(BATCH_SIZE as usize) as u32;
    let addresses: Vec<u32> = (0..batches).map(|batch| batch * BATCH_SIZE).collect();

    let mut sorter = DepthSorter::new(mode);
    sorter.handle(SortRequest::AddBatches {
        addresses: addresses.clone(),
        positions: data.positions,
        batch_size: BATCH_SIZE,
    });
    sorter.handle(SortRequest::ShowBatches {
        addresses,
        camera: CAMERA,
        id: 0,
    });

    sorter
}

fn depth_sort_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort visible splats");
    for count in SPLAT_COUNTS.iter() {
        group.throughput(Throughput::Elements(*count as u64));

        #[cfg(feature = "sort_std")]
        group.bench_with_input(
            BenchmarkId::new("std", count),
            &count,
            |b, &count| {
                let mut sorter = visible_sorter(*count, SortMode::Std);

                b.iter(|| sorter.sort(&CAMERA));
            },
        );

        #[cfg(feature = "sort_rayon")]
        group.bench_with_input(
            BenchmarkId::new("rayon", count),
            &count,
            |b, &count| {
                let mut sorter = visible_sorter(*count, SortMode::Rayon);

                b.iter(|| sorter.sort(&CAMERA));
            },
        );
    }
}

criterion_group!{
    name = sort_benches;
    config = Criterion::default().sample_size(10);
    targets = depth_sort_benchmark
}
criterion_main!(sort_benches);
