use criterion::{Criterion, black_box, criterion_group, criterion_main};
use strata_mesh::{ChunkMeshAssembler, FaceCullingSupplier, MeshFragment, collect_fragments};
use strata_terrain::{TerrainSettings, VoxelClassifier, noise_seed};
use strata_voxel::ChunkDescriptor;

const SEED: u64 = 42;

fn terrain_fragments() -> Vec<MeshFragment> {
    let classifier = VoxelClassifier::new(TerrainSettings::default(), noise_seed(SEED))
        .expect("default settings are valid");
    let chunk = ChunkDescriptor::new([0, 0, 0], [32, 32, 32]).expect("valid chunk");
    let grid = classifier.classify_seeded(&chunk, SEED);
    collect_fragments(&grid, &FaceCullingSupplier::default())
}

fn bench_offset_table(c: &mut Criterion) {
    let fragments = terrain_fragments();
    c.bench_function("offset_table_32", |bencher| {
        bencher.iter(|| black_box(strata_mesh::OffsetTable::build(black_box(&fragments))))
    });
}

fn bench_assemble_single_threaded(c: &mut Criterion) {
    let fragments = terrain_fragments();
    let assembler = ChunkMeshAssembler::single_threaded();
    c.bench_function("assemble_32_single", |bencher| {
        bencher.iter(|| black_box(assembler.assemble(black_box(&fragments))))
    });
}

fn bench_assemble_parallel(c: &mut Criterion) {
    let fragments = terrain_fragments();
    let assembler = ChunkMeshAssembler::with_defaults();
    c.bench_function("assemble_32_parallel", |bencher| {
        bencher.iter(|| black_box(assembler.assemble(black_box(&fragments))))
    });
}

fn bench_classify_chunk(c: &mut Criterion) {
    let classifier = VoxelClassifier::new(TerrainSettings::default(), noise_seed(SEED))
        .expect("default settings are valid");
    let chunk = ChunkDescriptor::new([0, 0, 0], [32, 32, 32]).expect("valid chunk");
    c.bench_function("classify_32", |bencher| {
        bencher.iter(|| black_box(classifier.classify_seeded(black_box(&chunk), SEED)))
    });
}

criterion_group!(
    benches,
    bench_offset_table,
    bench_assemble_single_threaded,
    bench_assemble_parallel,
    bench_classify_chunk
);
criterion_main!(benches);
