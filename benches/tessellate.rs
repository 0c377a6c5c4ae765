use criterion::{criterion_group, criterion_main, Criterion, black_box};

use glam::Vec3;
use roamesh::terrain::Heightmap;
use roamesh::tess::{Landscape, TessConfig};

fn rolling_height(x: u32, y: u32) -> u8 {
    let fx = x as f32 * 0.045;
    let fy = y as f32 * 0.045;
    (((fx.sin() + fy.cos()) * 0.25 + 0.5) * 255.0) as u8
}

fn bench_config() -> TessConfig {
    TessConfig {
        map_size: 256,
        patches_per_side: 4,
        variance_depth: 9,
        max_tris: 20_000,
        wanted_tris: 10_000,
        variance_tolerance: 2.0,
        tri_node_pool: 60_000,
    }
}

fn bench_init(c: &mut Criterion) {
    let mut bytes = vec![0u8; 256 * 256];
    for y in 0..256u32 {
        for x in 0..256u32 {
            bytes[(y * 256 + x) as usize] = rolling_height(x, y);
        }
    }

    c.bench_function("landscape_init_256", |b| {
        b.iter(|| {
            let map = Heightmap::from_raw(black_box(&bytes), 256).unwrap();
            Landscape::new(bench_config(), map).unwrap()
        });
    });
}

fn bench_first_frame(c: &mut Criterion) {
    c.bench_function("first_frame_256", |b| {
        b.iter_with_setup(
            || {
                let mut landscape =
                    Landscape::new(bench_config(), Heightmap::from_fn(256, rolling_height))
                        .unwrap();
                landscape.set_camera(
                    Vec3::new(128.0, 180.0, 128.0),
                    Vec3::new(0.3, -0.8, 0.3),
                );
                landscape
            },
            |mut landscape| {
                landscape.reset();
                landscape.tessellate();
                landscape.render();
                black_box(landscape.stats().triangles_rendered)
            },
        );
    });
}

fn bench_steady_state_frame(c: &mut Criterion) {
    let mut landscape =
        Landscape::new(bench_config(), Heightmap::from_fn(256, rolling_height)).unwrap();
    landscape.set_camera(Vec3::new(128.0, 180.0, 128.0), Vec3::new(0.3, -0.8, 0.3));
    for _ in 0..60 {
        landscape.reset();
        landscape.tessellate();
        landscape.render();
    }

    c.bench_function("steady_state_frame_256", |b| {
        b.iter(|| {
            landscape.reset();
            landscape.tessellate();
            landscape.render();
            black_box(landscape.stats().triangles_rendered)
        });
    });
}

criterion_group!(
    benches,
    bench_init,
    bench_first_frame,
    bench_steady_state_frame
);
criterion_main!(benches);
