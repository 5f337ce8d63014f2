//! Microbenchmarks for normalization and fuzzy search over a synthetic
//! station roster sized like a busy provincial terminal.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};

use bus_station_search::model::Collection;
use bus_station_search::normalize::{Mode, normalize};
use bus_station_search::{CollectionSource, OpsCache, SourceError};

struct SyntheticSource;

impl CollectionSource for SyntheticSource {
    async fn fetch(&self, collection: Collection) -> Result<Option<Vec<Value>>, SourceError> {
        let rows = match collection {
            Collection::Vehicles => (0..2000)
                .map(|i| json!({"id": format!("v{i}"), "bienSo": format!("98H-{:05}", i)}))
                .collect(),
            Collection::Operators => (0..300)
                .map(|i| json!({"id": format!("o{i}"), "tenDonVi": format!("Nhà xe Phương Trang {i}")}))
                .collect(),
            Collection::Drivers => (0..1500)
                .map(|i| json!({"id": format!("d{i}"), "hoTen": format!("Nguyễn Văn An {i}")}))
                .collect(),
            Collection::Routes => (0..200)
                .map(|i| {
                    json!({"id": format!("r{i}"), "maTuyen": format!("HN-{i:03}"), "benDi": "Bến xe Mỹ Đình", "benDen": format!("Bến {i}")})
                })
                .collect(),
            _ => Vec::new(),
        };
        Ok(Some(rows))
    }
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_code_plate", |b| {
        b.iter(|| normalize(black_box("98H-074.80"), Mode::Code))
    });
    c.bench_function("normalize_text_vietnamese_name", |b| {
        b.iter(|| normalize(black_box("Nguyễn Thị Phương Trang"), Mode::Text))
    });
}

fn bench_fuzzy_search(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let cache = OpsCache::new(SyntheticSource);
    rt.block_on(cache.pre_warm());

    c.bench_function("fuzzy_plate_query", |b| {
        b.iter(|| black_box(cache.fuzzy_search("xe 98H00123 hôm nay")))
    });
    c.bench_function("fuzzy_free_text_query", |b| {
        b.iter(|| black_box(cache.fuzzy_search("phương trang")))
    });
    c.bench_function("exact_plate_lookup", |b| {
        b.iter(|| black_box(cache.search_vehicle_by_plate("98H-01999")))
    });
}

criterion_group!(benches, bench_normalize, bench_fuzzy_search);
criterion_main!(benches);
