use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use scoutboard::dataset::{ParsePolicy, PlayerRecord, RawTable, prepare};
use scoutboard::normalize_currency;

const AMOUNTS: [&str; 8] = [
    "€105.5M", "€850K", "1500000", "€1,5M", " €12K ", "€0", "€310.8M", "€500",
];

fn synthetic_players(count: usize) -> Vec<PlayerRecord> {
    (0..count)
        .map(|idx| PlayerRecord {
            name: format!("Player {idx}"),
            team: format!("Team {}", idx % 40),
            best_position: ["GK", "CB", "CM", "ST"][idx % 4].to_string(),
            foot: if idx % 3 == 0 { "Left" } else { "Right" }.to_string(),
            age: u32::try_from(16 + idx % 25).ok().map(f64::from),
            value: (idx % 17 != 0).then(|| AMOUNTS[idx % AMOUNTS.len()].to_string()),
            wage: Some(format!("€{}K", idx % 300 + 1)),
            release_clause: Some(format!("€{}.{}M", idx % 200, idx % 10)),
            extra: Vec::new(),
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_currency", |b| {
        b.iter(|| {
            for amount in AMOUNTS {
                let _ = black_box(normalize_currency(Some(black_box(amount))));
            }
        });
    });
}

fn bench_prepare(c: &mut Criterion) {
    let players = synthetic_players(20_000);
    c.bench_function("prepare_20k", |b| {
        b.iter(|| {
            let table = RawTable::new(players.clone());
            black_box(prepare(table, ParsePolicy::Impute).map(|dataset| dataset.len()))
        });
    });
}

criterion_group!(benches, bench_normalize, bench_prepare);
criterion_main!(benches);
