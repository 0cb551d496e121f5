//! Encode + predict latency on a synthetic training table

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use disease_predictor::data::TrainingTable;
use disease_predictor::{Classifier, ForestParams, SymptomEncoder};

const N_SYMPTOMS: usize = 120;
const N_DISEASES: usize = 40;

fn synthetic_table() -> TrainingTable {
    let symptoms: Vec<String> = (0..N_SYMPTOMS).map(|i| format!("symptom_{}", i)).collect();
    let mut rows = Vec::new();
    let mut labels = Vec::new();

    for d in 0..N_DISEASES {
        for r in 0..10 {
            let mut row = vec![0u8; N_SYMPTOMS];
            for k in 0..4 {
                row[(d * 3 + k * 7 + r % 2) % N_SYMPTOMS] = 1;
            }
            rows.push(row);
            labels.push(format!("disease_{}", d));
        }
    }

    TrainingTable::from_rows(symptoms, rows, labels).unwrap()
}

fn bench_predict(c: &mut Criterion) {
    let table = synthetic_table();
    let classifier = Classifier::train(&table, &ForestParams::default()).unwrap();
    let encoder = SymptomEncoder::new(classifier.vocabulary().clone());
    let selected = ["symptom_3", "symptom_10", "symptom_17", "symptom_24"];

    c.bench_function("encode_and_predict", |b| {
        b.iter(|| {
            let vector = encoder.encode(black_box(&selected));
            classifier.predict(&vector).unwrap()
        })
    });

    c.bench_function("train_100_trees", |b| {
        b.iter(|| Classifier::train(black_box(&table), &ForestParams::default()).unwrap())
    });
}

criterion_group!(benches, bench_predict);
criterion_main!(benches);
