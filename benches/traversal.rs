use criterion::{black_box, criterion_group, criterion_main, Criterion};
use holdscan::config::HarvestConfig;
use holdscan::store::TemplateStore;
use holdscan::traversal::Walker;
use serde_json::{json, Value};

fn nested_payload(width: usize, depth: usize) -> Value {
    let mut node = json!({"legalHoldTemplateId": "T-root", "templateName": "Root"});
    for level in 0..depth {
        let items: Vec<Value> = (0..width)
            .map(|i| {
                json!({
                    "legal_hold_template_id": format!("T-{}-{}", level, i),
                    "meta": {"revision": i, "archived": false},
                })
            })
            .collect();
        node = json!({
            "name": format!("Level {}", level),
            "items": items,
            "next": node,
        });
    }
    node
}

fn bench_walk(c: &mut Criterion) {
    let payload = nested_payload(50, 20);
    let walker = Walker::new(HarvestConfig::default().max_nodes);

    c.bench_function("walk_nested_50x20", |b| {
        b.iter(|| {
            let mut store = TemplateStore::new();
            walker.walk(black_box(&payload), &mut store);
            store.len()
        })
    });
}

criterion_group!(benches, bench_walk);
criterion_main!(benches);
