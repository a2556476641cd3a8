/// Benchmarks for feed frame validation, the per-message hot path of the WebSocket task.
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use gloria_client_sdk::news::types::NewsItem;
use gloria_client_sdk::ws::types::FeedMessage;
use gloria_client_sdk::ws::types::response::parse_messages;

fn bench_parse_messages(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed/parse_messages");

    let data = br#"{
        "type": "data",
        "feed_category": "crypto",
        "content": {
            "signal": "Bitcoin reclaims $120k as ETF inflows accelerate",
            "timestamp": 1753314064,
            "sources": ["https://example.com/a", "https://example.com/b"]
        },
        "timestamp": 1753314064237
    }"#;
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("data", |b| {
        b.iter(|| {
            parse_messages(std::hint::black_box(data)).expect("Validation should succeed")
        });
    });

    let ping = br#"{"type": "ping", "timestamp": 1753314064237}"#;
    group.throughput(Throughput::Bytes(ping.len() as u64));
    group.bench_function("ping", |b| {
        b.iter(|| {
            parse_messages(std::hint::black_box(ping)).expect("Validation should succeed")
        });
    });

    let batch = br#"[
        {"type": "subscribed", "feed_category": "crypto"},
        {"type": "data", "action": "subscribed", "feed_category": "macro"},
        {"type": "data", "feed_category": "tech", "content": {"signal": "New model released"}}
    ]"#;
    group.throughput(Throughput::Bytes(batch.len() as u64));
    group.bench_function("batch", |b| {
        b.iter(|| {
            parse_messages(std::hint::black_box(batch)).expect("Validation should succeed")
        });
    });

    let invalid = br#"{"type": "unknown", "feed_category": "crypto"}"#;
    group.throughput(Throughput::Bytes(invalid.len() as u64));
    group.bench_function("invalid", |b| {
        b.iter(|| parse_messages(std::hint::black_box(invalid)).is_err());
    });

    group.finish();
}

fn bench_serialize_control(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed/serialize");

    let subscribe = FeedMessage::subscribe("ai_agents");
    group.bench_function("subscribe", |b| {
        b.iter(|| {
            serde_json::to_string(std::hint::black_box(&subscribe))
                .expect("Serialization should succeed")
        });
    });

    group.finish();
}

fn bench_news_items(c: &mut Criterion) {
    let mut group = c.benchmark_group("news/items");

    let page = serde_json::to_string(
        &(0..40)
            .map(|i| {
                serde_json::json!({
                    "timestamp": 1_753_314_064 + i,
                    "signal": format!("Headline number {i}"),
                    "feed_category": "crypto",
                    "summary": "Lorem ipsum dolor sit amet"
                })
            })
            .collect::<Vec<_>>(),
    )
    .expect("Serialization should succeed");

    group.throughput(Throughput::Bytes(page.len() as u64));
    group.bench_function("page_of_40", |b| {
        b.iter(|| {
            let _: Vec<NewsItem> = serde_json::from_str(std::hint::black_box(&page))
                .expect("Deserialization should succeed");
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_messages,
    bench_serialize_control,
    bench_news_items
);
criterion_main!(benches);
