#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use telemeter_agent::storage::{ExpvarStorage, InfluxSettings, InfluxStorage, Precision};
use telemeter_agent::{Registry, Storage};
use telemeter_core::{Counter, Histogram, Labels, Measure, Metric, TelemeterError, NO_LABELS};

fn settings(url: &str) -> InfluxSettings {
    InfluxSettings {
        url: url.to_string(),
        database: "metrics".to_string(),
        precision: Precision::S,
        ..Default::default()
    }
}

#[test]
fn expvar_id_defaults_to_uuid() {
    let s = ExpvarStorage::with_id("");
    assert_eq!(s.id().len(), 36);
    assert_eq!(ExpvarStorage::with_id("metrics").id(), "metrics");
}

#[tokio::test]
async fn expvar_records_scalars_and_summaries() {
    let storage = ExpvarStorage::with_id("metrics");
    storage.set_labels(Labels::new().with(["host", "a"]));

    let c = Counter::new("hits_total", "Hits", &["path", "/"]);
    c.add(2.0);
    let h = Histogram::new("latency", "Latency", NO_LABELS);
    let measures = vec![
        Measure::from_metric(&c).unwrap(),
        Measure::from_metric(&h).unwrap(),
    ];
    storage.write(Arc::new(measures)).await.unwrap();

    let snap = storage.snapshot();
    let hits = &snap["hits_total{path=/}"];
    assert_eq!(hits["help"], "Hits");
    assert_eq!(hits["value"], 2.0);
    assert_eq!(hits["sample_count"], 1);
    assert_eq!(hits["labels"]["host"], "a");
    assert_eq!(hits["labels"]["path"], "/");

    // Empty histogram: every aggregate is NaN and therefore omitted.
    let latency = snap["latency"].as_object().unwrap();
    assert_eq!(latency["sample_count"], 0);
    assert!(!latency.contains_key("sample_sum"));
    assert!(!latency.contains_key("p50"));
}

#[tokio::test(flavor = "multi_thread")]
async fn expvar_render_pulls_fresh_data() {
    let registry = Registry::new();
    let c = Counter::new("hits_total", "", NO_LABELS);
    registry.register_collector(c.clone()).await.unwrap();

    let storage = Arc::new(ExpvarStorage::with_id("metrics"));
    registry.add_storages([storage.clone() as Arc<dyn Storage>]);

    c.add(1.0);
    assert_eq!(storage.render().await["hits_total"]["value"], 1.0);
    c.add(1.0);
    assert_eq!(storage.render().await["hits_total"]["value"], 2.0);
}

#[test]
fn influx_encodes_line_protocol() {
    let storage = InfluxStorage::with_id("tsdb", settings("http://localhost:8086")).unwrap();
    storage.set_labels(Labels::new().with(["host", "my host"]));

    let c = Counter::new("hits_total", "", &["path", "/a,b"]);
    c.add(3.0);
    let empty = Histogram::new("latency", "", NO_LABELS);
    let h = Histogram::new("size", "", NO_LABELS);
    h.add(4.0);

    let measures = vec![
        Measure::from_metric(&c).unwrap(),
        Measure::from_metric(&empty).unwrap(),
        Measure::from_metric(&h).unwrap(),
    ];
    let ts = measures[0].created_at.timestamp();

    let body = storage.encode(&measures).unwrap();
    let text = std::str::from_utf8(&body).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 2, "empty histogram must be skipped: {text}");
    assert_eq!(
        lines[0],
        format!(r"hits_total,host=my\ host,path=/a\,b value=3,sample_count=1 {ts}")
    );
    assert!(lines[1].starts_with(
        r"size,host=my\ host sample_count=1,sample_sum=4,sample_min=4,sample_max=4,sample_variance=0,p50=4"
    ));
    assert!(!text.contains("latency"));
}

#[test]
fn influx_metric_label_overrides_global_tag() {
    let storage = InfluxStorage::with_id("tsdb", settings("http://localhost:8086")).unwrap();
    storage.set_labels(Labels::new().with(["host", "z"]));

    let c = Counter::new("hits", "", &["host", "a"]);
    c.add(1.0);
    let m = Measure::from_metric(&c).unwrap();
    let ts = m.created_at.timestamp();

    let body = storage.encode(&[m]).unwrap();
    let text = std::str::from_utf8(&body).unwrap();
    assert_eq!(text, format!("hits,host=a value=1,sample_count=1 {ts}\n"));
}

#[tokio::test]
async fn expvar_metric_label_overrides_global_label() {
    let storage = ExpvarStorage::with_id("metrics");
    storage.set_labels(Labels::new().with(["host", "z", "dc", "eu"]));

    let c = Counter::new("hits", "", &["host", "a"]);
    storage
        .write(Arc::new(vec![Measure::from_metric(&c).unwrap()]))
        .await
        .unwrap();

    let snap = storage.snapshot();
    let labels = snap["hits{host=a}"]["labels"].as_object().unwrap();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels["host"], "a");
    assert_eq!(labels["dc"], "eu");
}

#[test]
fn influx_rejects_missing_settings() {
    assert!(InfluxStorage::new(settings("")).is_err());
    let mut s = settings("http://localhost:8086");
    s.database.clear();
    assert!(InfluxStorage::new(s).is_err());
}

#[test]
fn influx_reinitialize_swaps_settings() {
    let storage = InfluxStorage::with_id("tsdb", settings("http://localhost:8086")).unwrap();
    let mut next = settings("http://localhost:9999");
    next.precision = Precision::Ms;
    storage.reinitialize(next).unwrap();

    assert_eq!(storage.settings().url, "http://localhost:9999");
    assert_eq!(storage.settings().precision, Precision::Ms);
    assert!(storage.reinitialize(settings("")).is_err());
    assert_eq!(storage.settings().url, "http://localhost:9999");
}

#[tokio::test]
async fn influx_write_failure_names_the_storage() {
    // Nothing listens on the discard port.
    let storage = InfluxStorage::with_id("tsdb", settings("http://127.0.0.1:9")).unwrap();
    let c = Counter::new("hits_total", "", NO_LABELS);
    let err = storage
        .write(Arc::new(vec![Measure::from_metric(&c).unwrap()]))
        .await
        .unwrap_err();
    assert!(matches!(err, TelemeterError::Storage { ref id, .. } if id == "tsdb"));
}

#[test]
fn measure_keeps_metric_description() {
    let c = Counter::new("hits_total", "", NO_LABELS);
    let m = Measure::from_metric(&c).unwrap();
    assert!(Arc::ptr_eq(&m.description, c.description()));
}
