#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use telemeter_core::{
    sort_measures, Collector, Counter, Description, Gauge, Histogram, Measure, Metric, Timer,
    NO_LABELS,
};

#[test]
fn concurrent_with_returns_one_instance() {
    let c = Counter::new("hits", "", &["service", "api"]);

    let handles: Vec<Counter> = std::thread::scope(|s| {
        let joins: Vec<_> = (0..16)
            .map(|_| {
                let c = c.clone();
                s.spawn(move || c.with(&["path", "/a"]))
            })
            .collect();
        joins.into_iter().map(|j| j.join().unwrap()).collect()
    });

    let first = &handles[0];
    assert!(handles.iter().all(|h| h.ptr_eq(first)));

    for h in &handles {
        h.inc();
    }
    assert_eq!(c.with(&["path", "/a"]).count(), 16.0);
}

#[test]
fn dynamic_label_order_does_not_matter() {
    let g = Gauge::new("g", "", NO_LABELS);
    let a = g.with(&["a", "1", "b", "2"]);
    let b = g.with(&["b", "2", "a", "1"]);
    assert!(a.ptr_eq(&b));
    assert!(!a.ptr_eq(&g.with(&["a", "1"])));
}

#[test]
fn child_description_merges_declared_and_dynamic() {
    let c = Counter::new("hits", "Hit count", &["service", "api"]);
    let child = c.with(&["code", "200"]);

    let d = child.description();
    assert_eq!(d.name(), "hits");
    assert_eq!(d.help(), "Hit count");
    assert_eq!(d.kind(), c.description().kind());
    assert_eq!(d.labels().canonical(), "code=200,service=api");
    assert_ne!(d.id(), c.description().id());
}

#[test]
fn dangling_dynamic_label_is_unknown() {
    let c = Counter::new("hits", "", NO_LABELS);
    let child = c.with(&["code"]);
    assert_eq!(child.description().labels().canonical(), "code=unknown");
    assert!(child.ptr_eq(&c.with(&["code", "unknown"])));
}

#[test]
fn collect_emits_root_until_children_exist() {
    let c = Counter::new("hits", "", NO_LABELS);
    c.add(2.0);

    let mut out: Vec<Arc<dyn Metric>> = Vec::new();
    c.collect(&mut out);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].measure().unwrap().scalar(), Some(2.0));

    c.with(&["code", "200"]).inc();
    c.with(&["code", "500"]).add(3.0);

    let mut out: Vec<Arc<dyn Metric>> = Vec::new();
    c.collect(&mut out);
    let mut measures: Vec<Measure> = out
        .iter()
        .map(|m| Measure::from_metric(m.as_ref()).unwrap())
        .collect();
    sort_measures(&mut measures);

    assert_eq!(measures.len(), 2);
    assert_eq!(measures[0].description.labels().canonical(), "code=200");
    assert_eq!(measures[0].value.scalar(), Some(1.0));
    assert_eq!(measures[1].description.labels().canonical(), "code=500");
    assert_eq!(measures[1].value.scalar(), Some(3.0));
}

#[test]
fn describe_advertises_only_the_root() {
    let t = Timer::new("op", "", &["kind", "db"]);
    t.with(&["table", "a"]);
    t.with(&["table", "b"]);

    let mut out: Vec<Arc<Description>> = Vec::new();
    t.describe(&mut out);
    t.describe(&mut out);

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].id(), t.description().id());
    assert_eq!(out[0].id(), out[1].id());
}

#[test]
fn histogram_children_start_empty() {
    let h = Histogram::new("size", "", NO_LABELS);
    h.add(5.0);
    h.add(6.0);

    let child = h.with(&["bucket", "x"]);
    assert_eq!(child.count(), 0);
    assert_eq!(child.quantiles(), h.quantiles());

    child.add(1.0);
    assert_eq!(h.count(), 2);
}
