#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant, SystemTime};

use telemeter_core::measure::percentile_field;
use telemeter_core::{
    Counter, Gauge, Histogram, Metric, MeasureValue, MetricType, TelemeterError, Timer, Untyped,
    DEFAULT_QUANTILES, NO_LABELS,
};

#[test]
fn counter_sums_concurrent_adds_exactly() {
    let c = Counter::new("requests_total", "Requests", NO_LABELS);

    std::thread::scope(|s| {
        for _ in 0..8 {
            let c = c.clone();
            s.spawn(move || {
                for _ in 0..1000 {
                    c.add(0.5);
                }
            });
        }
    });

    assert_eq!(c.count(), 4000.0);
    assert_eq!(c.sample_count(), 8000);
}

#[test]
fn counter_three_plus_four_is_seven() {
    let c = Counter::new("c", "", NO_LABELS);
    std::thread::scope(|s| {
        let a = c.clone();
        let b = c.clone();
        s.spawn(move || a.add(3.0));
        s.spawn(move || b.add(4.0));
    });
    assert_eq!(c.count(), 7.0);
}

#[test]
#[should_panic(expected = "can't be decreased")]
fn counter_rejects_negative_delta() {
    let c = Counter::new("c", "", NO_LABELS);
    c.add(-1.0);
}

#[test]
fn rejected_delta_is_not_applied() {
    let c = Counter::new("c", "", NO_LABELS);
    c.add(2.0);

    let res = catch_unwind(AssertUnwindSafe(|| c.add(-1.0)));
    assert!(res.is_err());
    assert_eq!(c.count(), 2.0);

    let err = c.try_add(f64::NAN).expect_err("nan must be rejected");
    assert!(matches!(err, TelemeterError::InvalidArgument(_)));
    assert_eq!(c.count(), 2.0);
}

#[test]
fn gauge_concurrent_add_sub_has_no_lost_updates() {
    let g = Gauge::new("inflight", "", NO_LABELS);
    g.set(100.0);

    std::thread::scope(|s| {
        for i in 0..8 {
            let g = g.clone();
            s.spawn(move || {
                for _ in 0..1000 {
                    if i % 2 == 0 {
                        g.inc();
                    } else {
                        g.sub(1.0);
                    }
                }
            });
        }
    });

    assert_eq!(g.value(), 100.0);
}

#[test]
fn gauge_set_races_end_on_a_serializable_value() {
    let g = Gauge::new("g", "", NO_LABELS);

    std::thread::scope(|s| {
        let a = g.clone();
        let b = g.clone();
        s.spawn(move || a.set(10.0));
        s.spawn(move || b.add(5.0));
    });

    // set-then-add = 15, add-then-set = 10
    let v = g.value();
    assert!(v == 15.0 || v == 10.0, "unexpected {v}");
}

#[test]
fn untyped_counts_every_mutation() {
    let u = Untyped::new("u", "", NO_LABELS);
    u.set(3.0);
    u.add(2.0);
    u.inc();
    u.dec();
    u.sub(1.0);

    assert_eq!(u.value(), 4.0);
    assert_eq!(u.sample_count(), 5);
    assert_eq!(
        u.measure().unwrap(),
        MeasureValue::Scalar { value: 4.0, sample_count: 5 }
    );
}

#[test]
fn description_is_shared_by_clones() {
    let g = Gauge::new("temp", "Temperature", &["room", "lab"]);
    let g2 = g.clone();

    let d = g.description();
    assert_eq!(d.name(), "temp");
    assert_eq!(d.help(), "Temperature");
    assert_eq!(d.kind(), MetricType::Gauge);
    assert_eq!(d.labels().canonical(), "room=lab");
    assert_eq!(d.id(), g2.description().id());
    assert!(g.ptr_eq(&g2));
}

#[test]
fn empty_histogram_summary_is_nan() {
    let h = Histogram::new("latency", "", NO_LABELS);
    let s = h.summary();

    assert_eq!(s.sample_count, 0);
    assert!(s.sample_sum.is_nan());
    assert!(s.sample_min.is_nan());
    assert!(s.sample_max.is_nan());
    assert!(s.sample_variance.is_nan());
    assert!(s.quantiles.iter().all(|(_, v)| v.is_nan()));
    assert!(s.finite_fields().is_empty());
}

#[test]
fn histogram_quantiles_default_and_custom() {
    let h = Histogram::with_quantiles("h", "", &[], NO_LABELS);
    assert_eq!(h.quantiles(), &DEFAULT_QUANTILES);

    let h = Histogram::with_quantiles("h", "", &[0.25], NO_LABELS);
    h.add(8.0);
    assert_eq!(h.quantile(0.5), 8.0);

    let s = h.summary();
    assert_eq!(s.quantiles, vec![(0.25, 8.0)]);
    let names: Vec<String> = s.finite_fields().into_iter().map(|(n, _)| n).collect();
    assert_eq!(
        names,
        vec!["sample_sum", "sample_min", "sample_max", "sample_variance", "p25"]
    );
}

#[test]
fn timer_records_seconds() {
    let t = Timer::new("op", "", NO_LABELS);
    t.update(Duration::from_millis(1500));

    assert_eq!(t.count(), 1);
    assert_eq!(t.quantile(0.5), 1.5);
    assert_eq!(t.description().kind(), MetricType::Timer);
}

#[test]
fn timer_clamps_future_start_to_zero() {
    let t = Timer::new("op", "", NO_LABELS);
    t.update_since(Instant::now() + Duration::from_secs(60));
    t.update_since_system(SystemTime::now() + Duration::from_secs(60));

    let s = t.summary();
    assert_eq!(s.sample_count, 2);
    assert_eq!(s.sample_min, 0.0);
    assert_eq!(s.sample_max, 0.0);
}

#[test]
fn timer_time_measures_since_construction() {
    let t = Timer::new("op", "", NO_LABELS);
    std::thread::sleep(Duration::from_millis(5));
    t.time();

    assert_eq!(t.count(), 1);
    assert!(t.quantile(0.5) >= 0.005);
}

#[test]
fn percentile_field_names() {
    assert_eq!(percentile_field(0.5), "p50");
    assert_eq!(percentile_field(0.9), "p90");
    assert_eq!(percentile_field(0.99), "p99");
    assert_eq!(percentile_field(0.999), "p99_9");
}
