//! End-to-end scenarios against the registry surface.

use std::sync::Arc;
use std::time::Duration;

use metron::{Clock, MetricKind, Registry, ReservoirConfig, Summary};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn counter_round_trip() {
    let registry = Registry::new();
    let counter = registry.new_counter("c").unwrap();

    counter.notify(10).unwrap();
    counter.notify(-3).unwrap();

    assert_eq!(counter.get(), Summary::Counter { value: 7 });
}

#[test]
fn histogram_sampling_is_bounded_and_deterministic() {
    let sample = |seed: u64| {
        let registry = Registry::builder().seed(seed).build();
        let histogram = registry
            .new_histogram_with("h", ReservoirConfig::Uniform { size: 4 })
            .unwrap();
        for value in 1..=8 {
            histogram.notify(value).unwrap();
        }

        let summary = histogram.get();
        let stats = summary.as_histogram().unwrap().clone();
        assert_eq!(stats.n, 4);
        assert!(stats.min >= 1.0);
        assert!(stats.max <= 8.0);
        stats
    };

    assert_eq!(sample(99), sample(99));
}

#[test]
fn histogram_summary_statistics() {
    let registry = Registry::new();
    let histogram = registry.new_histogram("h").unwrap();
    for value in [1.0, 2.0, 3.0] {
        histogram.notify(value).unwrap();
    }

    let summary = histogram.get();
    let stats = summary.as_histogram().unwrap();

    assert_eq!(stats.n, 3);
    assert_eq!(stats.min, 1.0);
    assert_eq!(stats.max, 3.0);
    assert_close(stats.arithmetic_mean, 2.0);
    assert_close(stats.median, 2.0);
    assert_close(stats.variance, 1.0);
    assert_close(stats.standard_deviation, 1.0);
    assert_close(stats.skewness, 0.0);
    assert_close(stats.kurtosis, -2.3333333333333335);
    assert_close(stats.harmonic_mean, 1.6363636363636365);
    assert_close(stats.geometric_mean, 1.8171205928321397);
    assert_eq!(stats.histogram, vec![(3.0, 3.0), (5.0, 0.0)]);
}

#[test]
fn meter_rates_under_a_controlled_clock() {
    let (clock, mock) = Clock::mock();
    let registry = Registry::builder().clock(clock).build();
    let meter = registry.new_meter("m").unwrap();

    for _ in 0..5 {
        mock.increment(Duration::from_millis(200));
        meter.notify(1).unwrap();
    }

    mock.increment(Duration::from_micros(4_000_100));
    match meter.get() {
        Summary::Meter { count, one, .. } => {
            assert_eq!(count, 5);
            assert_close(one, 1.0 - (-5.0 / 60.0f64).exp());
        }
        other => panic!("expected a meter summary, got {:?}", other),
    }
}

#[test]
fn deleting_a_metric_detaches_its_tags() {
    let registry = Registry::new();
    registry.new_histogram("h").unwrap();
    registry.tag("h", "g").unwrap();

    registry.delete("h").unwrap();
    assert!(registry.tags().is_empty());
}

#[test]
fn dynamic_creation_from_wire_configuration() {
    let registry = Registry::new();

    // The shape a dynamic caller (e.g. an HTTP surface) would submit.
    let config: ReservoirConfig =
        serde_json::from_str(r#"{"type": "sliding_time", "window_secs": 30}"#).unwrap();
    let kind: MetricKind = "histogram".parse().unwrap();

    let metric = registry.create(kind, "h", Some(config)).unwrap();
    metric.notify(2.5).unwrap();

    let encoded = serde_json::to_value(metric.get()).unwrap();
    assert_eq!(encoded["kind"], "histogram");
    assert_eq!(encoded["n"], 1);
}

#[test]
fn summaries_are_json_safe() {
    let (clock, _mock) = Clock::mock();
    let registry = Registry::builder().clock(clock).build();

    registry.new_counter("c").unwrap();
    registry.new_gauge("g").unwrap();
    registry.new_histogram("h").unwrap();
    registry.new_meter("m").unwrap();

    registry.notify("c", 1).unwrap();
    registry.notify("g", "blue").unwrap();
    registry.notify("h", 2.5).unwrap();
    registry.notify("m", 1).unwrap();

    let encoded = serde_json::to_value(registry.snapshot()).unwrap();

    assert_eq!(encoded["c"]["kind"], "counter");
    assert_eq!(encoded["c"]["value"], 1);
    assert_eq!(encoded["g"]["kind"], "gauge");
    assert_eq!(encoded["g"]["value"], "blue");
    assert_eq!(encoded["h"]["kind"], "histogram");
    assert_eq!(encoded["h"]["n"], 1);
    assert_eq!(encoded["m"]["kind"], "meter");
    assert_eq!(encoded["m"]["count"], 1);
}

#[test]
fn unknown_names_and_duplicates_are_reported() {
    let registry = Registry::new();

    assert!(registry.get("missing").is_err());

    registry.new_counter("x").unwrap();
    let again = registry.new_counter("x").unwrap();
    again.notify(1).unwrap();

    assert!(registry.new_gauge("x").is_err());
    assert_eq!(registry.get("x").unwrap(), Summary::Counter { value: 1 });
}

#[test]
fn parallel_notify_traffic_is_not_lost() {
    let registry = Arc::new(Registry::new());
    let counter = registry.new_counter("hits").unwrap();
    let histogram = registry
        .new_histogram_with("latency", ReservoirConfig::SlidingWindow { size: 64 })
        .unwrap();

    crossbeam_utils::thread::scope(|s| {
        for worker in 0..4 {
            let registry = Arc::clone(&registry);
            s.spawn(move |_| {
                for i in 0..1000 {
                    registry.notify("hits", 1).unwrap();
                    registry.notify("latency", (worker * 1000 + i) as f64).unwrap();
                }
            });
        }

        // A reader racing the writers must always observe a consistent
        // bounded sample.
        let registry = Arc::clone(&registry);
        s.spawn(move |_| {
            for _ in 0..50 {
                let group = registry.snapshot();
                let stats = group["latency"].as_histogram().unwrap().clone();
                assert!(stats.n <= 64);
            }
        });
    })
    .unwrap();

    assert_eq!(counter.raw(), 4000);
    assert_eq!(histogram.reservoir().count(), 4000);
    assert_eq!(histogram.raw().len(), 64);
}

#[test]
fn sliding_time_histograms_forget_under_the_shared_clock() {
    let (clock, mock) = Clock::mock();
    let registry = Registry::builder().clock(clock).build();

    let histogram = registry
        .new_histogram_with("h", ReservoirConfig::SlidingTime { window_secs: 30.0 })
        .unwrap();

    histogram.notify(1.0).unwrap();
    mock.increment(Duration::from_secs(10));
    histogram.notify(2.0).unwrap();

    assert_eq!(histogram.get().as_histogram().unwrap().n, 2);

    mock.increment(Duration::from_secs(25));
    let stats = histogram.get();
    let stats = stats.as_histogram().unwrap();
    assert_eq!(stats.n, 1);
    assert_eq!(stats.min, 2.0);
}
