//! Minimal run-time metrics sink.
//!
//! No exporter is bundled; the host process registers a plain callback that
//! receives name/value pairs for every counter, gauge and histogram update.

use crate::constants::*;
use metrics::{
    describe_counter, describe_gauge, Counter, Gauge, Histogram, Key, KeyName, Recorder,
    SharedString, Unit,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Signature for external collectors.
pub type StatsCallback = fn(name: &str, value: u64);

static CALLBACK: OnceCell<StatsCallback> = OnceCell::new();

/// Register the collector. Only the first registration sticks.
pub fn register_stats_callback(cb: StatsCallback) -> bool {
    CALLBACK.set(cb).is_ok()
}

#[inline]
fn forward(key: &Key, value: u64) {
    if let Some(cb) = CALLBACK.get() {
        cb(key.name(), value);
    }
}

/// Forwarding recorder. Uses the callback **if** it was registered.
struct CallbackRecorder;

#[derive(Clone)]
struct CallbackCounter {
    key: Key,
}
#[derive(Clone)]
struct CallbackGauge {
    key: Key,
}
#[derive(Clone)]
struct CallbackHistogram {
    key: Key,
}

impl Recorder for CallbackRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &metrics::Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(CallbackCounter { key: key.clone() }))
    }
    fn register_gauge(&self, key: &Key, _metadata: &metrics::Metadata<'_>) -> Gauge {
        Gauge::from_arc(Arc::new(CallbackGauge { key: key.clone() }))
    }
    fn register_histogram(&self, key: &Key, _metadata: &metrics::Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(CallbackHistogram { key: key.clone() }))
    }
}

impl metrics::CounterFn for CallbackCounter {
    fn increment(&self, value: u64) {
        forward(&self.key, value);
    }
    fn absolute(&self, value: u64) {
        forward(&self.key, value);
    }
}
impl metrics::GaugeFn for CallbackGauge {
    fn set(&self, value: f64) {
        forward(&self.key, value as u64);
    }
    // the callback only carries absolute readings; relative moves are dropped
    fn increment(&self, _value: f64) {}
    fn decrement(&self, _value: f64) {}
}
impl metrics::HistogramFn for CallbackHistogram {
    fn record(&self, value: f64) {
        forward(&self.key, value as u64);
    }
}

/// Install exactly **once** – called when a table is created.
pub fn init() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        // another recorder may already own the global slot; that is fine
        let _ = metrics::set_global_recorder(CallbackRecorder);
        describe_counter!(METRIC_INSERTS, "Routes inserted into the trie");
        describe_counter!(METRIC_AGGREGATIONS, "Sibling pairs collapsed into their parent");
        describe_counter!(METRIC_LOOKUPS, "Longest-prefix-match lookups");
        describe_counter!(METRIC_LOOKUP_MISSES, "Lookups that found no route");
        describe_counter!(METRIC_WITHDRAWALS, "Routes removed by withdraw");
        describe_gauge!(METRIC_NODES, "Live trie nodes including the root");
        describe_gauge!(METRIC_ROUTES, "Stored routes, best and alternatives");
    });
}
