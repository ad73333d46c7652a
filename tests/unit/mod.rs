//! Unit test modules.

mod critical_power_test;
mod curve_merge_test;
mod fitness_trend_test;
mod metrics_test;
mod normalizer_test;
mod zones_test;
