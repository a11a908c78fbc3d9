//! Core module - metric derivation, record storage and configuration

pub mod clock;
pub mod config;
pub mod metrics;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use metrics::{compute_incline, estimate_capacity, DerivedMetrics, Measurements, MetricError};
pub use store::{
    BathtubRecord, BathtubStore, BathtubUpdate, CorruptRecord, Field, Listing, StoreError,
};
