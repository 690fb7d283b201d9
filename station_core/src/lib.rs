#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Telemetry pipeline (hardware-agnostic).
//!
//! This crate provides the acquisition-filter-inference pipeline of the
//! node. Sensors, the network link and power control are reached only
//! through the `station_traits` seams.
//!
//! ## Architecture
//!
//! - **Aggregation**: bounded sampling, IQR outlier filter, mean, fallback
//!   to the last valid reading (`aggregation`, `stats`)
//! - **Trend**: six-slot pressure history (`trend`)
//! - **Inference**: dew point / absolute humidity, linear rain model,
//!   comfort bands, alerts, forecast text (`derived`, `predictor`,
//!   `comfort`, `alerts`, `classifier`)
//! - **Report**: immutable cycle report and its wire form (`report`)
//! - **Orchestration**: one-cycle `Station`, retrying upload, fault-isolating
//!   loop with a stop signal (`station`, `upload`, `runner`)
//!
//! Undetermined values are `None` end to end and serialize as `null`.

pub mod aggregation;
pub mod alerts;
pub mod classifier;
pub mod comfort;
pub mod config;
pub mod conversions;
pub mod derived;
pub mod error;
pub mod link_error;
pub mod predictor;
pub mod report;
pub mod runner;
pub mod state;
pub mod station;
pub mod stats;
pub mod trend;
pub mod upload;
pub mod util;

pub use aggregation::{Reading, SensorAggregate};
pub use alerts::Alert;
pub use config::{BandId, ComfortBand, CooldownMode, ModelCfg, StationCfg};
pub use derived::DerivedMetrics;
pub use error::{BuildError, StationError};
pub use report::{UploadPayload, WeatherReport};
pub use runner::{RunSummary, StopSignal};
pub use station::{CycleOutcome, Station};
pub use upload::Delivery;
