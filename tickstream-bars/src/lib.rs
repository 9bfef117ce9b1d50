#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms,
    rust_2024_compatibility
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! # Tickstream-Bars
//!
//! The stateful Bar Builder: per-product [`state::BarState`], the tick-imbalance ([`tick_imbalance`]),
//! volume ([`volume`]) and wall-clock time ([`time`]) threshold algorithms, the derived-feature
//! registry ([`feature`]), the [`snowflake::SnowflakeGenerator`] id allocator for volume bars, and
//! the [`engine::BarEngine`] streaming runtime that drives them off a [`tickstream_bus`] topic
//! pair.

pub mod aggregation;
pub mod bar;
pub mod engine;
pub mod error;
pub mod feature;
pub mod snowflake;
pub mod state;
pub mod tick_imbalance;
pub mod time;
pub mod volume;

pub use aggregation::Aggregation;
pub use bar::{Bar, BarType};
pub use engine::BarEngine;
pub use error::{EngineError, StateError};
pub use feature::{DerivedFeatures, FeatureKind, FeatureRegistry};
pub use snowflake::SnowflakeGenerator;
pub use state::BarState;
