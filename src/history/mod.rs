//! Ranking history: hour-bucketed snapshots and point-delta computation.
//!
//! This module owns the tracker's durable state and the arithmetic over it:
//! - Bucket keys (`YYYYMMDDHH`) and hour arithmetic
//! - The per-region snapshot store with overwrite-on-ingest semantics
//! - Name normalization applied before storage
//! - Delta computation over arbitrary lookback windows

pub mod bucket;
pub mod delta;
pub mod normalize;
pub mod store;

pub use bucket::BucketKey;
pub use delta::{clean_point_text, compute_deltas, parse_points, DeltaResult};
pub use normalize::NameMap;
pub use store::{RankingEntry, SnapshotStore};
