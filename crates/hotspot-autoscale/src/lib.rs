//! hotspot-autoscale: forecast-driven capacity scaling.
//!
//! In autoscale mode every forecast carries a recommended replica count.
//! The [`ElasticScaler`] turns that recommendation into a scaling action
//! against an external managed cluster through an injected callback.
//!
//! # Decision
//!
//! ```text
//! target = clamp(recommended, min_replicas, max_replicas)
//!
//! if target == last applied:          NoChange
//! if last attempt < cooldown ago:     NoChange
//! otherwise:                          ScaleTo(target)
//! ```

pub mod scaler;

pub use scaler::{BoxFuture, ElasticScaler, ScaleCallback, ScaleDecision};
