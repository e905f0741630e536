//! Core library for the LiveOnSaba rental marketplace service.
//!
//! The interesting logic lives in [`marketplace`]: session verification,
//! role/ownership authorization, suspension-aware listing visibility, the
//! listing query pipeline, and the atomic mutation batches. Persistence and
//! identity are external collaborators reached through the traits in
//! [`marketplace::store`] and [`marketplace::auth`].

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
