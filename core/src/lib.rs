//! The pingsweep probing engine.
//!
//! [`sweep::SweepService`] is the entry point: it resolves the local
//! interface, enumerates the subnet and drives the [`engine`] which fans the
//! host addresses out to a fixed pool of [`probe::Prober`] workers.

pub mod engine;
pub mod probe;
pub mod sweep;
