//! Hazard HMI - alarm and spike lifecycle engine for a simulated gas-hazard
//! facility.
//!
//! # Overview
//!
//! Detectors around a pharmaceutical plant report gas readings. Each reading
//! is classified against a two-level threshold policy (WARN / ALARM, high or
//! low trip). An operator can raise a scripted spike in a room, which plays
//! out a fixed mitigation sequence: detection, rising concentration, alarm
//! and shutter closure, isolation, ventilation, recovery.
//!
//! Classification and lifecycle math are pure functions of the reading, the
//! spike and the clock. The only mutable state is the single active-spike
//! slot in [`session`].
//!
//! # Modules
//!
//! - [`model`]: Gas kinds, thresholds, statuses, phases and request types
//! - [`error`]: Error taxonomy
//! - [`policy`]: Threshold classification
//! - [`spike`]: Spike events and their lifecycle
//! - [`notify`]: Milestone messages for a spike
//! - [`session`]: The active-spike register
//! - [`facility`]: Rooms, detectors and layout
//! - [`simulator`]: Synthetic baseline readings
//! - [`snapshot`]: Per-tick evaluation of the whole facility
//! - [`config`]: Start-up configuration
//! - [`api`]: HTTP API handlers

pub mod api;
pub mod config;
pub mod error;
pub mod facility;
pub mod model;
pub mod notify;
pub mod policy;
pub mod session;
pub mod simulator;
pub mod snapshot;
pub mod spike;
