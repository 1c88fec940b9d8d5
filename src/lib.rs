//! PEM electrolyzer cluster simulator.
//!
//! Simulates hydrogen production, stack degradation and replacement needs of
//! a cluster of identical PEM stacks driven by an external power signal.

pub mod config;
pub mod controller;
pub mod domain;
pub mod optimizer;
pub mod simulation;
pub mod telemetry;
