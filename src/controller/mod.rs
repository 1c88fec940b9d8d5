//! Cluster dispatch: supply clamping, on/off design and startup losses.

pub mod dispatch;

pub use dispatch::{ClusterDispatchPolicy, DispatchPlan, STARTUP_TIME_S};
