//! # Electrolyzer Simulation Module
//!
//! Physics and bookkeeping for a cluster of identical PEM electrolyzer stacks.
//!
//! ## Components
//!
//! - **Cell**: Reversible, activation and ohmic voltage of one cell
//! - **Characteristic curve**: Fitted stack current as a function of stack power
//! - **Degradation**: Uptime, on/off cycling and rainflow fatigue penalties
//! - **Equivalent current**: One-shot current correction for the degraded voltage
//! - **Production**: Hydrogen, water, efficiency and the BOL efficiency curve
//! - **Replacement**: End-of-life threshold and replacement extrapolation
//! - **Engine**: Runs a power series through all of the above
//!
//! ## Usage
//!
//! ```rust
//! use pem_cluster_sim::domain::ClusterConfig;
//! use pem_cluster_sim::simulation::ClusterSimulationEngine;
//!
//! let engine = ClusterSimulationEngine::new(ClusterConfig::with_stacks(4))?;
//!
//! // One day of hourly input power (kW)
//! let power: Vec<f64> = (0..24).map(|h| if h < 8 { 300.0 } else { 3500.0 }).collect();
//! let result = engine.run(&power)?;
//!
//! println!("H2: {:.1} kg", result.summary.total_h2_kg);
//! # Ok::<(), pem_cluster_sim::domain::SimulationError>(())
//! ```

pub mod cell;
pub mod characteristic_curve;
pub mod degradation;
pub mod efficiency;
pub mod engine;
pub mod equivalent_current;
pub mod production;
pub mod rainflow;
pub mod replacement;

pub use cell::{CellModel, VoltageBreakdown};
pub use characteristic_curve::{CharacteristicCurve, CurveSample};
pub use degradation::{DegradationAccumulator, DegradationMechanism, DegradationProfile};
pub use efficiency::{
    EfficiencyChain, EfficiencyFactor, FaradaicEfficiency, ThermoNeutralEfficiency,
};
pub use engine::ClusterSimulationEngine;
pub use equivalent_current::{EquivalentCurrent, EquivalentCurrentCorrector};
pub use production::ProductionModel;
pub use replacement::ReplacementSchedule;
