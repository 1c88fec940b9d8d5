use serde::{Deserialize, Serialize};

use super::ClusterStatus;

/// Steady-state stack operating point at a given input power
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    /// Power sent to the stack (kW)
    pub power_in_kw: f64,
    /// Stack current from the characteristic curve (A)
    pub current_a: f64,
    /// Beginning-of-life cell voltage (V)
    pub cell_voltage_v: f64,
    /// Power the stack draws at that current and voltage (kW)
    pub power_consumed_kw: f64,
    /// Hydrogen produced by one stack over one timestep (kg)
    pub h2_kg: f64,
    /// Specific energy (kWh/kg)
    pub kwh_per_kg: f64,
    /// Characteristic curve error: power in minus power consumed (kW)
    pub curve_error_kw: f64,
}

/// Per-timestep outputs of one simulation run. All vectors share the length
/// of the input power series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterTimeSeries {
    /// External power as supplied (kW)
    pub input_power_kw: Vec<f64>,
    /// Input clamped to the cluster rating (kW)
    pub clamped_power_kw: Vec<f64>,
    /// Input above the cluster rating, discarded (kW)
    pub curtailed_power_kw: Vec<f64>,
    pub cluster_status: Vec<ClusterStatus>,
    pub stacks_on: Vec<u32>,
    pub power_per_stack_kw: Vec<f64>,
    /// Hydrogen multiplier for the startup loss (1.0 when not starting)
    pub startup_multiplier: Vec<f64>,

    /// Stack current from the characteristic curve before degradation (A)
    pub bol_stack_current_a: Vec<f64>,
    /// Stack current actually used for production (A)
    pub stack_current_a: Vec<f64>,
    /// Cell voltage at the BOL current without degradation (V)
    pub cell_voltage_bol_v: Vec<f64>,
    /// Cell voltage at the production current including degradation (V)
    pub cell_voltage_v: Vec<f64>,

    pub degradation_uptime_v: Vec<f64>,
    pub degradation_cycling_v: Vec<f64>,
    pub degradation_fatigue_v: Vec<f64>,
    /// Cumulative degradation, sum of the three mechanisms (V)
    pub degradation_v: Vec<f64>,
    /// On→off transitions per timestep
    pub off_cycles: Vec<u32>,

    /// Power a degraded stack would draw at the BOL current (kW per stack)
    pub initial_power_consumed_kw: Vec<f64>,
    /// Power target fed back through the curve for the equivalent current (kW per stack)
    pub equivalent_power_kw: Vec<f64>,

    /// Hydrogen without the startup loss (kg per timestep)
    pub h2_no_startup_kg: Vec<f64>,
    /// Hydrogen production (kg per timestep)
    pub h2_kg: Vec<f64>,
    pub water_kg: Vec<f64>,
    pub water_gal: Vec<f64>,
    /// HHV efficiency (fraction)
    pub efficiency: Vec<f64>,
    /// Specific energy (kWh/kg), 0 where nothing is produced
    pub kwh_per_kg: Vec<f64>,
    /// Cluster power consumption (kW)
    pub power_consumed_kw: Vec<f64>,
}

impl ClusterTimeSeries {
    pub fn len(&self) -> usize {
        self.input_power_kw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_power_kw.is_empty()
    }
}

/// Scalar aggregates of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    /// Power one stack consumes at rated input (kW)
    pub rated_stack_power_consumed_kw: f64,
    /// Hydrogen one stack produces per timestep at rated input (kg)
    pub rated_stack_h2_kg: f64,
    /// End-of-life degradation threshold (V)
    pub eol_degradation_v: f64,
    /// Hours until the stacks reach `eol_degradation_v`; `None` when the run
    /// accumulated no degradation
    pub hours_until_replacement: Option<f64>,
    pub lifetime_cluster_replacements: f64,
    pub capacity_factor: f64,
    pub total_h2_kg: f64,
    pub total_input_energy_kwh: f64,
    /// `None` when nothing was produced
    pub total_kwh_per_kg: Option<f64>,
    pub total_uptime_s: f64,
    pub total_off_cycles: u32,
    pub total_curtailed_energy_kwh: f64,
    pub final_degradation_v: f64,
    pub final_uptime_degradation_v: f64,
    pub final_cycling_degradation_v: f64,
    pub final_fatigue_degradation_v: f64,
    /// Fatigue degradation from one rainflow count over the whole run, off
    /// samples included (V)
    pub lifetime_fatigue_estimate_v: f64,
    /// HHV efficiency at minimum stack load (%)
    pub max_efficiency_percent: f64,
    /// Specific energy at minimum stack load (kWh/kg)
    pub max_efficiency_kwh_per_kg: f64,
    pub curve_coefficients: [f64; 5],
}

/// Everything one `run()` produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub series: ClusterTimeSeries,
    pub summary: SimulationSummary,
    /// Beginning-of-life efficiency at 10 %..100 % of stack rating
    pub bol_efficiency_curve: Vec<OperatingPoint>,
}
