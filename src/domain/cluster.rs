use serde::{Deserialize, Serialize};
use validator::Validate;

/// Literature end-of-life degradation threshold (V) used when no target
/// efficiency loss is configured.
pub const DEFAULT_EOL_DEGRADATION_V: f64 = 0.7212;

/// Fraction of rated capacity below which the cluster (or a stack) is off.
pub const MIN_LOAD_FRACTION: f64 = 0.1;

/// Physical and operational configuration of an electrolyzer cluster.
///
/// Every stack in the cluster is identical; the cluster is switched on and off
/// as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ClusterConfig {
    /// Number of stacks in the cluster
    #[validate(range(min = 1))]
    pub max_stacks: u32,

    /// Rated DC power of one stack (kW)
    #[validate(range(exclusive_min = 0.0))]
    pub stack_rating_kw: f64,

    /// Active area of one cell (cm²)
    #[validate(range(exclusive_min = 0.0))]
    pub cell_active_area_cm2: f64,

    /// Cells connected in series per stack
    #[validate(range(min = 1))]
    pub n_cells: u32,

    /// Membrane thickness (cm) - 180 µm by default
    #[validate(range(exclusive_min = 0.0))]
    pub membrane_thickness_cm: f64,

    /// Maximum current density (A/cm²) - PEM cells sit around 2 A/cm²
    #[validate(range(exclusive_min = 0.0))]
    pub max_current_density_a_cm2: f64,

    /// Stack operating temperature (°C)
    #[validate(range(min = 40.0, exclusive_max = 100.0))]
    pub operating_temperature_c: f64,

    /// Plant lifetime (years)
    #[validate(range(min = 0.0))]
    pub plant_life_years: f64,

    /// Simulation timestep (s)
    #[validate(range(exclusive_min = 0.0))]
    pub timestep_s: f64,

    #[validate(nested)]
    pub degradation: DegradationConfig,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_stacks: 1,
            stack_rating_kw: 1000.0,
            cell_active_area_cm2: 1920.0,
            n_cells: 130,
            membrane_thickness_cm: 0.018,
            max_current_density_a_cm2: 2.0,
            operating_temperature_c: 80.0,
            plant_life_years: 30.0,
            timestep_s: 3600.0,
            degradation: DegradationConfig::default(),
        }
    }
}

impl ClusterConfig {
    /// Cluster of `max_stacks` default stacks
    pub fn with_stacks(max_stacks: u32) -> Self {
        Self {
            max_stacks,
            ..Default::default()
        }
    }

    /// Cluster with all degradation mechanisms and the penalty switched off
    pub fn without_degradation(mut self) -> Self {
        self.degradation = DegradationConfig::disabled();
        self
    }

    /// Maximum current through one cell (A)
    pub fn max_cell_current_a(&self) -> f64 {
        self.max_current_density_a_cm2 * self.cell_active_area_cm2
    }

    /// Lowest current sampled when building the characteristic curve (A)
    pub fn min_cell_current_a(&self) -> f64 {
        MIN_LOAD_FRACTION * self.max_cell_current_a()
    }

    /// Rated power of the whole cluster (kW)
    pub fn cluster_rating_kw(&self) -> f64 {
        f64::from(self.max_stacks) * self.stack_rating_kw
    }

    /// Input power at or above which the cluster switches on (kW)
    pub fn min_cluster_power_kw(&self) -> f64 {
        MIN_LOAD_FRACTION * self.cluster_rating_kw()
    }

    pub fn plant_life_hours(&self) -> f64 {
        self.plant_life_years * 8760.0
    }

    pub fn timestep_hours(&self) -> f64 {
        self.timestep_s / 3600.0
    }
}

/// Degradation model switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DegradationConfig {
    /// Correct stack current for the degraded voltage (equivalent current)
    pub include_penalty: bool,
    /// Steady-state degradation while the cluster is on
    pub uptime: bool,
    /// Degradation per on→off transition
    pub cycling: bool,
    /// Load-fatigue degradation from rainflow-counted voltage swings
    pub fatigue: bool,
    /// Target increase (%) of rated kWh/kg at end of life. When unset the
    /// literature threshold of 0.7212 V is used.
    #[validate(range(exclusive_min = 0.0))]
    pub eol_efficiency_loss_percent: Option<f64>,
}

impl Default for DegradationConfig {
    fn default() -> Self {
        Self {
            include_penalty: true,
            uptime: true,
            cycling: true,
            fatigue: true,
            eol_efficiency_loss_percent: None,
        }
    }
}

impl DegradationConfig {
    pub fn disabled() -> Self {
        Self {
            include_penalty: false,
            uptime: false,
            cycling: false,
            fatigue: false,
            eol_efficiency_loss_percent: None,
        }
    }

    pub fn any_mechanism(&self) -> bool {
        self.uptime || self.cycling || self.fatigue
    }

    /// The equivalent-current correction only runs when it has a penalty to
    /// correct for.
    pub fn corrects_current(&self) -> bool {
        self.include_penalty && self.any_mechanism()
    }
}
