//! Stack replacement extrapolation.
//!
//! The run's average degradation rate is extended linearly until the
//! end-of-life threshold is reached.

use serde::{Deserialize, Serialize};

use crate::domain::{DegradationConfig, OperatingPoint, SimulationError, DEFAULT_EOL_DEGRADATION_V};

/// End-of-life degradation threshold (V).
///
/// With a target efficiency loss, the threshold is the extra cell voltage
/// that raises the rated specific energy by that percentage.
pub fn eol_degradation_v(
    degradation: &DegradationConfig,
    rated: &OperatingPoint,
    n_cells: u32,
    timestep_hours: f64,
) -> Result<f64, SimulationError> {
    let Some(percent) = degradation.eol_efficiency_loss_percent else {
        return Ok(DEFAULT_EOL_DEGRADATION_V);
    };

    let eol_kwh_per_kg = rated.kwh_per_kg * (1.0 + percent / 100.0);
    let eol_power_kw = eol_kwh_per_kg * rated.h2_kg / timestep_hours;
    let eol_voltage_v = eol_power_kw * 1000.0 / (f64::from(n_cells) * rated.current_a);
    let d_eol = eol_voltage_v - rated.cell_voltage_v;

    if d_eol.is_finite() && d_eol > 0.0 {
        Ok(d_eol)
    } else {
        Err(SimulationError::InvalidEndOfLife(d_eol))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplacementSchedule {
    /// Operating hours until end of life; `None` without degradation
    pub hours_until_replacement: Option<f64>,
    pub lifetime_replacements: f64,
}

impl ReplacementSchedule {
    /// Extrapolate `final_degradation_v`, reached after `simulated_hours`,
    /// to the threshold `eol_degradation_v`.
    pub fn extrapolate(
        final_degradation_v: f64,
        eol_degradation_v: f64,
        simulated_hours: f64,
        plant_life_hours: f64,
    ) -> Self {
        if final_degradation_v <= 0.0 || simulated_hours <= 0.0 {
            return Self {
                hours_until_replacement: None,
                lifetime_replacements: 0.0,
            };
        }

        let hours = eol_degradation_v / final_degradation_v * simulated_hours;
        Self {
            hours_until_replacement: Some(hours),
            lifetime_replacements: plant_life_hours / hours,
        }
    }
}
