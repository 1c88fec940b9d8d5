//! # Equivalent Current
//!
//! A degraded stack draws more power at the same current, so the BOL current
//! for a given input overshoots the supply. The correction is one shot:
//!
//! ```text
//! P_cons  = max(I_bol · (V_bol + V_deg) · N / 1000, P_in) · status
//! P_equiv = P_in − (P_cons − P_in)
//! I_equiv = max(curve(P_equiv), 0)
//! ```
//!
//! and the cell voltage at the corrected current is `V(I_equiv) + V_deg`.
//! There is no iteration to a fixed point.

use super::cell::CellModel;
use super::characteristic_curve::CharacteristicCurve;
use crate::domain::ClusterStatus;

/// Corrected operating point of one stack at one timestep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquivalentCurrent {
    pub current_a: f64,
    /// Cell voltage including degradation (V)
    pub cell_voltage_v: f64,
    /// Power the degraded stack would draw at the BOL current (kW)
    pub initial_power_consumed_kw: f64,
    /// Power fed back through the curve (kW)
    pub equivalent_power_kw: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct EquivalentCurrentCorrector<'a> {
    curve: &'a CharacteristicCurve,
    cell: &'a CellModel,
    n_cells: u32,
}

impl<'a> EquivalentCurrentCorrector<'a> {
    pub fn new(curve: &'a CharacteristicCurve, cell: &'a CellModel, n_cells: u32) -> Self {
        Self {
            curve,
            cell,
            n_cells,
        }
    }

    pub fn correct(
        &self,
        power_in_kw: f64,
        bol_current_a: f64,
        bol_voltage_v: f64,
        degradation_v: f64,
        status: ClusterStatus,
    ) -> EquivalentCurrent {
        let cells = f64::from(self.n_cells);
        let degraded_kw = bol_current_a * (bol_voltage_v + degradation_v) * cells / 1000.0;
        let initial_power_consumed_kw = degraded_kw.max(power_in_kw) * status.factor();
        let error_kw = initial_power_consumed_kw - power_in_kw;
        let equivalent_power_kw = power_in_kw - error_kw;

        let current_a = if status.is_on() {
            self.curve.current(equivalent_power_kw).max(0.0)
        } else {
            0.0
        };
        let cell_voltage_v = self.cell.voltage(self.curve.temperature_c(), current_a) + degradation_v;

        EquivalentCurrent {
            current_a,
            cell_voltage_v,
            initial_power_consumed_kw,
            equivalent_power_kw,
        }
    }
}
