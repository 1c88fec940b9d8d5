//! # Hydrogen Production
//!
//! Faraday's law turns stack current into hydrogen:
//!
//! ```text
//! ṅ_H2 = η · N_cells · I / (2F)        (mol/s)
//! ```
//!
//! The production model also owns the derived per-stack figures: water
//! demand, HHV efficiency, specific energy and the beginning-of-life
//! efficiency curve used for end-of-life thresholds.

use super::cell::{CellModel, FARADAY};
use super::characteristic_curve::CharacteristicCurve;
use super::efficiency::EfficiencyChain;
use crate::domain::{ClusterConfig, OperatingPoint, MIN_LOAD_FRACTION};

/// Higher heating value of hydrogen (kWh/kg)
pub const HHV_KWH_PER_KG: f64 = 39.41;
/// Conversion from mol/s to g/s (divide by this)
const MOL_PER_GRAM_H2: f64 = 0.49606;
/// Water consumed per kg of hydrogen (kg)
pub const WATER_KG_PER_KG_H2: f64 = 10.0;
pub const KG_PER_GALLON_WATER: f64 = 3.79;
/// Load points of the BOL efficiency curve, as tenths of stack rating
const BOL_CURVE_POINTS: u32 = 10;

#[derive(Debug)]
pub struct ProductionModel {
    n_cells: u32,
    timestep_s: f64,
    efficiency: EfficiencyChain,
}

impl ProductionModel {
    pub fn new(config: &ClusterConfig, efficiency: EfficiencyChain) -> Self {
        Self {
            n_cells: config.n_cells,
            timestep_s: config.timestep_s,
            efficiency,
        }
    }

    pub fn efficiency_chain(&self) -> &EfficiencyChain {
        &self.efficiency
    }

    /// Hydrogen from one stack over one timestep (kg)
    pub fn stack_h2_kg(&self, current_a: f64) -> f64 {
        if current_a <= 0.0 {
            return 0.0;
        }
        let eta = self.efficiency.efficiency(current_a);
        let mol_per_s = eta * f64::from(self.n_cells) * current_a / (2.0 * FARADAY);
        let g_per_s = mol_per_s / MOL_PER_GRAM_H2;
        g_per_s * self.timestep_s / 1000.0
    }

    /// Hydrogen from `stacks` identical stacks over one timestep (kg)
    pub fn cluster_h2_kg(&self, current_a: f64, stacks: u32) -> f64 {
        self.stack_h2_kg(current_a) * f64::from(stacks)
    }

    pub fn water_kg(h2_kg: f64) -> f64 {
        WATER_KG_PER_KG_H2 * h2_kg
    }

    pub fn water_gal(water_kg: f64) -> f64 {
        water_kg / KG_PER_GALLON_WATER
    }

    /// Energy delivered at constant `power_kw` over one timestep (kWh)
    pub fn energy_kwh(&self, power_kw: f64) -> f64 {
        power_kw * self.timestep_s / 3600.0
    }

    /// HHV efficiency (fraction); 0 when no energy went in
    pub fn system_efficiency(&self, h2_kg: f64, power_kw: f64) -> f64 {
        let energy = self.energy_kwh(power_kw);
        if energy <= 0.0 {
            return 0.0;
        }
        HHV_KWH_PER_KG * h2_kg / energy
    }

    /// Specific energy (kWh/kg); 0 when nothing was produced
    pub fn kwh_per_kg(&self, power_kw: f64, h2_kg: f64) -> f64 {
        if h2_kg <= 0.0 {
            return 0.0;
        }
        self.energy_kwh(power_kw) / h2_kg
    }

    /// Beginning-of-life operating point of one stack at `power_in_kw`
    pub fn operating_point(
        &self,
        curve: &CharacteristicCurve,
        cell: &CellModel,
        power_in_kw: f64,
    ) -> OperatingPoint {
        let temperature_c = curve.temperature_c();
        let current_a = curve.current(power_in_kw).max(0.0);
        let cell_voltage_v = cell.voltage(temperature_c, current_a);
        let power_consumed_kw = cell.stack_power_kw(temperature_c, current_a, self.n_cells);
        let h2_kg = self.stack_h2_kg(current_a);

        OperatingPoint {
            power_in_kw,
            current_a,
            cell_voltage_v,
            power_consumed_kw,
            h2_kg,
            kwh_per_kg: self.kwh_per_kg(power_in_kw, h2_kg),
            curve_error_kw: power_in_kw - power_consumed_kw,
        }
    }

    /// Operating points at 10 %, 20 % ... 100 % of stack rating
    pub fn bol_efficiency_curve(
        &self,
        curve: &CharacteristicCurve,
        cell: &CellModel,
        stack_rating_kw: f64,
    ) -> Vec<OperatingPoint> {
        (1..=BOL_CURVE_POINTS)
            .map(|k| {
                let fraction = f64::from(k) / f64::from(BOL_CURVE_POINTS);
                self.operating_point(curve, cell, fraction * stack_rating_kw)
            })
            .collect()
    }

    /// HHV efficiency (%) and specific energy (kWh/kg) at minimum stack load,
    /// where a PEM stack is most efficient
    pub fn max_efficiency(
        &self,
        curve: &CharacteristicCurve,
        cell: &CellModel,
        stack_rating_kw: f64,
    ) -> (f64, f64) {
        let point = self.operating_point(curve, cell, MIN_LOAD_FRACTION * stack_rating_kw);
        (
            100.0 * self.system_efficiency(point.h2_kg, point.power_in_kw),
            point.kwh_per_kg,
        )
    }
}

/// Delivered hydrogen over the rated maximum for the same period
pub fn capacity_factor(total_h2_kg: f64, rated_stack_h2_kg: f64, steps: usize, max_stacks: u32) -> f64 {
    let rated_total = rated_stack_h2_kg * steps as f64 * f64::from(max_stacks);
    if rated_total <= 0.0 {
        return 0.0;
    }
    total_h2_kg / rated_total
}
