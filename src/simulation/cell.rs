//! # PEM Cell Electrochemical Model
//!
//! Steady-state polarization curve of a single low-temperature PEM cell:
//!
//! V_cell = E_rev + V_act + V_ohm
//!
//! Where:
//! - E_rev = reversible (open-circuit) voltage from the Nernst equation, with
//!   water vapor pressure from the Antoine equation
//! - V_act = anode + cathode activation overpotential (Butler-Volmer, asinh form)
//! - V_ohm = i * (R_membrane + R_electronic), membrane resistance from a
//!   temperature and water-content dependent proton conductivity
//!
//! The model is a pure function of temperature and current. Callers must keep
//! the current non-negative and finite; the dispatch policy clamps input power
//! before anything reaches this module.

use serde::{Deserialize, Serialize};

use crate::domain::ClusterConfig;

/// Faraday constant (C/mol)
pub const FARADAY: f64 = 96485.34;
/// Ideal gas constant (J/mol·K)
pub const GAS_CONSTANT: f64 = 8.314;

const KELVIN_OFFSET: f64 = 273.15;
/// Reversible potential at 25 °C and 1 atm (V)
const E_REV_STANDARD: f64 = 1.229;

// Antoine coefficients for water, T in °C, pressure in mmHg
const ANTOINE_A: f64 = 8.07131;
const ANTOINE_B: f64 = 1730.63;
const ANTOINE_C: f64 = 233.426;
const MMHG_TO_PA: f64 = 133.322;
const ATMOSPHERE_PA: f64 = 101_325.0;

const ANODE_CHARGE_TRANSFER: f64 = 2.0;
const CATHODE_CHARGE_TRANSFER: f64 = 0.5;
/// Exchange current densities (A/cm²)
const ANODE_EXCHANGE_CURRENT: f64 = 2e-7;
const CATHODE_EXCHANGE_CURRENT: f64 = 2e-3;

/// Electronic resistance measured between stack terminals (Ω)
const ELECTRONIC_RESISTANCE_OHM: f64 = 3.5e-5;

/// Components of the cell voltage at one operating point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoltageBreakdown {
    pub reversible_v: f64,
    pub activation_v: f64,
    pub ohmic_v: f64,
}

impl VoltageBreakdown {
    pub fn total(&self) -> f64 {
        self.reversible_v + self.activation_v + self.ohmic_v
    }
}

/// Saturated water vapor pressure (atm) from the Antoine equation
pub fn water_vapor_pressure_atm(temperature_c: f64) -> f64 {
    let p_mmhg = 10f64.powf(ANTOINE_A - ANTOINE_B / (ANTOINE_C + temperature_c));
    p_mmhg * MMHG_TO_PA / ATMOSPHERE_PA
}

/// Single-cell electrochemical model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellModel {
    active_area_cm2: f64,
    membrane_thickness_cm: f64,
}

impl CellModel {
    pub fn new(active_area_cm2: f64, membrane_thickness_cm: f64) -> Self {
        Self {
            active_area_cm2,
            membrane_thickness_cm,
        }
    }

    pub fn from_config(config: &ClusterConfig) -> Self {
        Self::new(config.cell_active_area_cm2, config.membrane_thickness_cm)
    }

    pub fn active_area_cm2(&self) -> f64 {
        self.active_area_cm2
    }

    /// Open-circuit voltage at atmospheric anode and cathode pressure
    pub fn reversible_voltage(&self, temperature_c: f64) -> f64 {
        let t_k = temperature_c + KELVIN_OFFSET;
        let p_h2o = water_vapor_pressure_atm(temperature_c);
        // Partial pressures of O2 (anode) and H2 (cathode) after water vapor
        let p_o2 = 1.0 - p_h2o;
        let p_h2 = 1.0 - p_h2o;
        E_REV_STANDARD + (GAS_CONSTANT * t_k / (2.0 * FARADAY)) * (p_o2 * p_h2.sqrt()).ln()
    }

    pub fn activation_overpotential(&self, temperature_c: f64, current_a: f64) -> f64 {
        let t_k = temperature_c + KELVIN_OFFSET;
        let i = current_a / self.active_area_cm2;
        let anode = (GAS_CONSTANT * t_k / (ANODE_CHARGE_TRANSFER * FARADAY))
            * (i / (2.0 * ANODE_EXCHANGE_CURRENT)).asinh();
        let cathode = (GAS_CONSTANT * t_k / (CATHODE_CHARGE_TRANSFER * FARADAY))
            * (i / (2.0 * CATHODE_EXCHANGE_CURRENT)).asinh();
        anode + cathode
    }

    pub fn ohmic_overpotential(&self, temperature_c: f64, current_a: f64) -> f64 {
        let i = current_a / self.active_area_cm2;
        i * (self.membrane_resistance_ohm(temperature_c) + ELECTRONIC_RESISTANCE_OHM)
    }

    /// Ionic resistance of the membrane (Ω·cm² normalized to current density)
    pub fn membrane_resistance_ohm(&self, temperature_c: f64) -> f64 {
        let t_k = temperature_c + KELVIN_OFFSET;
        let water_content = ((-2.89556 + 0.016 * t_k) + 1.625) / 0.1875;
        // Proton conductivity (S/cm)
        let sigma =
            (0.005139 * water_content - 0.00326) * (1268.0 * (1.0 / 303.0 - 1.0 / t_k)).exp();
        self.membrane_thickness_cm / sigma
    }

    pub fn breakdown(&self, temperature_c: f64, current_a: f64) -> VoltageBreakdown {
        VoltageBreakdown {
            reversible_v: self.reversible_voltage(temperature_c),
            activation_v: self.activation_overpotential(temperature_c, current_a),
            ohmic_v: self.ohmic_overpotential(temperature_c, current_a),
        }
    }

    /// Cell voltage (V) at `current_a` through one cell
    pub fn voltage(&self, temperature_c: f64, current_a: f64) -> f64 {
        self.breakdown(temperature_c, current_a).total()
    }

    /// Power drawn by a stack of `n_cells` cells (kW)
    pub fn stack_power_kw(&self, temperature_c: f64, current_a: f64, n_cells: u32) -> f64 {
        current_a * self.voltage(temperature_c, current_a) * f64::from(n_cells) / 1000.0
    }
}
