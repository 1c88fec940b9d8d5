//! # Stack Efficiency Factors
//!
//! Hydrogen production is scaled by the product of an ordered chain of
//! efficiency factors. Only the Faradaic term is active by default:
//!
//! η_F = (j² / (f1 + j²)) · f2,  j = 1000 · I / A  (mA/cm²)
//!
//! with f1 = 250 (mA²/cm⁴) and f2 = 0.996 for PEM stacks near 80 °C.

use std::fmt::Debug;

/// Faradaic efficiency parameter f1 (mA²/cm⁴)
pub const FARADAIC_F1: f64 = 250.0;
/// Faradaic efficiency parameter f2 (-)
pub const FARADAIC_F2: f64 = 0.996;
/// Thermo-neutral cell voltage on the HHV basis (V)
pub const THERMO_NEUTRAL_VOLTAGE_V: f64 = 1.48;

/// One multiplicative efficiency term, as a function of stack current (A)
pub trait EfficiencyFactor: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Efficiency in [0, 1]
    fn efficiency(&self, current_a: f64) -> f64;
}

/// Current lost to gas crossover, dominant at low current density
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaradaicEfficiency {
    pub active_area_cm2: f64,
    pub f1: f64,
    pub f2: f64,
}

impl FaradaicEfficiency {
    pub fn new(active_area_cm2: f64) -> Self {
        Self {
            active_area_cm2,
            f1: FARADAIC_F1,
            f2: FARADAIC_F2,
        }
    }
}

impl EfficiencyFactor for FaradaicEfficiency {
    fn name(&self) -> &'static str {
        "faradaic"
    }

    fn efficiency(&self, current_a: f64) -> f64 {
        if current_a <= 0.0 {
            return 0.0;
        }
        let j = 1000.0 * current_a / self.active_area_cm2;
        let j2 = j * j;
        (j2 / (self.f1 + j2)) * self.f2
    }
}

/// Ratio of thermo-neutral voltage to the per-cell supply voltage. Not part
/// of the default chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermoNeutralEfficiency {
    /// DC supply voltage across one stack (V)
    pub stack_supply_voltage_v: f64,
    pub n_cells: u32,
}

impl EfficiencyFactor for ThermoNeutralEfficiency {
    fn name(&self) -> &'static str {
        "thermo_neutral"
    }

    fn efficiency(&self, current_a: f64) -> f64 {
        if current_a <= 0.0 || self.stack_supply_voltage_v <= 0.0 {
            return 0.0;
        }
        let cell_supply_v = self.stack_supply_voltage_v / f64::from(self.n_cells);
        (THERMO_NEUTRAL_VOLTAGE_V / cell_supply_v).min(1.0)
    }
}

/// Ordered product of efficiency factors
#[derive(Debug)]
pub struct EfficiencyChain {
    factors: Vec<Box<dyn EfficiencyFactor>>,
}

impl EfficiencyChain {
    /// Faradaic efficiency only
    pub fn faradaic(active_area_cm2: f64) -> Self {
        Self {
            factors: vec![Box::new(FaradaicEfficiency::new(active_area_cm2))],
        }
    }

    pub fn empty() -> Self {
        Self {
            factors: Vec::new(),
        }
    }

    pub fn with_factor(mut self, factor: Box<dyn EfficiencyFactor>) -> Self {
        self.factors.push(factor);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.factors.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Combined efficiency. An empty chain is lossless.
    pub fn efficiency(&self, current_a: f64) -> f64 {
        self.factors
            .iter()
            .map(|f| f.efficiency(current_a))
            .product()
    }
}
