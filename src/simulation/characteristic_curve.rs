//! # Characteristic Curve
//!
//! The cell model gives voltage from current, but the simulation is driven by
//! power. This module builds the inverse: stack current as a closed-form
//! function of stack power at the operating temperature,
//!
//! I = p1·P³ + p2·P² + p3·P + p4·√P + p5
//!
//! fitted once per cluster configuration by Levenberg-Marquardt over a sampled
//! current × temperature grid.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::cell::CellModel;
use crate::domain::ClusterConfig;
use crate::optimizer::{FitError, LeastSquaresProblem, LevenbergMarquardt};

/// Current step of the sampling grid (A)
const CURRENT_STEP_A: f64 = 10.0;
/// Lowest sampled temperature (°C)
const MIN_TEMPERATURE_C: f64 = 40.0;
const TEMPERATURE_STEP_C: f64 = 5.0;
const NUM_COEFFICIENTS: usize = 5;

/// One sampled point of the polarization grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveSample {
    pub current_a: f64,
    pub temperature_c: f64,
    pub stack_power_kw: f64,
}

/// `arange(start, stop, step)`: start, start+step, ... while < stop
fn arange(start: f64, stop: f64, step: f64) -> impl Iterator<Item = f64> {
    let count = ((stop - start) / step).ceil().max(0.0) as usize;
    (0..count).map(move |k| start + k as f64 * step)
}

/// Sample stack power over the current × temperature grid
pub fn sample_grid(config: &ClusterConfig, cell: &CellModel) -> Vec<CurveSample> {
    // The operating temperature always closes the grid so the fit subset is
    // never empty, even off the 5 °C raster.
    let mut temperatures: Vec<f64> = arange(
        MIN_TEMPERATURE_C,
        config.operating_temperature_c,
        TEMPERATURE_STEP_C,
    )
    .collect();
    temperatures.push(config.operating_temperature_c);

    arange(
        config.min_cell_current_a(),
        config.max_cell_current_a() + CURRENT_STEP_A,
        CURRENT_STEP_A,
    )
    .flat_map(|current_a| {
        temperatures.iter().map(move |&temperature_c| CurveSample {
            current_a,
            temperature_c,
            stack_power_kw: cell.stack_power_kw(temperature_c, current_a, config.n_cells),
        })
    })
    .collect()
}

fn basis(power_kw: f64) -> [f64; NUM_COEFFICIENTS] {
    [
        power_kw.powi(3),
        power_kw.powi(2),
        power_kw,
        power_kw.sqrt(),
        1.0,
    ]
}

/// Current-from-power regression over the operating-temperature samples
struct CurrentFromPower {
    power_kw: Vec<f64>,
    current_a: Vec<f64>,
}

impl LeastSquaresProblem for CurrentFromPower {
    fn num_params(&self) -> usize {
        NUM_COEFFICIENTS
    }

    fn num_observations(&self) -> usize {
        self.power_kw.len()
    }

    fn residuals(&self, params: &DVector<f64>) -> DVector<f64> {
        DVector::from_fn(self.power_kw.len(), |i, _| {
            let b = basis(self.power_kw[i]);
            b.iter().zip(params.iter()).map(|(x, p)| x * p).sum::<f64>() - self.current_a[i]
        })
    }

    fn jacobian(&self, _params: &DVector<f64>) -> DMatrix<f64> {
        DMatrix::from_fn(self.power_kw.len(), NUM_COEFFICIENTS, |i, j| {
            basis(self.power_kw[i])[j]
        })
    }
}

/// Fitted power → current relation of one stack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicCurve {
    coefficients: [f64; NUM_COEFFICIENTS],
    temperature_c: f64,
}

impl CharacteristicCurve {
    /// Fit the curve for `config`. Deterministic; a failed fit means the
    /// configuration is not physical.
    pub fn fit(config: &ClusterConfig, cell: &CellModel) -> Result<Self, FitError> {
        let samples = sample_grid(config, cell);
        let at_operating: Vec<&CurveSample> = samples
            .iter()
            .filter(|s| s.temperature_c == config.operating_temperature_c)
            .collect();
        debug!(
            grid_points = samples.len(),
            fit_points = at_operating.len(),
            "sampled polarization grid"
        );

        let problem = CurrentFromPower {
            power_kw: at_operating.iter().map(|s| s.stack_power_kw).collect(),
            current_a: at_operating.iter().map(|s| s.current_a).collect(),
        };
        let solution = LevenbergMarquardt::default()
            .minimize(&problem, DVector::from_element(NUM_COEFFICIENTS, 1.0))?;

        let mut coefficients = [0.0; NUM_COEFFICIENTS];
        for (c, p) in coefficients.iter_mut().zip(solution.params.iter()) {
            *c = *p;
        }
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(FitError::NonFinite("coefficient"));
        }

        info!(
            ?coefficients,
            iterations = solution.iterations,
            rms_error_a = (2.0 * solution.cost / problem.power_kw.len() as f64).sqrt(),
            "fitted characteristic curve"
        );

        Ok(Self {
            coefficients,
            temperature_c: config.operating_temperature_c,
        })
    }

    pub fn from_coefficients(coefficients: [f64; NUM_COEFFICIENTS], temperature_c: f64) -> Self {
        Self {
            coefficients,
            temperature_c,
        }
    }

    pub fn coefficients(&self) -> [f64; NUM_COEFFICIENTS] {
        self.coefficients
    }

    pub fn temperature_c(&self) -> f64 {
        self.temperature_c
    }

    /// Stack current (A) for `stack_power_kw`. Unclamped: below the fitted
    /// range the polynomial can go negative. Negative power has no real
    /// current and yields 0.
    pub fn current(&self, stack_power_kw: f64) -> f64 {
        if stack_power_kw < 0.0 {
            return 0.0;
        }
        basis(stack_power_kw)
            .iter()
            .zip(&self.coefficients)
            .map(|(x, p)| x * p)
            .sum()
    }

    pub fn currents(&self, stack_power_kw: &[f64]) -> Vec<f64> {
        stack_power_kw.iter().map(|&p| self.current(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fitted() -> (ClusterConfig, CellModel, CharacteristicCurve) {
        let config = ClusterConfig::default();
        let cell = CellModel::from_config(&config);
        let curve = CharacteristicCurve::fit(&config, &cell).unwrap();
        (config, cell, curve)
    }

    #[test]
    fn test_grid_shape() {
        let config = ClusterConfig::default();
        let grid = sample_grid(&config, &CellModel::from_config(&config));
        // 384..=3844 A in 10 A steps, 40..=80 °C in 5 °C steps
        assert_eq!(grid.len(), 347 * 9);
        assert_eq!(grid[0].current_a, 384.0);
        assert_eq!(grid[0].temperature_c, 40.0);
        assert_eq!(grid.iter().filter(|s| s.temperature_c == 80.0).count(), 347);
    }

    #[test]
    fn test_fit_reproduces_samples() {
        let (config, cell, curve) = fitted();
        for sample in sample_grid(&config, &cell)
            .iter()
            .filter(|s| s.temperature_c == 80.0)
        {
            assert_relative_eq!(
                curve.current(sample.stack_power_kw),
                sample.current_a,
                epsilon = 1.0
            );
        }
    }

    #[test]
    fn test_fit_round_trips_through_cell_model() {
        let (config, cell, curve) = fitted();
        let current = curve.current(1000.0);
        assert_relative_eq!(current, 3760.8, epsilon = 1.0);
        let consumed = cell.stack_power_kw(80.0, current, config.n_cells);
        assert_relative_eq!(consumed, 1000.0, epsilon = 0.5);
    }

    #[test]
    fn test_curve_is_monotonic_over_fit_range() {
        let (_, _, curve) = fitted();
        let mut previous = curve.current(86.0);
        for p in (87..=1024).map(f64::from) {
            let current = curve.current(p);
            assert!(current > previous, "not increasing at {} kW", p);
            previous = current;
        }
    }

    #[test]
    fn test_operating_temperature_off_raster() {
        let config = ClusterConfig {
            operating_temperature_c: 72.0,
            ..Default::default()
        };
        let cell = CellModel::from_config(&config);
        let grid = sample_grid(&config, &cell);
        assert_eq!(grid.iter().filter(|s| s.temperature_c == 72.0).count(), 347);
        assert!(grid.iter().all(|s| s.temperature_c <= 72.0));
        assert!(CharacteristicCurve::fit(&config, &cell).is_ok());
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (_, _, a) = fitted();
        let (_, _, b) = fitted();
        assert_eq!(a, b);
    }

    #[test]
    fn test_negative_power_has_no_current() {
        let (_, _, curve) = fitted();
        assert_eq!(curve.current(-10.0), 0.0);
    }

    #[test]
    fn test_explicit_coefficients() {
        let curve = CharacteristicCurve::from_coefficients([0.0, 0.0, 2.0, 0.0, 1.0], 80.0);
        assert_eq!(curve.current(10.0), 21.0);
        assert_eq!(curve.currents(&[0.0, 1.0]), vec![1.0, 3.0]);
    }
}
