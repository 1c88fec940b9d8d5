//! # Stack Degradation
//!
//! Cumulative cell-voltage penalty from three independent mechanisms:
//!
//! - **Uptime**: steady degradation proportional to operating voltage and time
//!   on, `dt × r_uptime × V_cell` per timestep
//! - **Cycling**: a fixed penalty for every on→off transition of the cluster
//! - **Fatigue**: rainflow-counted voltage swings within consecutive weekly
//!   windows, weighted by `r_fatigue`
//!
//! The combined signal is what gets added to the beginning-of-life cell voltage.
//! It is computed over the whole series in one pass; every mechanism is
//! non-decreasing so the sum is too. The fatigue component is a step function
//! that only changes at window boundaries.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tracing::trace;

use super::rainflow;
use crate::domain::{ClusterStatus, DegradationConfig, SimulationError};

/// Steady-state degradation rate (V/s per V of cell voltage)
pub const UPTIME_RATE_PER_S: f64 = 1.41737929e-10;
/// Degradation per on→off cycle (V)
pub const CYCLING_RATE_V: f64 = 1.47821515e-4;
/// Degradation per unit of rainflow load, Σ count × range (V/V)
pub const FATIGUE_RATE: f64 = 3.33330244e-7;
/// Fatigue window: one week of hourly steps
pub const FATIGUE_WINDOW_STEPS: usize = 24 * 7;
pub const FATIGUE_BINS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum DegradationMechanism {
    Uptime,
    Cycling,
    Fatigue,
}

/// Degradation accumulated over one run. Every vector is cumulative (V).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DegradationProfile {
    pub uptime_v: Vec<f64>,
    pub cycling_v: Vec<f64>,
    pub fatigue_v: Vec<f64>,
    pub total_v: Vec<f64>,
    /// On→off transitions at each timestep (0 or 1)
    pub off_cycles: Vec<u32>,
    /// Fatigue from a single rainflow count over the whole run, off samples
    /// included (V)
    pub lifetime_fatigue_estimate_v: f64,
}

impl DegradationProfile {
    pub fn final_v(&self) -> f64 {
        self.total_v.last().copied().unwrap_or(0.0)
    }

    pub fn final_component_v(&self, mechanism: DegradationMechanism) -> f64 {
        let series = match mechanism {
            DegradationMechanism::Uptime => &self.uptime_v,
            DegradationMechanism::Cycling => &self.cycling_v,
            DegradationMechanism::Fatigue => &self.fatigue_v,
        };
        series.last().copied().unwrap_or(0.0)
    }

    pub fn total_off_cycles(&self) -> u32 {
        self.off_cycles.iter().sum()
    }
}

fn cumulative_sum(increments: &[f64]) -> Vec<f64> {
    increments
        .iter()
        .scan(0.0, |acc, x| {
            *acc += x;
            Some(*acc)
        })
        .collect()
}

/// Accumulates the degradation mechanisms enabled in [`DegradationConfig`]
#[derive(Debug, Clone, PartialEq)]
pub struct DegradationAccumulator {
    config: DegradationConfig,
    timestep_s: f64,
    window_steps: usize,
}

impl DegradationAccumulator {
    pub fn new(config: &DegradationConfig, timestep_s: f64) -> Self {
        Self {
            config: config.clone(),
            timestep_s,
            window_steps: FATIGUE_WINDOW_STEPS,
        }
    }

    pub fn is_enabled(&self, mechanism: DegradationMechanism) -> bool {
        match mechanism {
            DegradationMechanism::Uptime => self.config.uptime,
            DegradationMechanism::Cycling => self.config.cycling,
            DegradationMechanism::Fatigue => self.config.fatigue,
        }
    }

    /// Degrade a run with the given cluster status and beginning-of-life
    /// cell voltage. Both slices have one entry per timestep.
    pub fn accumulate(
        &self,
        status: &[ClusterStatus],
        bol_voltage: &[f64],
    ) -> Result<DegradationProfile, SimulationError> {
        if status.len() != bol_voltage.len() {
            return Err(SimulationError::LengthMismatch {
                quantity: "cell voltage",
                expected: status.len(),
                actual: bol_voltage.len(),
            });
        }
        let n = status.len();

        // Voltage only exists while the cluster is on
        let voltage: Vec<f64> = bol_voltage
            .iter()
            .zip(status)
            .map(|(v, s)| v * s.factor())
            .collect();

        let off_cycles = off_cycle_counts(status);

        let uptime_v = if self.config.uptime {
            cumulative_sum(&self.uptime_increments(status, &voltage))
        } else {
            vec![0.0; n]
        };
        let cycling_v = if self.config.cycling {
            let increments: Vec<f64> = off_cycles
                .iter()
                .map(|&c| CYCLING_RATE_V * f64::from(c))
                .collect();
            cumulative_sum(&increments)
        } else {
            vec![0.0; n]
        };

        let (fatigue_v, lifetime_fatigue_estimate_v) = if self.config.fatigue {
            let loaded: Vec<f64> = voltage
                .iter()
                .zip(&uptime_v)
                .zip(&cycling_v)
                .map(|((v, u), c)| v + u + c)
                .collect();
            (
                self.windowed_fatigue(status, &loaded),
                // Whole signal, off samples included
                FATIGUE_RATE * rainflow::weighted_range_sum(&loaded, FATIGUE_BINS),
            )
        } else {
            (vec![0.0; n], 0.0)
        };

        let total_v = uptime_v
            .iter()
            .zip(&cycling_v)
            .zip(&fatigue_v)
            .map(|((u, c), f)| u + c + f)
            .collect();

        Ok(DegradationProfile {
            uptime_v,
            cycling_v,
            fatigue_v,
            total_v,
            off_cycles,
            lifetime_fatigue_estimate_v,
        })
    }

    fn uptime_increments(&self, status: &[ClusterStatus], voltage: &[f64]) -> Vec<f64> {
        voltage
            .iter()
            .zip(status)
            .map(|(v, s)| self.timestep_s * UPTIME_RATE_PER_S * v * s.factor())
            .collect()
    }

    /// Running fatigue total, held constant across each window
    fn windowed_fatigue(&self, status: &[ClusterStatus], signal: &[f64]) -> Vec<f64> {
        let mut fatigue = Vec::with_capacity(signal.len());
        let mut load_total = 0.0;

        for (week, (status_window, signal_window)) in status
            .chunks(self.window_steps)
            .zip(signal.chunks(self.window_steps))
            .enumerate()
        {
            let load = rainflow::weighted_range_sum(
                &on_samples(status_window, signal_window),
                FATIGUE_BINS,
            );
            load_total += load;
            trace!(week, load, load_total, "fatigue window");
            fatigue.extend(std::iter::repeat(load_total * FATIGUE_RATE).take(signal_window.len()));
        }

        fatigue
    }
}

/// 1 where the cluster switches off at that timestep. The first timestep has
/// no predecessor and never counts.
pub fn off_cycle_counts(status: &[ClusterStatus]) -> Vec<u32> {
    std::iter::once(0)
        .chain(
            status
                .windows(2)
                .map(|w| u32::from(w[1].transition_from(w[0]) < 0)),
        )
        .take(status.len())
        .collect()
}

fn on_samples(status: &[ClusterStatus], signal: &[f64]) -> Vec<f64> {
    signal
        .iter()
        .zip(status)
        .filter(|(_, s)| s.is_on())
        .map(|(v, _)| *v)
        .collect()
}
