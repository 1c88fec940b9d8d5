//! # Cluster Dispatch
//!
//! Turns an external power signal into a per-timestep operating plan:
//!
//! 1. **Supply**: clamp input to `[0, cluster rating]`, discarding the excess
//!    as curtailment. Nothing is carried to later timesteps.
//! 2. **Design**: switch the whole cluster on when the clamped power reaches
//!    10 % of cluster rating, and share power equally across all stacks.
//! 3. **Startup**: a timestep where the cluster switches on loses the first
//!    `STARTUP_TIME_S` of production.
//!
//! Dispatch is stateless threshold logic with no hysteresis.

use serde::{Deserialize, Serialize};

use crate::domain::{ClusterConfig, ClusterStatus};

/// Time to reach production after a cold start (s)
pub const STARTUP_TIME_S: f64 = 600.0;

/// Operating plan for every timestep of a power series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchPlan {
    pub clamped_power_kw: Vec<f64>,
    pub curtailed_power_kw: Vec<f64>,
    pub status: Vec<ClusterStatus>,
    pub active_stacks: Vec<u32>,
    pub power_per_stack_kw: Vec<f64>,
    /// Hydrogen scaling for startup losses
    pub startup_multiplier: Vec<f64>,
}

impl DispatchPlan {
    pub fn len(&self) -> usize {
        self.status.len()
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterDispatchPolicy {
    max_stacks: u32,
    stack_rating_kw: f64,
    timestep_s: f64,
    min_power_kw: f64,
}

impl ClusterDispatchPolicy {
    pub fn from_config(config: &ClusterConfig) -> Self {
        Self {
            max_stacks: config.max_stacks,
            stack_rating_kw: config.stack_rating_kw,
            timestep_s: config.timestep_s,
            min_power_kw: config.min_cluster_power_kw(),
        }
    }

    pub fn cluster_rating_kw(&self) -> f64 {
        f64::from(self.max_stacks) * self.stack_rating_kw
    }

    /// Cluster switch-on threshold (kW)
    pub fn min_power_kw(&self) -> f64 {
        self.min_power_kw
    }

    /// Clamp input power to what the cluster can take. Returns
    /// `(clamped, curtailed)`; negative input clamps to zero and is not
    /// curtailment.
    pub fn external_power_supply(&self, power_in_kw: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let rating = self.cluster_rating_kw();
        power_in_kw
            .iter()
            .map(|&p| {
                let clamped = p.clamp(0.0, rating);
                (clamped, (p - rating).max(0.0))
            })
            .unzip()
    }

    /// Status of the whole cluster at `clamped_power_kw`
    pub fn status(&self, clamped_power_kw: f64) -> ClusterStatus {
        if clamped_power_kw >= self.min_power_kw {
            ClusterStatus::On
        } else {
            ClusterStatus::Off
        }
    }

    /// Cluster status, active stacks and per-stack power for each timestep
    pub fn system_design(
        &self,
        clamped_power_kw: &[f64],
    ) -> (Vec<ClusterStatus>, Vec<u32>, Vec<f64>) {
        let mut status = Vec::with_capacity(clamped_power_kw.len());
        let mut stacks = Vec::with_capacity(clamped_power_kw.len());
        let mut per_stack = Vec::with_capacity(clamped_power_kw.len());

        for &power in clamped_power_kw {
            let s = self.status(power);
            let active = if s.is_on() { self.max_stacks } else { 0 };
            status.push(s);
            stacks.push(active);
            per_stack.push(if active > 0 {
                power / f64::from(active)
            } else {
                0.0
            });
        }

        (status, stacks, per_stack)
    }

    /// Fraction of a timestep that produces hydrogen after a cold start
    pub fn startup_fraction(&self) -> f64 {
        (1.0 - STARTUP_TIME_S / self.timestep_s).max(0.0)
    }

    /// Hydrogen multipliers: the startup fraction on off→on steps, 1 elsewhere.
    /// The first timestep has no predecessor and is never a startup.
    pub fn startup_multipliers(&self, status: &[ClusterStatus]) -> Vec<f64> {
        let fraction = self.startup_fraction();
        std::iter::once(1.0)
            .chain(status.windows(2).map(|w| {
                if w[1].transition_from(w[0]) > 0 {
                    fraction
                } else {
                    1.0
                }
            }))
            .take(status.len())
            .collect()
    }

    pub fn plan(&self, power_in_kw: &[f64]) -> DispatchPlan {
        let (clamped_power_kw, curtailed_power_kw) = self.external_power_supply(power_in_kw);
        let (status, active_stacks, power_per_stack_kw) = self.system_design(&clamped_power_kw);
        let startup_multiplier = self.startup_multipliers(&status);

        DispatchPlan {
            clamped_power_kw,
            curtailed_power_kw,
            status,
            active_stacks,
            power_per_stack_kw,
            startup_multiplier,
        }
    }
}
