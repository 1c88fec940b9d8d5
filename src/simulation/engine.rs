//! # Cluster Simulation Engine
//!
//! Owns everything derived from a [`ClusterConfig`] (cell model, fitted
//! characteristic curve, BOL efficiency curve, end-of-life threshold) and
//! runs whole power series through the pipeline:
//!
//! ```text
//! input power → dispatch → BOL current/voltage → degradation
//!             → equivalent current → hydrogen, water, efficiency → summary
//! ```
//!
//! The engine is immutable after construction. Each `run` is a pure function
//! of its input and returns an independent [`SimulationResult`].

use itertools::izip;
use tracing::{debug, info};
use validator::Validate;

use super::cell::CellModel;
use super::characteristic_curve::CharacteristicCurve;
use super::degradation::{DegradationAccumulator, DegradationProfile};
use super::efficiency::EfficiencyChain;
use super::equivalent_current::EquivalentCurrentCorrector;
use super::production::{capacity_factor, ProductionModel};
use super::replacement::{eol_degradation_v, ReplacementSchedule};
use crate::controller::{ClusterDispatchPolicy, DispatchPlan};
use crate::domain::{
    ClusterConfig, ClusterTimeSeries, OperatingPoint, SimulationError, SimulationResult,
    SimulationSummary,
};

#[derive(Debug)]
pub struct ClusterSimulationEngine {
    config: ClusterConfig,
    cell: CellModel,
    curve: CharacteristicCurve,
    dispatch: ClusterDispatchPolicy,
    degradation: DegradationAccumulator,
    production: ProductionModel,
    bol_efficiency_curve: Vec<OperatingPoint>,
    rated: OperatingPoint,
    eol_degradation_v: f64,
    max_efficiency: (f64, f64),
}

impl ClusterSimulationEngine {
    /// Validate `config` and fit its characteristic curve. Production uses
    /// Faradaic efficiency only.
    pub fn new(config: ClusterConfig) -> Result<Self, SimulationError> {
        let efficiency = EfficiencyChain::faradaic(config.cell_active_area_cm2);
        Self::with_efficiency(config, efficiency)
    }

    pub fn with_efficiency(
        config: ClusterConfig,
        efficiency: EfficiencyChain,
    ) -> Result<Self, SimulationError> {
        config.validate()?;

        let cell = CellModel::from_config(&config);
        let curve = CharacteristicCurve::fit(&config, &cell)?;
        let production = ProductionModel::new(&config, efficiency);

        let bol_efficiency_curve =
            production.bol_efficiency_curve(&curve, &cell, config.stack_rating_kw);
        let rated = production.operating_point(&curve, &cell, config.stack_rating_kw);
        let eol_degradation_v = eol_degradation_v(
            &config.degradation,
            &rated,
            config.n_cells,
            config.timestep_hours(),
        )?;
        let max_efficiency = production.max_efficiency(&curve, &cell, config.stack_rating_kw);

        info!(
            max_stacks = config.max_stacks,
            stack_rating_kw = config.stack_rating_kw,
            efficiency = ?production.efficiency_chain().names(),
            rated_current_a = rated.current_a,
            rated_h2_kg = rated.h2_kg,
            eol_degradation_v,
            "cluster engine ready"
        );

        Ok(Self {
            dispatch: ClusterDispatchPolicy::from_config(&config),
            degradation: DegradationAccumulator::new(&config.degradation, config.timestep_s),
            config,
            cell,
            curve,
            production,
            bol_efficiency_curve,
            rated,
            eol_degradation_v,
            max_efficiency,
        })
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn curve(&self) -> &CharacteristicCurve {
        &self.curve
    }

    pub fn cell(&self) -> &CellModel {
        &self.cell
    }

    pub fn rated_point(&self) -> &OperatingPoint {
        &self.rated
    }

    pub fn eol_degradation_v(&self) -> f64 {
        self.eol_degradation_v
    }

    pub fn bol_efficiency_curve(&self) -> &[OperatingPoint] {
        &self.bol_efficiency_curve
    }

    /// Simulate the cluster over `power_in_kw`, one entry per timestep (kW)
    pub fn run(&self, power_in_kw: &[f64]) -> Result<SimulationResult, SimulationError> {
        if power_in_kw.is_empty() {
            return Err(SimulationError::EmptyInput);
        }
        if let Some((index, &value)) = power_in_kw
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite())
        {
            return Err(SimulationError::Domain {
                quantity: "input power",
                index,
                value,
            });
        }

        info!(steps = power_in_kw.len(), "cluster run started");

        let plan = self.dispatch.plan(power_in_kw);
        let (series, lifetime_fatigue_estimate_v) = self.simulate(power_in_kw, plan)?;
        let summary = self.summarize(&series, lifetime_fatigue_estimate_v);

        info!(
            total_h2_kg = summary.total_h2_kg,
            final_degradation_v = summary.final_degradation_v,
            replacements = summary.lifetime_cluster_replacements,
            "cluster run finished"
        );

        Ok(SimulationResult {
            series,
            summary,
            bol_efficiency_curve: self.bol_efficiency_curve.clone(),
        })
    }

    /// Per-timestep series, plus the whole-run fatigue estimate
    fn simulate(
        &self,
        power_in_kw: &[f64],
        plan: DispatchPlan,
    ) -> Result<(ClusterTimeSeries, f64), SimulationError> {
        let n = plan.len();
        let temperature_c = self.curve.temperature_c();
        let n_cells = f64::from(self.config.n_cells);

        let bol_stack_current_a: Vec<f64> = plan
            .power_per_stack_kw
            .iter()
            .zip(&plan.status)
            .map(|(&p, s)| {
                if s.is_on() {
                    self.curve.current(p).max(0.0)
                } else {
                    0.0
                }
            })
            .collect();
        let cell_voltage_bol_v: Vec<f64> = bol_stack_current_a
            .iter()
            .zip(&plan.status)
            .map(|(&i, s)| self.cell.voltage(temperature_c, i) * s.factor())
            .collect();

        let profile = self.degradation.accumulate(&plan.status, &cell_voltage_bol_v)?;

        let mut stack_current_a = Vec::with_capacity(n);
        let mut cell_voltage_v = Vec::with_capacity(n);
        let mut initial_power_consumed_kw = Vec::with_capacity(n);
        let mut equivalent_power_kw = Vec::with_capacity(n);

        if self.config.degradation.corrects_current() {
            let corrector =
                EquivalentCurrentCorrector::new(&self.curve, &self.cell, self.config.n_cells);
            for t in 0..n {
                let corrected = corrector.correct(
                    plan.power_per_stack_kw[t],
                    bol_stack_current_a[t],
                    cell_voltage_bol_v[t],
                    profile.total_v[t],
                    plan.status[t],
                );
                stack_current_a.push(corrected.current_a);
                cell_voltage_v.push(corrected.cell_voltage_v * plan.status[t].factor());
                initial_power_consumed_kw.push(corrected.initial_power_consumed_kw);
                equivalent_power_kw.push(corrected.equivalent_power_kw);
            }
        } else {
            debug!("degradation penalty off, using BOL current");
            for t in 0..n {
                let current = bol_stack_current_a[t];
                let voltage = cell_voltage_bol_v[t];
                stack_current_a.push(current);
                cell_voltage_v.push(voltage);
                initial_power_consumed_kw.push(current * voltage * n_cells / 1000.0);
                equivalent_power_kw.push(plan.power_per_stack_kw[t]);
            }
        }

        let mut h2_no_startup_kg = Vec::with_capacity(n);
        let mut h2_kg = Vec::with_capacity(n);
        let mut water_kg = Vec::with_capacity(n);
        let mut water_gal = Vec::with_capacity(n);
        let mut efficiency = Vec::with_capacity(n);
        let mut kwh_per_kg = Vec::with_capacity(n);
        let mut power_consumed_kw = Vec::with_capacity(n);

        for (&current, &voltage, &stacks, &multiplier, &clamped) in izip!(
            &stack_current_a,
            &cell_voltage_v,
            &plan.active_stacks,
            &plan.startup_multiplier,
            &plan.clamped_power_kw
        ) {
            let h2_initial = self.production.cluster_h2_kg(current, stacks);
            let h2 = h2_initial * multiplier;
            let water = ProductionModel::water_kg(h2);

            h2_no_startup_kg.push(h2_initial);
            h2_kg.push(h2);
            water_kg.push(water);
            water_gal.push(ProductionModel::water_gal(water));
            efficiency.push(self.production.system_efficiency(h2_initial, clamped));
            kwh_per_kg.push(self.production.kwh_per_kg(clamped, h2));
            power_consumed_kw.push(f64::from(stacks) * current * voltage * n_cells / 1000.0);
        }

        let DegradationProfile {
            uptime_v,
            cycling_v,
            fatigue_v,
            total_v,
            off_cycles,
            lifetime_fatigue_estimate_v,
        } = profile;

        let series = ClusterTimeSeries {
            input_power_kw: power_in_kw.to_vec(),
            clamped_power_kw: plan.clamped_power_kw,
            curtailed_power_kw: plan.curtailed_power_kw,
            cluster_status: plan.status,
            stacks_on: plan.active_stacks,
            power_per_stack_kw: plan.power_per_stack_kw,
            startup_multiplier: plan.startup_multiplier,
            bol_stack_current_a,
            stack_current_a,
            cell_voltage_bol_v,
            cell_voltage_v,
            degradation_uptime_v: uptime_v,
            degradation_cycling_v: cycling_v,
            degradation_fatigue_v: fatigue_v,
            degradation_v: total_v,
            off_cycles,
            initial_power_consumed_kw,
            equivalent_power_kw,
            h2_no_startup_kg,
            h2_kg,
            water_kg,
            water_gal,
            efficiency,
            kwh_per_kg,
            power_consumed_kw,
        };
        Ok((series, lifetime_fatigue_estimate_v))
    }

    fn total_energy_kwh(&self, power_kw: &[f64]) -> f64 {
        power_kw
            .iter()
            .map(|&p| self.production.energy_kwh(p.max(0.0)))
            .sum()
    }

    fn summarize(
        &self,
        series: &ClusterTimeSeries,
        lifetime_fatigue_estimate_v: f64,
    ) -> SimulationSummary {
        let steps = series.len();

        let total_h2_kg: f64 = series.h2_kg.iter().sum();
        let total_input_energy_kwh = self.total_energy_kwh(&series.input_power_kw);
        let total_kwh_per_kg = if total_h2_kg > 0.0 {
            Some(total_input_energy_kwh / total_h2_kg)
        } else {
            debug!("no hydrogen produced, total kWh/kg undefined");
            None
        };

        let final_degradation_v = last(&series.degradation_v);
        let schedule = ReplacementSchedule::extrapolate(
            final_degradation_v,
            self.eol_degradation_v,
            steps as f64 * self.config.timestep_hours(),
            self.config.plant_life_hours(),
        );
        let (max_efficiency_percent, max_efficiency_kwh_per_kg) = self.max_efficiency;

        SimulationSummary {
            rated_stack_power_consumed_kw: self.rated.power_consumed_kw,
            rated_stack_h2_kg: self.rated.h2_kg,
            eol_degradation_v: self.eol_degradation_v,
            hours_until_replacement: schedule.hours_until_replacement,
            lifetime_cluster_replacements: schedule.lifetime_replacements,
            capacity_factor: capacity_factor(
                total_h2_kg,
                self.rated.h2_kg,
                steps,
                self.config.max_stacks,
            ),
            total_h2_kg,
            total_input_energy_kwh,
            total_kwh_per_kg,
            total_uptime_s: series
                .cluster_status
                .iter()
                .map(|s| s.factor() * self.config.timestep_s)
                .sum(),
            total_off_cycles: series.off_cycles.iter().sum(),
            total_curtailed_energy_kwh: self.total_energy_kwh(&series.curtailed_power_kw),
            final_degradation_v,
            final_uptime_degradation_v: last(&series.degradation_uptime_v),
            final_cycling_degradation_v: last(&series.degradation_cycling_v),
            final_fatigue_degradation_v: last(&series.degradation_fatigue_v),
            lifetime_fatigue_estimate_v,
            max_efficiency_percent,
            max_efficiency_kwh_per_kg,
            curve_coefficients: self.curve.coefficients(),
        }
    }
}

fn last(values: &[f64]) -> f64 {
    values.last().copied().unwrap_or(0.0)
}
