//! End-to-end scenarios over realistic input signals.

use approx::assert_relative_eq;
use rstest::rstest;

use pem_cluster_sim::domain::{ClusterConfig, ClusterStatus, DegradationConfig};
use pem_cluster_sim::simulation::degradation::CYCLING_RATE_V;
use pem_cluster_sim::simulation::{
    ClusterSimulationEngine, EfficiencyChain, ThermoNeutralEfficiency,
};

const HOURS_PER_YEAR: usize = 8760;

fn engine(config: ClusterConfig) -> ClusterSimulationEngine {
    ClusterSimulationEngine::new(config).unwrap()
}

/// Hourly profile with a daily cycle and a seasonal swing, peaking above
/// the cluster rating
fn wind_like_profile(rating_kw: f64, hours: usize) -> Vec<f64> {
    (0..hours)
        .map(|h| {
            let t = h as f64;
            let daily = (t * std::f64::consts::TAU / 24.0).sin();
            let seasonal = (t * std::f64::consts::TAU / HOURS_PER_YEAR as f64).cos();
            let gust = ((t * 0.37).sin() * (t * 0.11).cos()).abs();
            rating_kw * (0.45 + 0.3 * daily + 0.2 * seasonal + 0.3 * gust - 0.1)
        })
        .collect()
}

#[test]
fn test_constant_rated_power_without_degradation() {
    let engine = engine(ClusterConfig::default().without_degradation());
    let power = vec![1000.0; HOURS_PER_YEAR];
    let result = engine.run(&power).unwrap();
    let series = &result.series;

    assert!(series.stacks_on.iter().all(|&s| s == 1));
    assert!(series.cluster_status.iter().all(|s| s.is_on()));
    let first = series.h2_kg[0];
    assert!(first > 18.0 && first < 18.6);
    assert!(series.h2_kg.iter().all(|&h| h == first));
    assert!(series.degradation_v.iter().all(|&d| d == 0.0));

    let summary = &result.summary;
    assert_eq!(summary.final_degradation_v, 0.0);
    assert_eq!(summary.hours_until_replacement, None);
    assert_eq!(summary.lifetime_cluster_replacements, 0.0);
    assert_eq!(summary.total_off_cycles, 0);
    assert_relative_eq!(summary.capacity_factor, 1.0, epsilon = 1e-9);
    assert_relative_eq!(summary.total_h2_kg, first * HOURS_PER_YEAR as f64, max_relative = 1e-12);
}

#[test]
fn test_alternating_power_cycling_only() {
    let mut config = ClusterConfig::default();
    config.degradation = DegradationConfig {
        cycling: true,
        ..DegradationConfig::disabled()
    };
    let engine = engine(config);
    let power: Vec<f64> = (0..48)
        .map(|t| if t % 2 == 0 { 1000.0 } else { 50.0 })
        .collect();
    let result = engine.run(&power).unwrap();
    let series = &result.series;

    let increments = series
        .degradation_v
        .windows(2)
        .filter(|w| w[1] > w[0])
        .count();
    assert_eq!(increments, 24);
    assert_eq!(result.summary.total_off_cycles, 24);
    assert_relative_eq!(
        result.summary.final_cycling_degradation_v,
        24.0 * CYCLING_RATE_V,
        epsilon = 1e-15
    );
    assert_eq!(result.summary.final_uptime_degradation_v, 0.0);
    assert_eq!(result.summary.final_fatigue_degradation_v, 0.0);
    assert_relative_eq!(
        result.summary.final_degradation_v,
        result.summary.final_cycling_degradation_v
    );
}

#[test]
fn test_input_below_threshold_produces_nothing() {
    let engine = engine(ClusterConfig::with_stacks(10));
    let power: Vec<f64> = (0..200).map(|t| (t * 5) as f64 % 999.0).collect();
    let result = engine.run(&power).unwrap();
    let series = &result.series;

    assert!(series.cluster_status.iter().all(|&s| s == ClusterStatus::Off));
    assert!(series.h2_kg.iter().all(|&h| h == 0.0));
    assert!(series.curtailed_power_kw.iter().all(|&c| c == 0.0));
    assert!(series.degradation_v.iter().all(|&d| d == 0.0));
    assert_eq!(result.summary.total_kwh_per_kg, None);
    assert_eq!(result.summary.capacity_factor, 0.0);
    assert_eq!(result.summary.total_uptime_s, 0.0);
}

#[test]
fn test_input_above_rating_is_curtailed() {
    let engine = engine(ClusterConfig::with_stacks(2));
    let result = engine.run(&[2500.0, 2000.0, 4000.0]).unwrap();
    let series = &result.series;

    assert_eq!(series.clamped_power_kw, vec![2000.0, 2000.0, 2000.0]);
    assert_eq!(series.curtailed_power_kw, vec![500.0, 0.0, 2000.0]);
    assert_eq!(series.power_per_stack_kw, vec![1000.0, 1000.0, 1000.0]);
    assert_relative_eq!(result.summary.total_curtailed_energy_kwh, 2500.0);
}

#[test]
fn test_runs_are_independent_and_repeatable() {
    let engine = engine(ClusterConfig::with_stacks(3));
    let power = wind_like_profile(3000.0, 24 * 30);

    let first = engine.run(&power).unwrap();
    let _other = engine.run(&[100.0, 2000.0]).unwrap();
    let second = engine.run(&power).unwrap();

    assert_eq!(first, second);
}

#[rstest]
#[case::all_disabled(DegradationConfig::disabled())]
#[case::penalty_off(DegradationConfig { include_penalty: false, ..DegradationConfig::default() })]
#[case::no_mechanisms(DegradationConfig { include_penalty: true, ..DegradationConfig::disabled() })]
fn test_uncorrected_current_is_bol_current(#[case] degradation: DegradationConfig) {
    let config = ClusterConfig {
        degradation,
        ..ClusterConfig::with_stacks(2)
    };
    let result = engine(config).run(&wind_like_profile(2000.0, 24 * 14)).unwrap();
    assert_eq!(result.series.stack_current_a, result.series.bol_stack_current_a);
    assert_eq!(result.series.cell_voltage_v, result.series.cell_voltage_bol_v);
}

#[test]
fn test_startup_loss_on_restart() {
    let engine = engine(ClusterConfig::default().without_degradation());
    let result = engine.run(&[800.0, 0.0, 800.0, 800.0]).unwrap();
    let h2 = &result.series.h2_kg;

    assert_eq!(h2[1], 0.0);
    assert_relative_eq!(h2[2], h2[3] * (5.0 / 6.0));
    // No startup loss on the very first step
    assert_eq!(h2[0], h2[3]);
}

#[test]
fn test_annual_run_with_degradation() {
    let engine = engine(ClusterConfig::with_stacks(4));
    let power = wind_like_profile(4000.0, HOURS_PER_YEAR);
    let result = engine.run(&power).unwrap();
    let summary = &result.summary;

    assert!(summary.final_uptime_degradation_v > 0.0);
    assert!(summary.final_cycling_degradation_v > 0.0);
    assert!(summary.final_fatigue_degradation_v > 0.0);
    assert!(summary.lifetime_fatigue_estimate_v > 0.0);
    assert_relative_eq!(
        summary.final_degradation_v,
        summary.final_uptime_degradation_v
            + summary.final_cycling_degradation_v
            + summary.final_fatigue_degradation_v,
        epsilon = 1e-12
    );

    let hours = summary.hours_until_replacement.unwrap();
    assert_relative_eq!(
        hours,
        0.7212 / summary.final_degradation_v * HOURS_PER_YEAR as f64,
        max_relative = 1e-12
    );
    assert_relative_eq!(summary.lifetime_cluster_replacements, 30.0 * 8760.0 / hours);
    assert!(summary.capacity_factor > 0.0 && summary.capacity_factor < 1.0);
    assert!(summary.total_kwh_per_kg.unwrap() > 45.0);
}

#[test]
fn test_degraded_stack_produces_less() {
    let power = wind_like_profile(1000.0, 24 * 90);
    let fresh = engine(ClusterConfig::default().without_degradation())
        .run(&power)
        .unwrap();
    let aged = engine(ClusterConfig::default()).run(&power).unwrap();

    assert!(aged.summary.total_h2_kg < fresh.summary.total_h2_kg);
    assert_eq!(aged.series.cluster_status, fresh.series.cluster_status);
}

#[test]
fn test_extra_efficiency_factor_reduces_output() {
    let config = ClusterConfig::default().without_degradation();
    let chain = EfficiencyChain::faradaic(config.cell_active_area_cm2).with_factor(Box::new(
        ThermoNeutralEfficiency {
            stack_supply_voltage_v: 300.0,
            n_cells: config.n_cells,
        },
    ));
    let faradaic = engine(config.clone()).run(&[1000.0; 4]).unwrap();
    let combined = ClusterSimulationEngine::with_efficiency(config, chain)
        .unwrap()
        .run(&[1000.0; 4])
        .unwrap();

    let ratio = combined.summary.total_h2_kg / faradaic.summary.total_h2_kg;
    assert_relative_eq!(ratio, 1.48 / (300.0 / 130.0), epsilon = 1e-12);
}

#[test]
fn test_result_serializes_to_json() {
    let result = engine(ClusterConfig::default())
        .run(&[0.0, 600.0, 1200.0])
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["series"]["cluster_status"], serde_json::json!([0, 1, 1]));
    assert_eq!(json["bol_efficiency_curve"].as_array().unwrap().len(), 10);
    assert!(json["summary"]["total_kwh_per_kg"].is_number());
}
