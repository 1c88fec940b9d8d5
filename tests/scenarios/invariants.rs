//! Property tests over arbitrary power signals.

use proptest::prelude::*;
use std::sync::OnceLock;

use pem_cluster_sim::domain::{ClusterConfig, ClusterStatus};
use pem_cluster_sim::simulation::{ClusterSimulationEngine, EfficiencyFactor, FaradaicEfficiency};

const MAX_STACKS: u32 = 3;

fn engine() -> &'static ClusterSimulationEngine {
    static ENGINE: OnceLock<ClusterSimulationEngine> = OnceLock::new();
    ENGINE.get_or_init(|| {
        ClusterSimulationEngine::new(ClusterConfig::with_stacks(MAX_STACKS))
            .expect("default cluster is valid")
    })
}

fn power_series() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-500.0f64..4000.0, 1..400)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_degradation_never_decreases(power in power_series()) {
        let result = engine().run(&power).unwrap();
        let series = &result.series;
        for w in series.degradation_v.windows(2) {
            prop_assert!(w[1] >= w[0]);
        }
        for component in [
            &series.degradation_uptime_v,
            &series.degradation_cycling_v,
            &series.degradation_fatigue_v,
        ] {
            prop_assert!(component.windows(2).all(|w| w[1] >= w[0]));
        }
    }

    #[test]
    fn prop_all_or_nothing_stacks(power in power_series()) {
        let result = engine().run(&power).unwrap();
        let series = &result.series;
        for (status, &stacks) in series.cluster_status.iter().zip(&series.stacks_on) {
            match status {
                ClusterStatus::On => {
                    prop_assert_eq!(stacks, MAX_STACKS);
                }
                ClusterStatus::Off => {
                    prop_assert_eq!(stacks, 0);
                }
            }
        }
    }

    #[test]
    fn prop_outputs_are_finite_and_bounded(power in power_series()) {
        let result = engine().run(&power).unwrap();
        let series = &result.series;
        for t in 0..series.len() {
            prop_assert!(series.h2_kg[t] >= 0.0 && series.h2_kg[t].is_finite());
            prop_assert!(series.h2_kg[t] <= series.h2_no_startup_kg[t]);
            prop_assert!(series.efficiency[t] >= 0.0 && series.efficiency[t] < 1.0);
            prop_assert!(series.kwh_per_kg[t] >= 0.0 && series.kwh_per_kg[t].is_finite());
            let accounted = series.clamped_power_kw[t] + series.curtailed_power_kw[t];
            prop_assert!(accounted >= series.input_power_kw[t] - 1e-9);
            prop_assert!(series.stack_current_a[t] >= 0.0);
        }
        prop_assert!(result.summary.capacity_factor >= 0.0 && result.summary.capacity_factor <= 1.0 + 1e-9);
    }

    #[test]
    fn prop_faradaic_efficiency_in_unit_interval(current in 1e-3f64..5000.0) {
        let eta = FaradaicEfficiency::new(1920.0).efficiency(current);
        prop_assert!(eta > 0.0 && eta < 1.0);
    }
}
