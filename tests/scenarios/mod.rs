mod cluster_scenarios;
mod invariants;
