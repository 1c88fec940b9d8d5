use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::ClusterConfig;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cluster: ClusterConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// `path` merged with `PEM__`-prefixed environment variables. A missing
    /// file leaves the built-in defaults in place.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("PEM__").split("__"));
        Ok(figment.extract()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let cfg = Config::load_from("missing.toml").unwrap();
            assert_eq!(cfg, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_and_env_layers() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "cluster.toml",
                r#"
                [cluster]
                max_stacks = 4
                operating_temperature_c = 70.0

                [cluster.degradation]
                eol_efficiency_loss_percent = 10.0
                "#,
            )?;
            jail.set_env("PEM__CLUSTER__MAX_STACKS", "8");
            jail.set_env("PEM__CLUSTER__DEGRADATION__FATIGUE", "false");

            let cfg = Config::load_from("cluster.toml").unwrap();
            assert_eq!(cfg.cluster.max_stacks, 8);
            assert_eq!(cfg.cluster.operating_temperature_c, 70.0);
            assert_eq!(cfg.cluster.n_cells, 130);
            assert!(!cfg.cluster.degradation.fatigue);
            assert!(cfg.cluster.degradation.uptime);
            assert_eq!(cfg.cluster.degradation.eol_efficiency_loss_percent, Some(10.0));
            Ok(())
        });
    }

    #[test]
    fn test_shipped_defaults_match_built_in() {
        Jail::expect_with(|_jail| {
            let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml");
            assert_eq!(Config::load_from(path).unwrap().cluster, ClusterConfig::default());
            Ok(())
        });
    }
}
