use serde::{Deserialize, Serialize};

/// Cluster on/off state for one timestep. Serialized as `0`/`1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ClusterStatus {
    #[default]
    Off,
    On,
}

impl ClusterStatus {
    pub fn is_on(self) -> bool {
        self == ClusterStatus::On
    }

    /// 0.0 or 1.0, for masking series
    pub fn factor(self) -> f64 {
        match self {
            ClusterStatus::Off => 0.0,
            ClusterStatus::On => 1.0,
        }
    }

    /// Backward difference against the previous timestep: +1 on startup,
    /// -1 on shutdown, 0 otherwise.
    pub fn transition_from(self, previous: ClusterStatus) -> i8 {
        u8::from(self) as i8 - u8::from(previous) as i8
    }
}

impl From<ClusterStatus> for u8 {
    fn from(status: ClusterStatus) -> Self {
        match status {
            ClusterStatus::Off => 0,
            ClusterStatus::On => 1,
        }
    }
}

impl TryFrom<u8> for ClusterStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ClusterStatus::Off),
            1 => Ok(ClusterStatus::On),
            other => Err(format!("Invalid cluster status: {}", other)),
        }
    }
}

impl std::fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterStatus::Off => write!(f, "off"),
            ClusterStatus::On => write!(f, "on"),
        }
    }
}
