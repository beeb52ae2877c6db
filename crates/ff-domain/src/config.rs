use crate::guidance::SizingGuidance;
use ff_core::Real;

/// FAST.Farm wake formulation (`Mod_Wake`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeModel {
    Polar,
    Curl,
    Cartesian,
}

impl WakeModel {
    pub fn mod_wake(self) -> u8 {
        match self {
            WakeModel::Polar => 1,
            WakeModel::Curl => 2,
            WakeModel::Cartesian => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WakeModel::Polar => "polar",
            WakeModel::Curl => "curl",
            WakeModel::Cartesian => "cartesian",
        }
    }
}

/// Farm-wide scalars that shape every case.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalDomainConfig {
    /// Bottom of the simulation domain.
    pub zbot: Real,
    /// Total simulated time.
    pub tmax: Real,
    pub wake_model: WakeModel,
    pub n_seeds: usize,
    pub sizing: SizingGuidance,
}
