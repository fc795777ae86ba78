//! Dataset adapter configuration.

use serde::{Deserialize, Serialize};

/// Default radius of the labeled region around the storm centre (km).
pub const DEFAULT_RADIUS_KM: f64 = 100.0;

/// How samples are built from table rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetOptions {
    /// Radius of the mask circle and detection box (km)
    pub radius_km: f64,
    /// Z-score every channel of each sample before NaN replacement
    pub normalize: bool,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            normalize: true,
        }
    }
}

impl DatasetOptions {
    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }
}
