//! Synthetic data point model

use serde::{Deserialize, Serialize};

/// Label of a generated sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Normal,
    Adversarial,
}

impl PointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Adversarial => "adversarial",
        }
    }
}

/// One 2-D sample of a scanned dataset.
///
/// `x` and `y` are always within `[0, 100]`. The flight fields are table
/// decoration for the data explorer and never feed any computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub kind: PointKind,
    pub airline: String,
    pub date_of_journey: String,
    pub source: String,
    pub destination: String,
    pub route: String,
    pub dep_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub stops: String,
    pub additional_info: String,
}

impl DataPoint {
    pub fn is_adversarial(&self) -> bool {
        self.kind == PointKind::Adversarial
    }
}
