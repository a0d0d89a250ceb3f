//! The six-axis attribute model shared by characters and NPCs.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::RulesError;

/// One of the six attribute axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    #[serde(rename = "体质")]
    Constitution,
    #[serde(rename = "能源")]
    Energy,
    #[serde(rename = "算法")]
    Algorithm,
    #[serde(rename = "资源感知")]
    Perception,
    #[serde(rename = "魅力")]
    Charm,
    #[serde(rename = "心智")]
    Mind,
}

impl Axis {
    /// All axes in document order.
    pub const ALL: [Axis; 6] = [
        Axis::Constitution,
        Axis::Energy,
        Axis::Algorithm,
        Axis::Perception,
        Axis::Charm,
        Axis::Mind,
    ];

    /// Key used for this axis inside the document.
    pub fn key(&self) -> &'static str {
        match self {
            Axis::Constitution => "体质",
            Axis::Energy => "能源",
            Axis::Algorithm => "算法",
            Axis::Perception => "资源感知",
            Axis::Charm => "魅力",
            Axis::Mind => "心智",
        }
    }

    /// Weight of this axis in the weighted score. The six weights sum to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            Axis::Constitution => 0.25,
            Axis::Energy => 0.25,
            Axis::Algorithm => 0.20,
            Axis::Mind => 0.15,
            Axis::Perception => 0.10,
            Axis::Charm => 0.05,
        }
    }

    /// Resolve a document key or one of the historical aliases used by
    /// talent effects and backend payloads.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "体质" | "体格" | "STR" | "CON" => Some(Axis::Constitution),
            "能源" | "反应" | "敏捷" | "DEX" => Some(Axis::Energy),
            "算法" | "智识" | "带宽" | "惟性" | "INT" => Some(Axis::Algorithm),
            "资源感知" | "幸运" | "LUK" => Some(Axis::Perception),
            "魅力" | "CHA" => Some(Axis::Charm),
            "心智" | "意志" | "SPI" => Some(Axis::Mind),
            _ => None,
        }
    }
}

impl FromStr for Axis {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Axis::from_key(s).ok_or_else(|| RulesError::UnknownAxis(s.to_string()))
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Six non-negative scalars, one per [`Axis`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisVector {
    #[serde(rename = "体质", default)]
    pub constitution: f64,
    #[serde(rename = "能源", default)]
    pub energy: f64,
    #[serde(rename = "算法", default)]
    pub algorithm: f64,
    #[serde(rename = "资源感知", default)]
    pub perception: f64,
    #[serde(rename = "魅力", default)]
    pub charm: f64,
    #[serde(rename = "心智", default)]
    pub mind: f64,
}

impl AxisVector {
    /// A vector with every axis set to `value`.
    pub fn splat(value: f64) -> Self {
        Self {
            constitution: value,
            energy: value,
            algorithm: value,
            perception: value,
            charm: value,
            mind: value,
        }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Constitution => self.constitution,
            Axis::Energy => self.energy,
            Axis::Algorithm => self.algorithm,
            Axis::Perception => self.perception,
            Axis::Charm => self.charm,
            Axis::Mind => self.mind,
        }
    }

    pub fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::Constitution => self.constitution = value,
            Axis::Energy => self.energy = value,
            Axis::Algorithm => self.algorithm = value,
            Axis::Perception => self.perception = value,
            Axis::Charm => self.charm = value,
            Axis::Mind => self.mind = value,
        }
    }

    /// Iterate `(axis, value)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, f64)> + '_ {
        Axis::ALL.iter().map(move |axis| (*axis, self.get(*axis)))
    }

    pub fn sum(&self) -> f64 {
        self.iter().map(|(_, v)| v).sum()
    }

    /// `Σ axis · weight`.
    pub fn weighted_score(&self) -> f64 {
        self.iter().map(|(axis, v)| v * axis.weight()).sum()
    }

    /// Per-axis sum of two vectors.
    pub fn plus(&self, other: &AxisVector) -> AxisVector {
        let mut out = *self;
        for axis in Axis::ALL {
            out.set(axis, self.get(axis) + other.get(axis));
        }
        out
    }

    /// Clamp into `bounds`: every axis into `[0, per_axis]`, then scale down
    /// proportionally if the sum still exceeds `total`.
    pub fn clamped(&self, bounds: AxisBounds) -> AxisVector {
        let mut out = *self;
        for axis in Axis::ALL {
            let v = self.get(axis);
            let v = if v.is_finite() { v.clamp(0.0, bounds.per_axis) } else { 0.0 };
            out.set(axis, v);
        }
        let sum = out.sum();
        if sum > bounds.total {
            let scale = bounds.total / sum;
            for axis in Axis::ALL {
                out.set(axis, out.get(axis) * scale);
            }
        }
        out
    }

    /// Human-readable list of every bound this vector violates.
    pub fn violations(&self, bounds: AxisBounds) -> Vec<String> {
        let mut errors = Vec::new();
        for (axis, value) in self.iter() {
            if value < 0.0 {
                errors.push(format!("{} is negative ({})", axis, value));
            }
            if value > bounds.per_axis {
                errors.push(format!(
                    "{} exceeds cap {} ({})",
                    axis, bounds.per_axis, value
                ));
            }
        }
        let total = self.sum();
        if total > bounds.total {
            errors.push(format!("total {} exceeds cap {}", total, bounds.total));
        }
        errors
    }
}

/// Per-axis and total caps for an [`AxisVector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub per_axis: f64,
    pub total: f64,
}

/// Fixed at character creation.
pub const BASELINE_BOUNDS: AxisBounds = AxisBounds {
    per_axis: 10.0,
    total: 60.0,
};

/// Accumulated after creation.
pub const GROWTH_BOUNDS: AxisBounds = AxisBounds {
    per_axis: 20.0,
    total: 120.0,
};

/// Baseline axis value used when a document carries none.
pub const DEFAULT_BASELINE_AXIS: f64 = 5.0;
