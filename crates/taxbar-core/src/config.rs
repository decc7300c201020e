use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON configuration document that overrides are merged into key by key.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValue(Value);

impl ConfigValue {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Objects merge recursively; any other override replaces what it lands on.
    pub fn deep_merge(&mut self, overrides: &Value) {
        merge_into(&mut self.0, overrides);
    }
}

fn merge_into(target: &mut Value, overrides: &Value) {
    if !(target.is_object() && overrides.is_object()) {
        *target = overrides.clone();
        return;
    }
    let (Some(target), Some(fields)) = (target.as_object_mut(), overrides.as_object()) else {
        return;
    };
    for (key, value) in fields {
        match target.get_mut(key) {
            Some(slot) => merge_into(slot, value),
            None => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Geometry and search limits for label placement. Lengths are in centimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlacementConfig {
    /// Length of the full bar.
    pub bar_length: f64,
    pub bar_height: f64,
    /// Vertical distance between consecutive label rows. Raised to the tallest label plus
    /// `label_min_sep` when labels would not fit.
    pub row_pitch: f64,
    /// Gap between the bar edge and the near edge of row 0.
    pub first_row_gap: f64,
    /// Extra vertical space between one level's bottom rows and the next level's top rows.
    pub level_gap: f64,
    /// Smallest horizontal offset a leader may have from its segment center.
    #[serde(rename = "minDelX")]
    pub min_del_x: f64,
    /// Clearance kept between a leader and the corners of the boxes it passes.
    pub leader_buffer: f64,
    pub max_leader_length: f64,
    /// Minimum horizontal gap between two labels in the same row.
    pub label_min_sep: f64,
    pub max_extra_rows: usize,
    /// Score cost of every row beyond the first.
    pub row_penalty: f64,
    /// Upper bound on not-yet-placed segment centers a single label may cover.
    pub label_cover_max: usize,
    /// Segments below this share of the bar get no label.
    pub min_proportion: f64,
    /// How far labels may extend left of the bar start.
    pub left_margin: f64,
    /// How far labels may extend right of the bar end.
    pub right_margin: f64,
    /// Beam width: feasible partial arrangements kept per candidate.
    pub max_arrangements: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            bar_length: 13.0,
            bar_height: 0.5,
            row_pitch: 0.4,
            first_row_gap: 0.25,
            level_gap: 0.5,
            min_del_x: 0.125,
            leader_buffer: 0.05,
            max_leader_length: 2.0,
            label_min_sep: 0.125,
            max_extra_rows: 3,
            row_penalty: 1.0,
            label_cover_max: 8,
            min_proportion: 0.0,
            left_margin: 1.0,
            right_margin: 1.0,
            max_arrangements: 64,
        }
    }
}

impl PlacementConfig {
    /// Deep-merges `overrides` over the defaults and validates the result.
    pub fn from_value(overrides: &Value) -> Result<Self> {
        let mut merged = ConfigValue::from_value(serde_json::to_value(Self::default())?);
        merged.deep_merge(overrides);
        let cfg: Self = serde_json::from_value(merged.into_value())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("barLength", self.bar_length),
            ("barHeight", self.bar_height),
            ("rowPitch", self.row_pitch),
            ("maxLeaderLength", self.max_leader_length),
        ];
        for (name, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(Error::InvalidConfig {
                    message: format!("{name} must be a positive number, got {v}"),
                });
            }
        }
        let non_negative = [
            ("firstRowGap", self.first_row_gap),
            ("levelGap", self.level_gap),
            ("minDelX", self.min_del_x),
            ("leaderBuffer", self.leader_buffer),
            ("labelMinSep", self.label_min_sep),
            ("rowPenalty", self.row_penalty),
            ("minProportion", self.min_proportion),
            ("leftMargin", self.left_margin),
            ("rightMargin", self.right_margin),
        ];
        for (name, v) in non_negative {
            if !(v.is_finite() && v >= 0.0) {
                return Err(Error::InvalidConfig {
                    message: format!("{name} must be a non-negative number, got {v}"),
                });
            }
        }
        if self.min_del_x >= self.max_leader_length {
            return Err(Error::InvalidConfig {
                message: "minDelX must be smaller than maxLeaderLength".to_string(),
            });
        }
        if self.max_arrangements == 0 {
            return Err(Error::InvalidConfig {
                message: "maxArrangements must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Left boundary of the drawable area.
    pub fn min_x(&self) -> f64 {
        -self.left_margin
    }

    /// Right boundary of the drawable area.
    pub fn max_x(&self) -> f64 {
        self.bar_length + self.right_margin
    }
}
