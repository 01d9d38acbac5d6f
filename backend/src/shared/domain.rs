use serde::{Deserialize, Serialize};

// ============================================================================
// Reading Models
// ============================================================================

/// One nutrient/moisture observation taken from the sensor feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    #[serde(rename = "n")]
    pub nitrogen: f64,
    #[serde(rename = "p")]
    pub phosphorus: f64,
    #[serde(rename = "k")]
    pub potassium: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moisture: Option<f64>,
    /// Display label for the time axis (clock time, raw cell text, or position)
    pub time_label: String,
}

/// Latest nutrient levels, rounded to one decimal place
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NutrientLevels {
    #[serde(rename = "n")]
    pub nitrogen: f64,
    #[serde(rename = "p")]
    pub phosphorus: f64,
    #[serde(rename = "k")]
    pub potassium: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moisture: Option<f64>,
}

impl NutrientLevels {
    /// Round a reading's values to one decimal place
    pub fn from_reading(reading: &Reading) -> Self {
        Self {
            nitrogen: round_one_decimal(reading.nitrogen),
            phosphorus: round_one_decimal(reading.phosphorus),
            potassium: round_one_decimal(reading.potassium),
            moisture: reading.moisture.map(round_one_decimal),
        }
    }
}

// ============================================================================
// Classification Models
// ============================================================================

/// Threshold classification of a single field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NutrientStatus {
    Low,
    Optimal,
    High,
}

/// Direction of change between the two most recent readings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
}

/// Per-field status classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusSet {
    #[serde(rename = "n")]
    pub nitrogen: NutrientStatus,
    #[serde(rename = "p")]
    pub phosphorus: NutrientStatus,
    #[serde(rename = "k")]
    pub potassium: NutrientStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moisture: Option<NutrientStatus>,
}

/// Per-nutrient trend direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrendSet {
    #[serde(rename = "n")]
    pub nitrogen: TrendDirection,
    #[serde(rename = "p")]
    pub phosphorus: TrendDirection,
    #[serde(rename = "k")]
    pub potassium: TrendDirection,
}

impl TrendSet {
    /// Trend reported when there is no previous reading to compare against
    pub fn all_up() -> Self {
        Self {
            nitrogen: TrendDirection::Up,
            phosphorus: TrendDirection::Up,
            potassium: TrendDirection::Up,
        }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Normalized, ready-to-render result of one ingestion call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub current: NutrientLevels,
    /// Oldest first, at most `MAX_HISTORY` entries, ending at the current reading
    pub history: Vec<Reading>,
    pub status: StatusSet,
    pub trend: TrendSet,
    /// Processing wall-clock time in epoch milliseconds
    pub timestamp: i64,
    pub is_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Maximum number of readings kept in a snapshot's history
pub const MAX_HISTORY: usize = 20;

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_reading() -> Reading {
        Reading {
            nitrogen: 142.26,
            phosphorus: 98.04,
            potassium: 210.55,
            moisture: None,
            time_label: "10:30".to_string(),
        }
    }

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(142.26), 142.3);
        assert_eq!(round_one_decimal(98.04), 98.0);
        assert_eq!(round_one_decimal(0.0), 0.0);
    }

    #[test]
    fn test_levels_from_reading() {
        let levels = NutrientLevels::from_reading(&sample_reading());
        assert_eq!(levels.nitrogen, 142.3);
        assert_eq!(levels.phosphorus, 98.0);
        assert_eq!(levels.potassium, 210.6);
        assert_eq!(levels.moisture, None);
    }

    #[test]
    fn test_reading_serializes_short_keys() {
        let json = serde_json::to_value(sample_reading()).unwrap();
        assert_eq!(json["n"], 142.26);
        assert_eq!(json["timeLabel"], "10:30");
        // Absent moisture is omitted rather than null
        assert!(json.get("moisture").is_none());
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let reading = sample_reading();
        let snapshot = Snapshot {
            current: NutrientLevels::from_reading(&reading),
            history: vec![reading],
            status: StatusSet {
                nitrogen: NutrientStatus::Optimal,
                phosphorus: NutrientStatus::Low,
                potassium: NutrientStatus::Optimal,
                moisture: None,
            },
            trend: TrendSet::all_up(),
            timestamp: 1705314600000,
            is_fallback: false,
            error: None,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["isFallback"], false);
        assert_eq!(json["status"]["p"], "Low");
        assert_eq!(json["trend"]["k"], "up");
        assert!(json.get("error").is_none());

        let back: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }
}
