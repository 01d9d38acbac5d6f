use crate::domain::{NutrientLevels, NutrientStatus, Reading, StatusSet, TrendDirection, TrendSet};

pub const NITROGEN_LOW: f64 = 100.0;
pub const NITROGEN_HIGH: f64 = 200.0;
pub const PHOSPHORUS_LOW: f64 = 100.0;
pub const PHOSPHORUS_HIGH: f64 = 200.0;
pub const POTASSIUM_LOW: f64 = 150.0;
pub const POTASSIUM_HIGH: f64 = 300.0;
pub const MOISTURE_LOW_PCT: f64 = 30.0;
pub const MOISTURE_HIGH_PCT: f64 = 70.0;

/// Classify a value against a (low, high) band. The band edges are Optimal.
pub fn classify(value: f64, low: f64, high: f64) -> NutrientStatus {
    if value < low {
        NutrientStatus::Low
    } else if value > high {
        NutrientStatus::High
    } else {
        NutrientStatus::Optimal
    }
}

pub fn classify_nitrogen(value: f64) -> NutrientStatus {
    classify(value, NITROGEN_LOW, NITROGEN_HIGH)
}

pub fn classify_phosphorus(value: f64) -> NutrientStatus {
    classify(value, PHOSPHORUS_LOW, PHOSPHORUS_HIGH)
}

pub fn classify_potassium(value: f64) -> NutrientStatus {
    classify(value, POTASSIUM_LOW, POTASSIUM_HIGH)
}

pub fn classify_moisture(value: f64) -> NutrientStatus {
    classify(value, MOISTURE_LOW_PCT, MOISTURE_HIGH_PCT)
}

pub fn classify_levels(levels: &NutrientLevels) -> StatusSet {
    StatusSet {
        nitrogen: classify_nitrogen(levels.nitrogen),
        phosphorus: classify_phosphorus(levels.phosphorus),
        potassium: classify_potassium(levels.potassium),
        moisture: levels.moisture.map(classify_moisture),
    }
}

/// Ties count as `Up`
pub fn direction(previous: f64, current: f64) -> TrendDirection {
    if current >= previous {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    }
}

/// Trend from the last two entries of an oldest-first history.
/// Fewer than two entries reports `Up` for every nutrient.
pub fn trend_of(history: &[Reading]) -> TrendSet {
    match history {
        [.., previous, current] => TrendSet {
            nitrogen: direction(previous.nitrogen, current.nitrogen),
            phosphorus: direction(previous.phosphorus, current.phosphorus),
            potassium: direction(previous.potassium, current.potassium),
        },
        _ => TrendSet::all_up(),
    }
}
