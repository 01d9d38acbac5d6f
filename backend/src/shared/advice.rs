use serde::{Deserialize, Serialize};

use crate::domain::{NutrientStatus, Snapshot, TrendDirection};
use crate::thresholds::{
    MOISTURE_HIGH_PCT, MOISTURE_LOW_PCT, NITROGEN_HIGH, NITROGEN_LOW, PHOSPHORUS_HIGH,
    PHOSPHORUS_LOW, POTASSIUM_HIGH, POTASSIUM_LOW,
};

/// Field a recommendation is about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Nitrogen,
    Phosphorus,
    Potassium,
    Moisture,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Nitrogen => "nitrogen",
            Field::Phosphorus => "phosphorus",
            Field::Potassium => "potassium",
            Field::Moisture => "moisture",
        }
    }
}

/// Urgency level for recommendations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

/// Recommendation with action, reason, and urgency
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub field: Field,
    pub action: String,
    pub reason: String,
    pub urgency: Urgency,
}

struct Guidance {
    field: Field,
    unit: &'static str,
    low: f64,
    high: f64,
    when_low: &'static str,
    when_high: &'static str,
}

const NITROGEN: Guidance = Guidance {
    field: Field::Nitrogen,
    unit: "mg/kg",
    low: NITROGEN_LOW,
    high: NITROGEN_HIGH,
    when_low: "Apply a nitrogen-rich fertilizer such as urea or well-rotted manure",
    when_high: "Withhold nitrogen fertilizer until levels return to range",
};

const PHOSPHORUS: Guidance = Guidance {
    field: Field::Phosphorus,
    unit: "mg/kg",
    low: PHOSPHORUS_LOW,
    high: PHOSPHORUS_HIGH,
    when_low: "Apply a phosphate fertilizer such as DAP or bone meal",
    when_high: "Skip phosphate applications this cycle",
};

const POTASSIUM: Guidance = Guidance {
    field: Field::Potassium,
    unit: "mg/kg",
    low: POTASSIUM_LOW,
    high: POTASSIUM_HIGH,
    when_low: "Apply muriate or sulphate of potash",
    when_high: "Avoid potash applications and monitor for magnesium deficiency",
};

const MOISTURE: Guidance = Guidance {
    field: Field::Moisture,
    unit: "%",
    low: MOISTURE_LOW_PCT,
    high: MOISTURE_HIGH_PCT,
    when_low: "Irrigate the field",
    when_high: "Hold irrigation and check field drainage",
};

impl Guidance {
    fn advise(
        &self,
        value: f64,
        status: NutrientStatus,
        trend: Option<TrendDirection>,
    ) -> Option<Recommendation> {
        let name = self.field.as_str();
        let (action, reason, urgency) = match status {
            NutrientStatus::Optimal => return None,
            NutrientStatus::Low => (
                self.when_low,
                format!(
                    "{} is {} {}, below the optimal minimum of {} {}",
                    name, value, self.unit, self.low, self.unit
                ),
                if trend == Some(TrendDirection::Down) {
                    Urgency::High
                } else {
                    Urgency::Medium
                },
            ),
            NutrientStatus::High => (
                self.when_high,
                format!(
                    "{} is {} {}, above the optimal maximum of {} {}",
                    name, value, self.unit, self.high, self.unit
                ),
                Urgency::Low,
            ),
        };

        Some(Recommendation {
            field: self.field,
            action: action.to_string(),
            reason,
            urgency,
        })
    }
}

/// Rule-based recommendations for every field outside its optimal band,
/// most urgent first
pub fn recommend(snapshot: &Snapshot) -> Vec<Recommendation> {
    let current = &snapshot.current;
    let status = &snapshot.status;
    let trend = &snapshot.trend;

    let mut recommendations: Vec<Recommendation> = [
        NITROGEN.advise(current.nitrogen, status.nitrogen, Some(trend.nitrogen)),
        PHOSPHORUS.advise(current.phosphorus, status.phosphorus, Some(trend.phosphorus)),
        POTASSIUM.advise(current.potassium, status.potassium, Some(trend.potassium)),
        current
            .moisture
            .zip(status.moisture)
            .and_then(|(value, status)| MOISTURE.advise(value, status, None)),
    ]
    .into_iter()
    .flatten()
    .collect();

    // Stable sort keeps field order within the same urgency
    recommendations.sort_by(|a, b| b.urgency.cmp(&a.urgency));
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NutrientLevels, StatusSet, TrendSet};
    use crate::thresholds::classify_levels;

    fn snapshot(levels: NutrientLevels, trend: TrendSet) -> Snapshot {
        Snapshot {
            status: classify_levels(&levels),
            current: levels,
            history: vec![],
            trend,
            timestamp: 0,
            is_fallback: false,
            error: None,
        }
    }

    fn levels(n: f64, p: f64, k: f64, moisture: Option<f64>) -> NutrientLevels {
        NutrientLevels {
            nitrogen: n,
            phosphorus: p,
            potassium: k,
            moisture,
        }
    }

    #[test]
    fn test_all_optimal_has_no_recommendations() {
        let s = snapshot(levels(150.0, 150.0, 200.0, Some(50.0)), TrendSet::all_up());
        assert!(recommend(&s).is_empty());
    }

    #[test]
    fn test_low_nitrogen_medium_urgency() {
        let s = snapshot(levels(80.0, 150.0, 200.0, None), TrendSet::all_up());
        let recs = recommend(&s);

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].field, Field::Nitrogen);
        assert_eq!(recs[0].urgency, Urgency::Medium);
        assert_eq!(
            recs[0].reason,
            "nitrogen is 80 mg/kg, below the optimal minimum of 100 mg/kg"
        );
    }

    #[test]
    fn test_low_and_falling_is_high_urgency() {
        let trend = TrendSet {
            nitrogen: TrendDirection::Up,
            phosphorus: TrendDirection::Up,
            potassium: TrendDirection::Down,
        };
        let s = snapshot(levels(250.0, 150.0, 120.0, Some(20.0)), trend);
        let recs = recommend(&s);

        let fields: Vec<Field> = recs.iter().map(|r| r.field).collect();
        assert_eq!(fields, vec![Field::Potassium, Field::Moisture, Field::Nitrogen]);
        assert_eq!(recs[0].urgency, Urgency::High);
        assert_eq!(recs[1].urgency, Urgency::Medium);
        assert_eq!(recs[1].action, "Irrigate the field");
        assert_eq!(recs[2].urgency, Urgency::Low);
        assert!(recs[2].reason.contains("above the optimal maximum of 200 mg/kg"));
    }

    #[test]
    fn test_moisture_status_without_value_is_ignored() {
        let mut s = snapshot(levels(150.0, 150.0, 200.0, None), TrendSet::all_up());
        s.status = StatusSet {
            moisture: Some(NutrientStatus::Low),
            ..s.status
        };
        assert!(recommend(&s).is_empty());
    }

    #[test]
    fn test_recommendation_serialization() {
        let s = snapshot(levels(150.0, 150.0, 200.0, Some(80.0)), TrendSet::all_up());
        let json = serde_json::to_value(recommend(&s)).unwrap();
        assert_eq!(json[0]["field"], "moisture");
        assert_eq!(json[0]["urgency"], "low");
        assert_eq!(json[0]["reason"], "moisture is 80 %, above the optimal maximum of 70 %");
    }
}
