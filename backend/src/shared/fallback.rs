use serde::{Deserialize, Serialize};

use crate::domain::{round_one_decimal, NutrientLevels, Reading};
use crate::random::RandomSource;

/// Number of points in a synthetic history
pub const FALLBACK_POINTS: usize = 10;

/// Label of the final synthetic point, which equals the current values
pub const CURRENT_LABEL: &str = "Now";

const MOISTURE_BAND: Band = Band::new(50.0, 10.0);

// Per-point variation around the scenario's current values
const NITROGEN_POINT_JITTER: f64 = 8.0;
const PHOSPHORUS_POINT_JITTER: f64 = 8.0;
const POTASSIUM_POINT_JITTER: f64 = 12.0;
const MOISTURE_POINT_JITTER: f64 = 3.0;

/// Named synthetic-data profile
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Optimal,
    NitrogenDeficient,
    PhosphorusDeficient,
    PotassiumDeficient,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Optimal,
        Scenario::NitrogenDeficient,
        Scenario::PhosphorusDeficient,
        Scenario::PotassiumDeficient,
    ];

    /// Pick a scenario with equal probability
    pub fn pick(rng: &dyn RandomSource) -> Self {
        let index = (rng.next_float() * Self::ALL.len() as f64).floor() as usize;
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Optimal => "optimal",
            Scenario::NitrogenDeficient => "nitrogen_deficient",
            Scenario::PhosphorusDeficient => "phosphorus_deficient",
            Scenario::PotassiumDeficient => "potassium_deficient",
        }
    }

    /// (nitrogen, phosphorus, potassium) base bands
    fn bands(&self) -> (Band, Band, Band) {
        let nitrogen_ok = Band::new(150.0, 20.0);
        let phosphorus_ok = Band::new(150.0, 20.0);
        let potassium_ok = Band::new(225.0, 25.0);

        match self {
            Scenario::Optimal => (nitrogen_ok, phosphorus_ok, potassium_ok),
            Scenario::NitrogenDeficient => (Band::new(70.0, 15.0), phosphorus_ok, potassium_ok),
            Scenario::PhosphorusDeficient => (nitrogen_ok, Band::new(65.0, 15.0), potassium_ok),
            Scenario::PotassiumDeficient => (nitrogen_ok, phosphorus_ok, Band::new(110.0, 20.0)),
        }
    }
}

/// A center value with symmetric uniform jitter
#[derive(Debug, Clone, Copy)]
struct Band {
    center: f64,
    spread: f64,
}

impl Band {
    const fn new(center: f64, spread: f64) -> Self {
        Self { center, spread }
    }

    fn draw(&self, rng: &dyn RandomSource) -> f64 {
        jitter(self.center, self.spread, rng)
    }
}

/// `center ± spread`, never negative
fn jitter(center: f64, spread: f64, rng: &dyn RandomSource) -> f64 {
    let offset = (rng.next_float() * 2.0 - 1.0) * spread;
    (center + offset).max(0.0)
}

/// Synthetic readings substituted for real feed data
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackData {
    pub scenario: Scenario,
    pub current: NutrientLevels,
    /// Oldest first, labelled `T-9` … `T-1`, then `Now`
    pub history: Vec<Reading>,
}

pub fn generate(rng: &dyn RandomSource) -> FallbackData {
    let scenario = Scenario::pick(rng);
    let (nitrogen, phosphorus, potassium) = scenario.bands();

    let current = NutrientLevels {
        nitrogen: round_one_decimal(nitrogen.draw(rng)),
        phosphorus: round_one_decimal(phosphorus.draw(rng)),
        potassium: round_one_decimal(potassium.draw(rng)),
        moisture: Some(round_one_decimal(MOISTURE_BAND.draw(rng))),
    };

    let mut history: Vec<Reading> = (0..FALLBACK_POINTS)
        .map(|i| Reading {
            nitrogen: round_one_decimal(jitter(current.nitrogen, NITROGEN_POINT_JITTER, rng)),
            phosphorus: round_one_decimal(jitter(
                current.phosphorus,
                PHOSPHORUS_POINT_JITTER,
                rng,
            )),
            potassium: round_one_decimal(jitter(current.potassium, POTASSIUM_POINT_JITTER, rng)),
            moisture: current
                .moisture
                .map(|m| round_one_decimal(jitter(m, MOISTURE_POINT_JITTER, rng))),
            time_label: format!("T-{}", FALLBACK_POINTS - 1 - i),
        })
        .collect();

    if let Some(last) = history.last_mut() {
        *last = Reading {
            nitrogen: current.nitrogen,
            phosphorus: current.phosphorus,
            potassium: current.potassium,
            moisture: current.moisture,
            time_label: CURRENT_LABEL.to_string(),
        };
    }

    FallbackData {
        scenario,
        current,
        history,
    }
}
