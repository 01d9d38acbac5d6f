//! Test utilities for property-based testing
//!
//! Generators produce sensor feed documents with shuffled column layouts and
//! a mix of valid and invalid rows. Helpers render those documents as CSV and
//! provide an in-memory `FeedFetcher` so ingestion can run without a network.

pub mod generators {
    use proptest::prelude::*;

    use super::helpers::FeedRow;

    /// Header names a real sensor sheet might use for each column
    pub const NITROGEN_HEADER: &str = "Nitrogen (mg/kg)";
    pub const PHOSPHORUS_HEADER: &str = "Phosphorus (mg/kg)";
    pub const POTASSIUM_HEADER: &str = "Potassium (mg/kg)";
    pub const MOISTURE_HEADER: &str = "Soil Moisture (%)";
    pub const TIME_HEADER: &str = "Timestamp";

    /// Generate a nutrient value with one decimal place
    pub fn nutrient_value() -> impl Strategy<Value = f64> {
        (0u32..5000).prop_map(|tenths| tenths as f64 / 10.0)
    }

    /// Generate a moisture percentage with one decimal place
    pub fn moisture_value() -> impl Strategy<Value = f64> {
        (0u32..=1000).prop_map(|tenths| tenths as f64 / 10.0)
    }

    /// Generate a cell that must cause its row to be rejected
    pub fn invalid_cell() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("".to_string()),
            Just("-5".to_string()),
            Just("n/a".to_string()),
            Just("NaN".to_string()),
            Just("inf".to_string()),
        ]
    }

    /// Generate a valid row
    pub fn valid_row() -> impl Strategy<Value = FeedRow> {
        (
            nutrient_value(),
            nutrient_value(),
            nutrient_value(),
            moisture_value(),
        )
            .prop_map(|(n, p, k, m)| FeedRow::valid(n, p, k, m))
    }

    /// Generate a row whose nitrogen, phosphorus, or potassium cell is invalid
    pub fn invalid_row() -> impl Strategy<Value = FeedRow> {
        (valid_row(), 0usize..3, invalid_cell()).prop_map(|(mut row, column, cell)| {
            row.cells[column] = cell;
            row
        })
    }

    /// Generate a row that is either valid or invalid
    pub fn any_row() -> impl Strategy<Value = FeedRow> {
        prop_oneof![3 => valid_row(), 1 => invalid_row()]
    }

    /// Generate a header layout with all columns in random order
    pub fn header_layout() -> impl Strategy<Value = Vec<&'static str>> {
        Just(vec![
            TIME_HEADER,
            NITROGEN_HEADER,
            PHOSPHORUS_HEADER,
            POTASSIUM_HEADER,
            MOISTURE_HEADER,
        ])
        .prop_shuffle()
    }

    /// Generate a header layout missing at least one required column
    pub fn incomplete_header_layout() -> impl Strategy<Value = Vec<&'static str>> {
        (header_layout(), 0usize..3).prop_map(|(layout, dropped)| {
            let dropped = [NITROGEN_HEADER, PHOSPHORUS_HEADER, POTASSIUM_HEADER][dropped];
            layout.into_iter().filter(|h| *h != dropped).collect()
        })
    }
}

pub mod helpers {
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use super::generators::{
        MOISTURE_HEADER, NITROGEN_HEADER, PHOSPHORUS_HEADER, POTASSIUM_HEADER, TIME_HEADER,
    };
    use crate::error::IngestError;
    use crate::ingestor::FeedFetcher;

    /// One data row as cell text, in canonical (n, p, k, moisture) order
    #[derive(Debug, Clone, PartialEq)]
    pub struct FeedRow {
        pub cells: [String; 4],
    }

    impl FeedRow {
        pub fn valid(n: f64, p: f64, k: f64, moisture: f64) -> Self {
            Self {
                cells: [n.to_string(), p.to_string(), k.to_string(), moisture.to_string()],
            }
        }

        pub fn is_valid(&self) -> bool {
            self.cells[..3].iter().all(|cell| {
                cell.parse::<f64>()
                    .map(|v| v.is_finite() && v >= 0.0)
                    .unwrap_or(false)
            })
        }

        pub fn nitrogen(&self) -> Option<f64> {
            self.cells[0].parse().ok()
        }
    }

    /// Render rows as CSV under the given header layout
    ///
    /// Row `i` gets timestamp `2024-01-15 HH:MM:00` with minutes increasing,
    /// so chronological order equals document order.
    pub fn render_feed(layout: &[&str], rows: &[FeedRow]) -> String {
        let mut text = layout.join(",");
        text.push('\n');

        for (i, row) in rows.iter().enumerate() {
            let cells: Vec<String> = layout
                .iter()
                .map(|header| match *header {
                    NITROGEN_HEADER => row.cells[0].clone(),
                    PHOSPHORUS_HEADER => row.cells[1].clone(),
                    POTASSIUM_HEADER => row.cells[2].clone(),
                    MOISTURE_HEADER => row.cells[3].clone(),
                    TIME_HEADER => clock_time(i),
                    _ => String::new(),
                })
                .collect();
            text.push_str(&cells.join(","));
            text.push('\n');
        }

        text
    }

    /// Timestamp for row `i` as rendered by `render_feed`
    pub fn clock_time(i: usize) -> String {
        format!("2024-01-15 {:02}:{:02}:00", (i / 60) % 24, i % 60)
    }

    /// In-memory fetcher returning a canned response and recording requested URLs
    #[derive(Debug, Clone)]
    pub struct StaticFeedFetcher {
        response: Result<String, String>,
        requested: Arc<Mutex<Vec<String>>>,
    }

    impl StaticFeedFetcher {
        pub fn ok(text: impl Into<String>) -> Self {
            Self {
                response: Ok(text.into()),
                requested: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn failing(message: impl Into<String>) -> Self {
            Self {
                response: Err(message.into()),
                requested: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn requested_urls(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FeedFetcher for StaticFeedFetcher {
        async fn fetch(&self, url: &str) -> Result<String, IngestError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.response.clone().map_err(IngestError::Fetch)
        }
    }
}
