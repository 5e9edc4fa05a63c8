//! Comparison panel: collapsible section, two-product comparison requests
//! and the table view of the latest result.

use crate::api::{ComparisonRequest, ComparisonResult, ManualsClient};
use crate::error::{ClientError, ValidationError};
use crate::input::TextInput;
use crate::markup::escape_text;
use crate::tui::{AppEvent, EventSender};

pub const COMPARISON_FAILED_MESSAGE: &str = "Comparison failed.";

/// Specifications the backend knows how to compare. The empty entry and
/// "all" both mean every field.
pub const SPECIFICATION_PRESETS: &[&str] = &[
    "",
    "all",
    "RAM",
    "Processor",
    "Battery Capacity",
    "Screen Size",
    "Price",
    "Weight",
    "Front Camera",
    "Back Camera",
];

/// Table view of a comparison result, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonTable {
    pub headers: [String; 3],
    pub rows: Vec<[String; 3]>,
    pub notice: Option<String>,
}

impl From<&ComparisonResult> for ComparisonTable {
    fn from(result: &ComparisonResult) -> Self {
        Self {
            headers: [
                "Specification".to_string(),
                escape_text(&result.product_a_name),
                escape_text(&result.product_b_name),
            ],
            rows: result
                .comparisons
                .iter()
                .map(|row| {
                    [
                        escape_text(&row.specification),
                        escape_text(&row.product_a_value),
                        escape_text(&row.product_b_value),
                    ]
                })
                .collect(),
            notice: result.error.as_deref().map(escape_text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PendingComparison {
    pub generation: u64,
    pub request: ComparisonRequest,
}

impl PendingComparison {
    /// Send the comparison in the background; the result arrives as
    /// `AppEvent::ComparisonResolved`.
    pub fn dispatch(self, client: &ManualsClient, events: &EventSender) {
        let client = client.clone();
        let events = events.clone();
        tokio::spawn(async move {
            let result = client.compare(&self.request).await;
            let _ = events.send(AppEvent::ComparisonResolved {
                generation: self.generation,
                result,
            });
        });
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComparisonPanel {
    pub expanded: bool,
    pub icon_rotated: bool,
    pub specification: TextInput,
    preset: usize,
    result: Option<ComparisonResult>,
    /// Generation of the most recently issued request.
    generation: u64,
    awaiting: bool,
}

impl ComparisonPanel {
    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
        self.icon_rotated = !self.icon_rotated;
    }

    pub fn result(&self) -> Option<&ComparisonResult> {
        self.result.as_ref()
    }

    pub fn table(&self) -> Option<ComparisonTable> {
        self.result.as_ref().map(ComparisonTable::from)
    }

    /// True while the latest request has not come back.
    pub fn is_awaiting(&self) -> bool {
        self.awaiting
    }

    /// Step through `SPECIFICATION_PRESETS`, overwriting the field.
    pub fn cycle_preset(&mut self, forward: bool) {
        let len = SPECIFICATION_PRESETS.len();
        self.preset = if forward {
            (self.preset + 1) % len
        } else {
            (self.preset + len - 1) % len
        };
        self.specification.set(SPECIFICATION_PRESETS[self.preset]);
    }

    pub fn submit(
        &mut self,
        product_a: &str,
        product_b: &str,
    ) -> Result<PendingComparison, ValidationError> {
        if product_a.is_empty() || product_b.is_empty() {
            return Err(ValidationError::MissingComparisonProducts);
        }

        self.generation += 1;
        self.awaiting = true;

        Ok(PendingComparison {
            generation: self.generation,
            request: ComparisonRequest {
                product_a: product_a.to_string(),
                product_b: product_b.to_string(),
                specification: self.specification.value().to_string(),
            },
        })
    }

    /// Apply a finished request. Returns the alert text when the latest
    /// request failed. Results from superseded requests are dropped, and a
    /// failure leaves the previous table in place.
    pub fn resolve(
        &mut self,
        generation: u64,
        result: Result<ComparisonResult, ClientError>,
    ) -> Option<&'static str> {
        if generation != self.generation {
            tracing::debug!(generation, latest = self.generation, "dropping stale comparison");
            return None;
        }
        self.awaiting = false;

        match result {
            Ok(result) => {
                if let Some(error) = &result.error {
                    tracing::warn!(%error, "backend reported a comparison problem");
                }
                self.result = Some(result);
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "comparison request failed");
                Some(COMPARISON_FAILED_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ComparisonRow;
    use reqwest::StatusCode;

    fn result(a: &str, b: &str, rows: usize) -> ComparisonResult {
        ComparisonResult {
            product_a_name: a.to_string(),
            product_b_name: b.to_string(),
            comparisons: (0..rows)
                .map(|i| ComparisonRow {
                    specification: format!("spec {i}"),
                    product_a_value: format!("a{i}"),
                    product_b_value: format!("b{i}"),
                })
                .collect(),
            error: None,
        }
    }

    fn server_error() -> ClientError {
        ClientError::Status {
            url: "http://localhost/api/compare".to_string(),
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        }
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut panel = ComparisonPanel::default();
        let before = (panel.expanded, panel.icon_rotated);
        panel.toggle();
        assert_eq!((panel.expanded, panel.icon_rotated), (true, true));
        panel.toggle();
        assert_eq!((panel.expanded, panel.icon_rotated), before);
    }

    #[test]
    fn test_submit_requires_both_products() {
        let mut panel = ComparisonPanel::default();
        for (a, b) in [("", ""), ("a", ""), ("", "b")] {
            assert_eq!(
                panel.submit(a, b).unwrap_err(),
                ValidationError::MissingComparisonProducts
            );
        }
        assert!(!panel.is_awaiting());
    }

    #[test]
    fn test_submit_forwards_specification_as_typed() {
        let mut panel = ComparisonPanel::default();
        panel.specification.set("  battery life ");
        let pending = panel.submit("a", "b").unwrap();
        assert_eq!(pending.request.specification, "  battery life ");
        assert_eq!(pending.generation, 1);
        assert!(panel.is_awaiting());
    }

    #[test]
    fn test_two_row_result_renders_two_rows() {
        let mut panel = ComparisonPanel::default();
        let pending = panel.submit("a", "b").unwrap();
        assert_eq!(panel.resolve(pending.generation, Ok(result("Phone A", "Phone B", 2))), None);

        let table = panel.table().unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.headers[1], "Phone A");
        assert_eq!(table.headers[2], "Phone B");
        assert_eq!(table.rows[1], ["spec 1".to_string(), "a1".to_string(), "b1".to_string()]);
    }

    #[test]
    fn test_new_result_replaces_old_wholesale() {
        let mut panel = ComparisonPanel::default();
        let first = panel.submit("a", "b").unwrap();
        panel.resolve(first.generation, Ok(result("A", "B", 5)));
        let second = panel.submit("c", "d").unwrap();
        panel.resolve(second.generation, Ok(result("C", "D", 1)));

        let table = panel.table().unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.headers[1], "C");
    }

    #[test]
    fn test_failure_alerts_and_keeps_previous_result() {
        let mut panel = ComparisonPanel::default();
        let first = panel.submit("a", "b").unwrap();
        panel.resolve(first.generation, Ok(result("A", "B", 2)));

        let second = panel.submit("a", "b").unwrap();
        let alert = panel.resolve(second.generation, Err(server_error()));

        assert_eq!(alert, Some(COMPARISON_FAILED_MESSAGE));
        assert!(!panel.is_awaiting());
        assert_eq!(panel.result().unwrap().product_a_name, "A");
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut panel = ComparisonPanel::default();
        let older = panel.submit("a", "b").unwrap();
        let newer = panel.submit("c", "d").unwrap();

        panel.resolve(newer.generation, Ok(result("C", "D", 1)));
        // The slower, older request finishes last
        assert_eq!(panel.resolve(older.generation, Ok(result("A", "B", 3))), None);
        assert_eq!(panel.resolve(older.generation, Err(server_error())), None);

        assert_eq!(panel.result().unwrap().product_a_name, "C");
    }

    #[test]
    fn test_backend_error_notice_in_table() {
        let mut panel = ComparisonPanel::default();
        let pending = panel.submit("x", "y").unwrap();
        let mut missing = result("X", "Y", 0);
        missing.error = Some("One or both products not found".to_string());
        panel.resolve(pending.generation, Ok(missing));

        let table = panel.table().unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.notice.as_deref(), Some("One or both products not found"));
    }

    #[test]
    fn test_cycle_presets_wraps() {
        let mut panel = ComparisonPanel::default();
        panel.cycle_preset(true);
        assert_eq!(panel.specification.value(), "all");
        panel.cycle_preset(false);
        panel.cycle_preset(false);
        assert_eq!(panel.specification.value(), "Back Camera");
    }
}
