//! Consolidation Windower: selects the reports feeding a synthesis run.
//!
//! Day-labels are free text and are windowed in *creation order*, not by
//! any calendar meaning of the label. A report backfilled for an earlier
//! day therefore counts as a later day; that ambiguity is intended
//! behavior, not something to correct here.

use crate::models::report::ReportRecord;

use super::ConsolidationError;

/// The bounded subset of records selected for multi-day synthesis.
/// Derived on demand, never persisted.
#[derive(Debug, Clone)]
pub struct ConsolidationWindow {
    /// Distinct day-labels in first-seen order, capped to the request.
    pub day_labels: Vec<String>,
    /// Every record whose day-label is in `day_labels`, in input order.
    pub reports: Vec<ReportRecord>,
}

/// Selects the records belonging to the first `day_count` distinct
/// report-days. `reports` must already be in ascending creation order.
///
/// Fewer distinct days than requested is fine; zero selected days
/// (empty input or `day_count == 0`) is the empty-window condition.
pub fn select_window(
    reports: &[ReportRecord],
    day_count: usize,
) -> Result<ConsolidationWindow, ConsolidationError> {
    let mut day_labels: Vec<String> = Vec::new();
    for report in reports {
        if !day_labels.contains(&report.day_label) {
            day_labels.push(report.day_label.clone());
        }
    }
    day_labels.truncate(day_count);

    if day_labels.is_empty() {
        return Err(ConsolidationError::EmptyWindow);
    }

    let selected = reports
        .iter()
        .filter(|r| day_labels.contains(&r.day_label))
        .cloned()
        .collect();

    Ok(ConsolidationWindow {
        day_labels,
        reports: selected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::ReportStatus;

    fn record(id: &str, day_label: &str) -> ReportRecord {
        ReportRecord {
            id: id.into(),
            owner_id: "owner-1".into(),
            day_label: day_label.into(),
            unit: "2BN".into(),
            title: format!("2BN SITREP - {day_label}"),
            signing_officer: "MAJ KASULE".into(),
            markup_text: "*OVERALL*\nQuiet.".into(),
            attachments: vec![],
            status: ReportStatus::Submitted,
            created_at: "2025-03-01 08:00:00".into(),
        }
    }

    #[test]
    fn first_n_distinct_days_selected() {
        let reports = vec![
            record("r1", "D1"),
            record("r2", "D2"),
            record("r3", "D1"),
            record("r4", "D3"),
        ];
        let window = select_window(&reports, 2).unwrap();

        assert_eq!(window.day_labels, vec!["D1", "D2"]);
        let ids: Vec<&str> = window.reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn fewer_days_than_requested_is_fine() {
        let reports = vec![record("r1", "D1"), record("r2", "D1")];
        let window = select_window(&reports, 7).unwrap();

        assert_eq!(window.day_labels, vec!["D1"]);
        assert_eq!(window.reports.len(), 2);
    }

    #[test]
    fn empty_input_is_empty_window() {
        let result = select_window(&[], 3);
        assert!(matches!(result, Err(ConsolidationError::EmptyWindow)));
    }

    #[test]
    fn zero_day_count_is_empty_window() {
        let reports = vec![record("r1", "D1")];
        let result = select_window(&reports, 0);
        assert!(matches!(result, Err(ConsolidationError::EmptyWindow)));
    }

    #[test]
    fn windowing_follows_creation_order_not_label_meaning() {
        // "Day 9" appears before "Day 2" in creation order, so it wins
        // the first window slot regardless of what the labels suggest.
        let reports = vec![record("r1", "Day 9"), record("r2", "Day 2")];
        let window = select_window(&reports, 1).unwrap();
        assert_eq!(window.day_labels, vec!["Day 9"]);
    }
}
