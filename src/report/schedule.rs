//! Picking the next scenarios to document.

use crate::manifest::{Manifest, ScenarioManifestEntry};
use crate::progress::ProgressLedger;

/// Pending scenarios in documentation order, at most `count` of them.
///
/// Active scenarios come first, then categories alphabetically, then IDs.
/// Returns an empty list once everything is documented.
pub fn next<'a>(
    ledger: &ProgressLedger,
    manifest: &'a Manifest,
    count: usize,
) -> Vec<&'a ScenarioManifestEntry> {
    let mut pending = pending(ledger, manifest);
    pending.sort_by(|a, b| priority_key(a).cmp(&priority_key(b)));
    pending.truncate(count);
    pending
}

/// Scenarios not yet in the ledger, in manifest order.
pub fn pending<'a>(ledger: &ProgressLedger, manifest: &'a Manifest) -> Vec<&'a ScenarioManifestEntry> {
    manifest.scenarios.iter().filter(|s| !ledger.is_complete(s.id)).collect()
}

fn priority_key(entry: &ScenarioManifestEntry) -> (bool, &str, u64) {
    (!entry.is_active, entry.category.as_str(), entry.id)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::progress::CompletionEvidence;

    fn entry(id: u64, active: bool, category: &str) -> ScenarioManifestEntry {
        ScenarioManifestEntry {
            id,
            name: format!("Scenario {id}"),
            category: category.to_string(),
            is_active: active,
            kind: "scenario".to_string(),
            filename: format!("{id}.json"),
        }
    }

    fn complete(ledger: &mut ProgressLedger, id: u64) {
        let now = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        ledger.mark_complete(id, CompletionEvidence::default(), now);
    }

    fn ids(entries: &[&ScenarioManifestEntry]) -> Vec<u64> {
        entries.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_active_first_then_category() {
        let manifest = Manifest::new(vec![entry(1, true, "A"), entry(2, false, "A"), entry(3, true, "B")]);
        let ledger = ProgressLedger::default();

        assert_eq!(ids(&next(&ledger, &manifest, 2)), vec![1, 3]);
        assert_eq!(ids(&next(&ledger, &manifest, 10)), vec![1, 3, 2]);
    }

    #[test]
    fn test_id_breaks_ties() {
        let manifest = Manifest::new(vec![entry(30, true, "A"), entry(10, true, "A"), entry(20, true, "A")]);
        assert_eq!(ids(&next(&ProgressLedger::default(), &manifest, 3)), vec![10, 20, 30]);
    }

    #[test]
    fn test_skips_completed_and_truncates() {
        let manifest = Manifest::new(
            (1..=10).map(|id| entry(id, id % 2 == 0, if id <= 5 { "Billing" } else { "Alerts" })).collect(),
        );
        let mut ledger = ProgressLedger::default();
        for id in [2, 5, 9] {
            complete(&mut ledger, id);
        }

        let batch = next(&ledger, &manifest, 5);
        // Active: 4 (Billing), 6, 8, 10 (Alerts) -> Alerts first; then inactive 7 (Alerts)
        assert_eq!(ids(&batch), vec![6, 8, 10, 4, 7]);

        complete(&mut ledger, 8);
        let batch = next(&ledger, &manifest, 5);
        assert!(!ids(&batch).contains(&8));
        assert_eq!(batch.len(), 5);
    }

    #[test]
    fn test_all_complete_is_empty() {
        let manifest = Manifest::new(vec![entry(1, true, "A")]);
        let mut ledger = ProgressLedger::default();
        complete(&mut ledger, 1);

        assert!(next(&ledger, &manifest, 5).is_empty());
    }

    #[test]
    fn test_zero_count() {
        let manifest = Manifest::new(vec![entry(1, true, "A")]);
        assert!(next(&ProgressLedger::default(), &manifest, 0).is_empty());
    }
}
