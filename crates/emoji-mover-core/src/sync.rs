//! Set reconciliation and run statistics.
//!
//! This module is pure business logic: it decides which emoji to migrate and
//! tallies per-item outcomes, decoupled from the network drivers.

use crate::models::{ExclusionSet, ExistingSet, Inventory, WorkSet};

/// Counts of inventory entries dropped during reconciliation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Dropped because they are platform defaults.
    pub excluded: usize,
    /// Dropped because the destination already has them.
    pub existing: usize,
    /// Dropped because the reference is empty or an alias.
    pub unmigratable: usize,
}

/// Computes the work set: inventory minus exclusions, minus names already on
/// the destination, minus alias and empty entries.
///
/// The inventory is left untouched. Traversal order of the result is
/// unspecified.
///
/// # Examples
///
/// ```
/// use emoji_mover_core::models::{inventory_from_map, ExclusionSet, ExistingSet};
/// use emoji_mover_core::sync::reconcile;
/// use std::collections::HashMap;
///
/// let inventory = inventory_from_map(HashMap::from([
///     ("foo".to_string(), "http://x/f.png".to_string()),
///     ("bar".to_string(), "alias:foo".to_string()),
/// ]));
/// let (work, _) = reconcile(&inventory, &ExclusionSet::new(), &ExistingSet::new());
/// assert_eq!(work.len(), 1);
/// assert_eq!(work[0].name, "foo");
/// ```
pub fn reconcile(
    inventory: &Inventory,
    exclusions: &ExclusionSet,
    existing: &ExistingSet,
) -> (WorkSet, ReconcileSummary) {
    let mut summary = ReconcileSummary::default();

    let work = inventory
        .values()
        .filter(|record| {
            if exclusions.contains(&record.name) {
                summary.excluded += 1;
                false
            } else if existing.contains(&record.name) {
                summary.existing += 1;
                false
            } else if !record.is_migratable() {
                summary.unmigratable += 1;
                false
            } else {
                true
            }
        })
        .cloned()
        .collect();

    (work, summary)
}

/// Outcome of one step for one emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Image was already in the download directory, no request made
    AlreadyPresent,
    /// Image fetched and written to disk
    Downloaded,
    /// Image could not be fetched or written
    DownloadFailed,
    /// Destination confirmed the new emoji
    Uploaded,
    /// Upload could not be submitted or was not confirmed
    UploadFailed,
}

/// Statistics for a migration run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationStats {
    pub already_present: usize,
    pub downloaded: usize,
    pub download_failed: usize,
    pub uploaded: usize,
    pub upload_failed: usize,
}

impl MigrationStats {
    /// Creates a new empty stats tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an outcome, incrementing the appropriate counter.
    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::AlreadyPresent => self.already_present += 1,
            ItemOutcome::Downloaded => self.downloaded += 1,
            ItemOutcome::DownloadFailed => self.download_failed += 1,
            ItemOutcome::Uploaded => self.uploaded += 1,
            ItemOutcome::UploadFailed => self.upload_failed += 1,
        }
    }

    /// Images available locally after the download step.
    pub fn available(&self) -> usize {
        self.already_present + self.downloaded
    }

    /// Items that failed at either step.
    pub fn failed(&self) -> usize {
        self.download_failed + self.upload_failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{inventory_from_map, EmojiRecord};
    use std::collections::{HashMap, HashSet};

    fn inventory(entries: &[(&str, &str)]) -> Inventory {
        inventory_from_map(
            entries
                .iter()
                .map(|(name, r)| (name.to_string(), r.to_string()))
                .collect::<HashMap<_, _>>(),
        )
    }

    fn names(work: &WorkSet) -> HashSet<&str> {
        work.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_reconcile_drops_alias_and_empty() {
        let inv = inventory(&[("foo", "http://x/f.png"), ("bar", "alias:foo"), ("baz", "")]);
        let (work, summary) = reconcile(&inv, &ExclusionSet::new(), &ExistingSet::new());

        assert_eq!(work, vec![EmojiRecord::new("foo", "http://x/f.png")]);
        assert_eq!(summary.unmigratable, 2);
    }

    #[test]
    fn test_reconcile_drops_excluded_and_existing() {
        let inv = inventory(&[
            ("smile", "http://x/smile.png"),
            ("parrot", "http://x/parrot.gif"),
            ("shipit", "http://x/shipit.png"),
            ("doge", "http://x/doge.png"),
        ]);
        let exclusions: ExclusionSet = ["smile".to_string()].into();
        let existing: ExistingSet = ["parrot".to_string(), "unrelated".to_string()].into();

        let (work, summary) = reconcile(&inv, &exclusions, &existing);

        assert_eq!(names(&work), HashSet::from(["shipit", "doge"]));
        assert_eq!(
            summary,
            ReconcileSummary {
                excluded: 1,
                existing: 1,
                unmigratable: 0
            }
        );
    }

    #[test]
    fn test_reconcile_invariants_hold() {
        let inv = inventory(&[
            ("a", "http://x/a.png"),
            ("b", "alias:a"),
            ("c", "http://x/c.png"),
            ("d", ""),
            ("e", "http://x/e.png"),
            ("f", "http://x/f.png"),
        ]);
        let exclusions: ExclusionSet = ["a".to_string(), "b".to_string()].into();
        let existing: ExistingSet = ["c".to_string()].into();

        let (work, _) = reconcile(&inv, &exclusions, &existing);

        for record in &work {
            assert!(inv.contains_key(&record.name));
            assert!(!exclusions.contains(&record.name));
            assert!(!existing.contains(&record.name));
            assert!(record.is_migratable());
        }
        assert_eq!(names(&work), HashSet::from(["e", "f"]));
    }

    #[test]
    fn test_reconcile_leaves_inventory_untouched() {
        let inv = inventory(&[("foo", "http://x/f.png"), ("bar", "alias:foo")]);
        let before = inv.clone();
        let existing: ExistingSet = ["foo".to_string()].into();

        let (work, _) = reconcile(&inv, &ExclusionSet::new(), &existing);

        assert!(work.is_empty());
        assert_eq!(inv, before);
    }

    #[test]
    fn test_migration_stats_record() {
        let mut stats = MigrationStats::new();
        stats.record(ItemOutcome::AlreadyPresent);
        stats.record(ItemOutcome::Downloaded);
        stats.record(ItemOutcome::Downloaded);
        stats.record(ItemOutcome::DownloadFailed);
        stats.record(ItemOutcome::Uploaded);
        stats.record(ItemOutcome::UploadFailed);

        assert_eq!(stats.already_present, 1);
        assert_eq!(stats.downloaded, 2);
        assert_eq!(stats.available(), 3);
        assert_eq!(stats.uploaded, 1);
        assert_eq!(stats.failed(), 2);
    }
}
