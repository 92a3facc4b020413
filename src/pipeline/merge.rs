//! Carries enrichment forward from the previous run's checkpoint.
//!
//! The merge is a left join of the freshly parsed playlist onto the checkpoint,
//! keyed by `track_id`. Fresh order is authoritative; checkpoint rows for
//! tracks no longer in the playlist are dropped.

use std::collections::HashMap;

use crate::config::MergePolicy;

use super::checkpoint::CheckpointTable;
use super::domain::{BaseTrackRecord, TrackRecord};
use super::reporter::PipelineReporter;

pub struct CheckpointMerger<'a> {
    reporter: &'a dyn PipelineReporter,
    policy: MergePolicy,
}

impl<'a> CheckpointMerger<'a> {
    pub fn new(reporter: &'a dyn PipelineReporter, policy: MergePolicy) -> Self {
        Self { reporter, policy }
    }

    /// Merge fresh base records with an optional prior table.
    ///
    /// Only enriched prior rows are carried forward; an unenriched prior row
    /// is no better than the fresh one. A table without the enriched column
    /// can't tell us what was enriched, so the merge degrades to the identity.
    pub fn merge(
        &self,
        fresh: Vec<BaseTrackRecord>,
        prior: Option<&CheckpointTable>,
    ) -> Vec<TrackRecord> {
        let Some(prior) = prior else {
            return fresh.into_iter().map(TrackRecord::unenriched).collect();
        };

        if !prior.has_enriched_column {
            self.reporter
                .merge_degraded("checkpoint has no enriched column; starting from fresh records");
            return fresh.into_iter().map(TrackRecord::unenriched).collect();
        }

        // First enriched row wins when the checkpoint lists a track twice
        let mut enriched: HashMap<&str, &TrackRecord> = HashMap::new();
        for row in prior.rows.iter().filter(|r| r.is_enriched()) {
            enriched.entry(row.track_id()).or_insert(row);
        }

        let mut carried = 0usize;
        let merged: Vec<TrackRecord> = fresh
            .into_iter()
            .map(|base| match enriched.get(base.track_id.as_str()) {
                Some(prior_row) => {
                    carried += 1;
                    self.carry_forward(base, prior_row)
                }
                None => TrackRecord::unenriched(base),
            })
            .collect();

        tracing::info!(
            target: "pipeline::merge",
            rows = merged.len(),
            carried_forward = carried,
            policy = ?self.policy,
            "Merged fresh records with checkpoint"
        );
        merged
    }

    fn carry_forward(&self, fresh: BaseTrackRecord, prior: &TrackRecord) -> TrackRecord {
        match self.policy {
            MergePolicy::PreferCheckpoint => prior.clone(),
            MergePolicy::RefreshBase => TrackRecord {
                base: fresh,
                enrichment: prior.enrichment.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::reporter::{PipelineEvent, RecordingReporter};
    use crate::test_utils::{base_record, enriched_record};

    fn table(rows: Vec<TrackRecord>) -> CheckpointTable {
        CheckpointTable::from_records(rows)
    }

    #[test]
    fn test_no_prior_is_identity() {
        let reporter = RecordingReporter::default();
        let merger = CheckpointMerger::new(&reporter, MergePolicy::PreferCheckpoint);
        let fresh = vec![base_record("t1"), base_record("t2")];

        let merged = merger.merge(fresh.clone(), None);

        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|r| !r.is_enriched()));
        assert_eq!(merged[0].base, fresh[0]);
        assert!(reporter.events().is_empty());
    }

    #[test]
    fn test_enriched_prior_rows_are_carried_forward() {
        let reporter = RecordingReporter::default();
        let merger = CheckpointMerger::new(&reporter, MergePolicy::PreferCheckpoint);
        let prior = table(vec![
            enriched_record("t2"),
            TrackRecord::unenriched(base_record("t3")),
        ]);

        let merged = merger.merge(
            vec![base_record("t1"), base_record("t2"), base_record("t3")],
            Some(&prior),
        );

        let ids: Vec<_> = merged.iter().map(|r| r.track_id()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
        assert!(!merged[0].is_enriched());
        assert!(merged[1].is_enriched());
        assert!(!merged[2].is_enriched());
    }

    #[test]
    fn test_prefer_checkpoint_keeps_stale_base_fields() {
        let reporter = RecordingReporter::default();
        let merger = CheckpointMerger::new(&reporter, MergePolicy::PreferCheckpoint);
        let prior = enriched_record("t1");
        let mut fresh = base_record("t1");
        fresh.track_popularity = Some(99);

        let merged = merger.merge(vec![fresh], Some(&table(vec![prior.clone()])));

        assert_eq!(merged[0], prior);
        assert_eq!(merged[0].base.track_popularity, Some(50));
    }

    #[test]
    fn test_refresh_base_keeps_fresh_base_fields() {
        let reporter = RecordingReporter::default();
        let merger = CheckpointMerger::new(&reporter, MergePolicy::RefreshBase);
        let prior = enriched_record("t1");
        let mut fresh = base_record("t1");
        fresh.track_popularity = Some(99);

        let merged = merger.merge(vec![fresh.clone()], Some(&table(vec![prior.clone()])));

        assert_eq!(merged[0].base, fresh);
        assert_eq!(merged[0].enrichment, prior.enrichment);
    }

    #[test]
    fn test_missing_enriched_column_degrades() {
        let reporter = RecordingReporter::default();
        let merger = CheckpointMerger::new(&reporter, MergePolicy::PreferCheckpoint);
        let mut prior = table(vec![enriched_record("t1")]);
        prior.has_enriched_column = false;

        let merged = merger.merge(vec![base_record("t1")], Some(&prior));

        assert!(!merged[0].is_enriched());
        assert!(matches!(
            reporter.events().as_slice(),
            [PipelineEvent::MergeDegraded { .. }]
        ));
    }

    #[test]
    fn test_duplicate_fresh_tracks_both_carry_enrichment() {
        let reporter = RecordingReporter::default();
        let merger = CheckpointMerger::new(&reporter, MergePolicy::PreferCheckpoint);
        let prior = table(vec![enriched_record("t1")]);

        let merged = merger.merge(vec![base_record("t1"), base_record("t1")], Some(&prior));

        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|r| r.is_enriched()));
    }

    #[test]
    fn test_tracks_removed_from_playlist_are_dropped() {
        let reporter = RecordingReporter::default();
        let merger = CheckpointMerger::new(&reporter, MergePolicy::PreferCheckpoint);
        let prior = table(vec![enriched_record("gone"), enriched_record("t1")]);

        let merged = merger.merge(vec![base_record("t1")], Some(&prior));

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].track_id(), "t1");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Merging twice never loses enrichment carried by the first merge
            #[test]
            fn merge_is_idempotent_over_enriched_rows(
                fresh_ids in prop::collection::vec(0usize..20, 0..30),
                enriched_mask in prop::collection::vec(any::<bool>(), 20),
                refresh in any::<bool>(),
            ) {
                let policy = if refresh { MergePolicy::RefreshBase } else { MergePolicy::PreferCheckpoint };
                let reporter = RecordingReporter::default();
                let merger = CheckpointMerger::new(&reporter, policy);
                let fresh: Vec<_> = fresh_ids.iter().map(|i| base_record(&format!("t{}", i))).collect();

                // Prior only covers ids that are still in the playlist
                let prior_rows: Vec<_> = fresh_ids
                    .iter()
                    .filter(|i| enriched_mask[**i])
                    .map(|i| enriched_record(&format!("t{}", i)))
                    .collect();
                let prior = CheckpointTable::from_records(prior_rows.clone());

                let once = merger.merge(fresh.clone(), Some(&prior));
                let twice = merger.merge(fresh.clone(), Some(&CheckpointTable::from_records(once.clone())));

                prop_assert_eq!(once.len(), fresh.len());
                prop_assert_eq!(&once, &twice);
                for row in &prior_rows {
                    let merged = twice.iter().find(|r| r.track_id() == row.track_id()).unwrap();
                    prop_assert!(merged.is_enriched());
                    prop_assert_eq!(&merged.enrichment, &row.enrichment);
                }
            }
        }
    }
}
