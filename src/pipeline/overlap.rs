//! Track overlap between two playlists.
//!
//! - **Symmetric**: shared unique tracks over all unique tracks, in percent
//! - **Hype** (asymmetric): shared unique tracks over the raw length of the
//!   first playlist. Duplicates in the first playlist count in the
//!   denominator but not the numerator.

use std::collections::HashSet;

use super::domain::PipelineError;
use super::fetch::PaginatedFetcher;

/// `|unique(A) ∩ unique(B)| / |unique(A) ∪ unique(B)| * 100`
pub fn symmetric_overlap<S: AsRef<str>>(first: &[S], second: &[S]) -> Result<f64, PipelineError> {
    let first = unique(first);
    let second = unique(second);
    let union = first.union(&second).count();
    if union == 0 {
        return Err(PipelineError::DivisionUndefined("union of both playlists"));
    }
    let shared = first.intersection(&second).count();
    Ok(shared as f64 / union as f64 * 100.0)
}

/// `|unique(A) ∩ unique(B)| / |A| * 100`
pub fn asymmetric_overlap<S: AsRef<str>>(first: &[S], second: &[S]) -> Result<f64, PipelineError> {
    if first.is_empty() {
        return Err(PipelineError::DivisionUndefined("first playlist"));
    }
    let shared = unique(first).intersection(&unique(second)).count();
    Ok(shared as f64 / first.len() as f64 * 100.0)
}

fn unique<S: AsRef<str>>(ids: &[S]) -> HashSet<&str> {
    ids.iter().map(AsRef::as_ref).collect()
}

/// Both overlap figures for a pair of playlists
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapReport {
    pub first_len: usize,
    pub second_len: usize,
    pub symmetric: f64,
    pub hype: f64,
}

/// Fetches two playlists' track ids and compares them
pub struct OverlapCalculator<'a> {
    fetcher: PaginatedFetcher<'a>,
}

impl<'a> OverlapCalculator<'a> {
    pub fn new(fetcher: PaginatedFetcher<'a>) -> Self {
        Self { fetcher }
    }

    pub async fn compare(
        &self,
        first_playlist: &str,
        second_playlist: &str,
    ) -> Result<OverlapReport, PipelineError> {
        let first = self.fetcher.fetch_all_track_ids(first_playlist).await?;
        let second = self.fetcher.fetch_all_track_ids(second_playlist).await?;

        Ok(OverlapReport {
            first_len: first.len(),
            second_len: second.len(),
            symmetric: symmetric_overlap(&first, &second)?,
            hype: asymmetric_overlap(&first, &second)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RawTrackEntry;
    use crate::test_utils::{MockSource, raw_entry};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_concrete_case() {
        let a = ["t1", "t2", "t3"];
        let b = ["t2", "t3", "t4", "t5"];

        assert!(approx_eq(symmetric_overlap(&a, &b).unwrap(), 40.0));
        let hype = asymmetric_overlap(&a, &b).unwrap();
        assert!(approx_eq(hype, 200.0 / 3.0));
        assert_eq!(format!("{:.2}", hype), "66.67");
    }

    #[test]
    fn test_duplicates_count_in_hype_denominator_only() {
        let a = ["t1", "t1", "t2", "t3"];
        let b = ["t1"];

        assert!(approx_eq(asymmetric_overlap(&a, &b).unwrap(), 25.0));
        assert!(approx_eq(symmetric_overlap(&a, &b).unwrap(), 100.0 / 3.0));
    }

    #[test]
    fn test_empty_inputs_are_undefined() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            symmetric_overlap(&empty, &empty),
            Err(PipelineError::DivisionUndefined(_))
        ));
        assert!(matches!(
            asymmetric_overlap(&empty, &["t1"]),
            Err(PipelineError::DivisionUndefined(_))
        ));
        assert!(approx_eq(symmetric_overlap(&empty, &["t1"]).unwrap(), 0.0));
        assert!(approx_eq(asymmetric_overlap(&["t1"], &empty).unwrap(), 0.0));
    }

    #[tokio::test]
    async fn test_compare_fetches_both_playlists() {
        let entries = |ids: &[&str]| -> Vec<Vec<Option<RawTrackEntry>>> {
            vec![ids.iter().map(|id| Some(raw_entry(id))).collect()]
        };
        let source = MockSource::new()
            .with_playlist("first", entries(&["t1", "t2", "t3"]))
            .with_playlist("second", entries(&["t2", "t3", "t4", "t5"]));
        let calculator = OverlapCalculator::new(PaginatedFetcher::new(&source));

        let report = calculator.compare("first", "second").await.unwrap();

        assert_eq!(report.first_len, 3);
        assert_eq!(report.second_len, 4);
        assert!(approx_eq(report.symmetric, 40.0));
        assert!(approx_eq(report.hype, 200.0 / 3.0));
    }

    #[tokio::test]
    async fn test_local_files_count_towards_hype_denominator() {
        let mut local = raw_entry("ignored");
        local.is_local = true;
        let track = local.track.as_mut().unwrap();
        track.id = None;
        track.uri = Some("spotify:local:Robyn:Honey:Missing+U:286".to_string());
        let source = MockSource::new()
            .with_playlist("first", vec![vec![Some(raw_entry("t1")), Some(local)]])
            .with_playlist("second", vec![vec![Some(raw_entry("t1"))]]);
        let calculator = OverlapCalculator::new(PaginatedFetcher::new(&source));

        let report = calculator.compare("first", "second").await.unwrap();

        assert_eq!(report.first_len, 2);
        assert!(approx_eq(report.hype, 50.0));
        assert!(approx_eq(report.symmetric, 50.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn ids() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec((0u8..15).prop_map(|i| format!("t{}", i)), 0..25)
        }

        proptest! {
            #[test]
            fn symmetric_overlap_is_symmetric(a in ids(), b in ids()) {
                match (symmetric_overlap(&a, &b), symmetric_overlap(&b, &a)) {
                    (Ok(x), Ok(y)) => prop_assert!((x - y).abs() < 1e-9),
                    (Err(_), Err(_)) => prop_assert!(a.is_empty() && b.is_empty()),
                    _ => prop_assert!(false, "only one direction failed"),
                }
            }

            #[test]
            fn playlist_overlaps_itself_fully(a in ids()) {
                prop_assume!(!a.is_empty());
                prop_assert!((symmetric_overlap(&a, &a).unwrap() - 100.0).abs() < 1e-9);
            }

            #[test]
            fn overlaps_stay_in_range(a in ids(), b in ids()) {
                if let Ok(x) = symmetric_overlap(&a, &b) {
                    prop_assert!((0.0..=100.0).contains(&x));
                }
                if let Ok(x) = asymmetric_overlap(&a, &b) {
                    prop_assert!((0.0..=100.0).contains(&x));
                }
            }
        }
    }
}
