//! Walks a cursor-paginated playlist to completion.

use crate::source::{PlaylistSource, RawTrackEntry, SourceError};

use super::domain::PipelineError;

/// Fetches every entry of a playlist, page by page, in source order
pub struct PaginatedFetcher<'a> {
    source: &'a dyn PlaylistSource,
}

impl<'a> PaginatedFetcher<'a> {
    pub fn new(source: &'a dyn PlaylistSource) -> Self {
        Self { source }
    }

    /// All entries that still point at a track.
    ///
    /// Null slots and entries whose track was removed are dropped. Any page
    /// failure aborts the fetch: a partial playlist is never returned.
    pub async fn fetch_all_track_entries(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<RawTrackEntry>, PipelineError> {
        let unavailable = |source: SourceError| PipelineError::SourceUnavailable {
            playlist_id: playlist_id.to_string(),
            source,
        };

        let mut entries = Vec::new();
        let mut page = self
            .source
            .get_playlist_page(playlist_id, None)
            .await
            .map_err(unavailable)?;
        let mut pages = 1usize;

        loop {
            let received = page.items.len();
            entries.extend(
                page.items
                    .into_iter()
                    .flatten()
                    .filter(|entry| entry.track.is_some()),
            );
            tracing::debug!(
                target: "pipeline::fetch",
                playlist_id,
                page = pages,
                received,
                kept = entries.len(),
                "Fetched playlist page"
            );

            let Some(cursor) = page.next_cursor else {
                break;
            };
            page = self
                .source
                .get_playlist_page(playlist_id, Some(&cursor))
                .await
                .map_err(unavailable)?;
            pages += 1;
        }

        tracing::info!(
            target: "pipeline::fetch",
            playlist_id,
            pages,
            entries = entries.len(),
            "Fetched playlist"
        );
        Ok(entries)
    }

    /// Track identifiers only, in playlist order, for callers that don't need
    /// full records.
    ///
    /// Local files have no id, so their `spotify:local:` URI stands in. Every
    /// entry that survives [`Self::fetch_all_track_entries`] yields one
    /// identifier; only a track with neither id nor URI is dropped.
    pub async fn fetch_all_track_ids(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<String>, PipelineError> {
        let entries = self.fetch_all_track_entries(playlist_id).await?;
        Ok(entries
            .into_iter()
            .filter_map(|entry| entry.track.and_then(|track| track.id.or(track.uri)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parse::parse_all;
    use crate::test_utils::{MockSource, raw_entry};

    #[tokio::test]
    async fn test_three_pages_yield_every_record_in_order() {
        let source = MockSource::new().with_playlist_pages("p1", &[100, 100, 37]);
        let fetcher = PaginatedFetcher::new(&source);

        let entries = fetcher.fetch_all_track_entries("p1").await.unwrap();
        let records = parse_all(&entries).unwrap();

        assert_eq!(records.len(), 237);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.track_id, format!("p1-t{}", i));
        }
        assert_eq!(source.calls().pages, 3);
    }

    #[tokio::test]
    async fn test_removed_tracks_are_filtered() {
        let mut removed = raw_entry("gone");
        removed.track = None;
        let source = MockSource::new().with_playlist(
            "p1",
            vec![vec![Some(raw_entry("t1")), None, Some(removed)], vec![Some(raw_entry("t2"))]],
        );
        let fetcher = PaginatedFetcher::new(&source);

        let entries = fetcher.fetch_all_track_entries("p1").await.unwrap();

        let ids: Vec<_> = entries
            .iter()
            .map(|e| e.track.as_ref().unwrap().id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[tokio::test]
    async fn test_unknown_playlist_is_unavailable() {
        let source = MockSource::new();
        let fetcher = PaginatedFetcher::new(&source);

        let err = fetcher.fetch_all_track_entries("missing").await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::SourceUnavailable { ref playlist_id, source: SourceError::NotFound(_) }
                if playlist_id == "missing"
        ));
    }

    #[tokio::test]
    async fn test_failure_on_later_page_aborts() {
        let source = MockSource::new()
            .with_playlist_pages("p1", &[10, 10])
            .failing_page("p1", 1, SourceError::Timeout("read".to_string()));
        let fetcher = PaginatedFetcher::new(&source);

        let result = fetcher.fetch_all_track_entries("p1").await;

        assert!(matches!(result, Err(PipelineError::SourceUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_fetch_ids_keeps_duplicates() {
        let source = MockSource::new().with_playlist(
            "p1",
            vec![vec![Some(raw_entry("t1")), Some(raw_entry("t2")), Some(raw_entry("t1"))]],
        );
        let fetcher = PaginatedFetcher::new(&source);

        let ids = fetcher.fetch_all_track_ids("p1").await.unwrap();

        assert_eq!(ids, vec!["t1", "t2", "t1"]);
    }

    #[tokio::test]
    async fn test_fetch_ids_keeps_local_files() {
        let mut local = raw_entry("ignored");
        local.is_local = true;
        let track = local.track.as_mut().unwrap();
        track.id = None;
        track.uri = Some("spotify:local:Robyn:Honey:Missing+U:286".to_string());
        let source = MockSource::new()
            .with_playlist("p1", vec![vec![Some(raw_entry("t1")), Some(local)]]);
        let fetcher = PaginatedFetcher::new(&source);

        let ids = fetcher.fetch_all_track_ids("p1").await.unwrap();

        assert_eq!(ids, vec!["t1", "spotify:local:Robyn:Honey:Missing+U:286"]);
    }
}
