use serde::Serialize;

use crate::analytics::filter::{FilterState, FilteredView};
use crate::analytics::metrics::HeadlineMetrics;
use crate::analytics::queries::{
    explicit_vs_clean, platform_share, rank_vs_playlists, rank_vs_virality, PlatformMean,
    PlatformSlice, QueryResult, RankedPlaylist, RankedVirality,
};
use crate::analytics::table::AnalyticsTable;

/// Everything the dashboard shows for one filter selection
#[derive(Debug, Clone, Serialize)]
pub struct ViewResult<'a> {
    #[serde(skip)]
    pub filtered: FilteredView<'a>,
    pub filters: FilterState,
    pub metrics: HeadlineMetrics,
    pub virality: QueryResult<Vec<RankedVirality>>,
    pub platform_share: QueryResult<Vec<PlatformSlice>>,
    pub playlist_influence: QueryResult<Vec<RankedPlaylist>>,
    pub explicit_comparison: QueryResult<Vec<PlatformMean>>,
}

impl ViewResult<'_> {
    /// (selected, total) row counts for the footer
    pub fn showing(&self) -> (usize, usize) {
        (self.filtered.len(), self.filtered.total_rows())
    }
}

/// Recompute the whole view from scratch. The table is never modified.
pub fn compute_view<'a>(analytics: &'a AnalyticsTable, filters: &FilterState) -> ViewResult<'a> {
    let filtered = filters.apply(analytics);

    ViewResult {
        metrics: HeadlineMetrics::compute(&filtered),
        virality: rank_vs_virality(&filtered),
        platform_share: platform_share(&filtered),
        playlist_influence: rank_vs_playlists(&filtered),
        explicit_comparison: explicit_vs_clean(&filtered),
        filters: filters.clone(),
        filtered,
    }
}
