//! The four canned questions the dashboard always answers for the current filter.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::analytics::filter::FilteredView;
use crate::analytics::metrics::mean;
use crate::constants::{
    ALL_TIME_RANK, ARTIST, NOT_AVAILABLE, SPOTIFY_PLAYLIST_COUNT, SPOTIFY_STREAMS, TIKTOK_VIEWS,
    TRACK, TRACK_TYPE, YOUTUBE_VIEWS,
};
use crate::domain::Value;

/// Rows shown by the rank-based queries
pub const TOP_RANKED: usize = 15;

const BILLION: f64 = 1e9;
const MILLION: f64 = 1e6;

/// Outcome of a canned query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum QueryResult<T> {
    Ready(T),
    /// The filter left nothing to chart
    NoData,
    /// A column the query depends on is absent
    Unavailable,
}

impl<T> QueryResult<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            QueryResult::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, QueryResult::Ready(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Platform {
    Spotify,
    YouTube,
    TikTok,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Spotify, Platform::YouTube, Platform::TikTok];

    pub fn label(&self) -> &'static str {
        match self {
            Platform::Spotify => "Spotify",
            Platform::YouTube => "YouTube",
            Platform::TikTok => "TikTok",
        }
    }

    /// Engagement column measured for the platform
    pub fn column(&self) -> &'static str {
        match self {
            Platform::Spotify => SPOTIFY_STREAMS,
            Platform::YouTube => YOUTUBE_VIEWS,
            Platform::TikTok => TIKTOK_VIEWS,
        }
    }
}

/// Query 1 row: one top-ranked song's reach on each platform, in billions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedVirality {
    pub rank: f64,
    pub track: String,
    pub artist: String,
    pub spotify_billions: Option<f64>,
    pub youtube_billions: f64,
    pub tiktok_billions: f64,
}

/// Query 2 slice: a platform's total engagement and share of the combined total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformSlice {
    pub platform: Platform,
    pub total: f64,
    pub share: f64,
}

/// Query 3 row: streams against playlist placements for one top-ranked song
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPlaylist {
    pub rank: f64,
    pub track: String,
    pub spotify_billions: f64,
    pub playlist_count: f64,
}

/// Query 4 row: mean engagement of one track type on one platform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformMean {
    pub track_type: String,
    pub platform: Platform,
    pub mean: Option<f64>,
    pub label: String,
}

impl RankedVirality {
    pub fn rank_int(&self) -> i64 {
        self.rank as i64
    }
}

impl RankedPlaylist {
    pub fn rank_int(&self) -> i64 {
        self.rank as i64
    }
}

/// Render an engagement figure as `1.2B`, `3.4M` or a plain integer
pub fn format_engagement(num: f64) -> String {
    if num >= BILLION {
        format!("{:.1}B", num / BILLION)
    } else if num >= MILLION {
        format!("{:.1}M", num / MILLION)
    } else {
        format!("{:.0}", num)
    }
}

fn text(view: &FilteredView<'_>, row: usize, column: &str) -> String {
    view.cell(row, column)
        .map(|v| match v {
            Value::Missing => String::new(),
            other => other.to_field(),
        })
        .unwrap_or_default()
}

fn number(view: &FilteredView<'_>, row: usize, column: &str) -> Option<f64> {
    view.cell(row, column).and_then(Value::as_number)
}

/// Selected rows with a rank, smallest rank first, at most `limit`. Equal ranks keep
/// their table order.
fn top_by_rank(view: &FilteredView<'_>, limit: usize) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = view
        .row_indices()
        .iter()
        .filter_map(|&row| number(view, row, ALL_TIME_RANK).map(|rank| (row, rank)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.truncate(limit);
    ranked
}

/// Query 1: does cross-platform virality follow Spotify rank?
pub fn rank_vs_virality(view: &FilteredView<'_>) -> QueryResult<Vec<RankedVirality>> {
    if !view.has_column(ALL_TIME_RANK) {
        return QueryResult::Unavailable;
    }
    let rows: Vec<RankedVirality> = top_by_rank(view, TOP_RANKED)
        .into_iter()
        .map(|(row, rank)| RankedVirality {
            rank,
            track: text(view, row, TRACK),
            artist: text(view, row, ARTIST),
            spotify_billions: number(view, row, SPOTIFY_STREAMS).map(|n| n / BILLION),
            youtube_billions: number(view, row, YOUTUBE_VIEWS).unwrap_or(0.0) / BILLION,
            tiktok_billions: number(view, row, TIKTOK_VIEWS).unwrap_or(0.0) / BILLION,
        })
        .collect();

    if rows.is_empty() {
        QueryResult::NoData
    } else {
        QueryResult::Ready(rows)
    }
}

/// Query 2: which platform carries the most engagement? Missing values are left out of
/// each sum; an absent column sums to zero.
pub fn platform_share(view: &FilteredView<'_>) -> QueryResult<Vec<PlatformSlice>> {
    let totals: Vec<(Platform, f64)> = Platform::ALL
        .iter()
        .map(|p| {
            let total = view
                .numbers(p.column())
                .map(|v| v.iter().sum())
                .unwrap_or(0.0);
            (*p, total)
        })
        .collect();

    let grand_total: f64 = totals.iter().map(|(_, t)| t).sum();
    if grand_total <= 0.0 {
        return QueryResult::NoData;
    }

    QueryResult::Ready(
        totals
            .into_iter()
            .map(|(platform, total)| PlatformSlice {
                platform,
                total,
                share: total / grand_total * 100.0,
            })
            .collect(),
    )
}

/// Query 3: does playlist placement track streams among the top-ranked songs?
pub fn rank_vs_playlists(view: &FilteredView<'_>) -> QueryResult<Vec<RankedPlaylist>> {
    if !view.has_column(ALL_TIME_RANK) {
        return QueryResult::Unavailable;
    }
    let rows: Vec<RankedPlaylist> = top_by_rank(view, TOP_RANKED)
        .into_iter()
        .map(|(row, rank)| RankedPlaylist {
            rank,
            track: text(view, row, TRACK),
            spotify_billions: number(view, row, SPOTIFY_STREAMS).unwrap_or(0.0) / BILLION,
            playlist_count: number(view, row, SPOTIFY_PLAYLIST_COUNT).unwrap_or(0.0),
        })
        .collect();

    if rows.is_empty() {
        QueryResult::NoData
    } else {
        QueryResult::Ready(rows)
    }
}

/// Query 4: mean engagement of explicit and clean songs on each platform, platform-major
pub fn explicit_vs_clean(view: &FilteredView<'_>) -> QueryResult<Vec<PlatformMean>> {
    let Some(types) = view.column(TRACK_TYPE) else {
        return QueryResult::Unavailable;
    };

    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (cell, &row) in types.zip(view.row_indices()) {
        if let Some(track_type) = cell.as_text() {
            groups.entry(track_type.to_string()).or_default().push(row);
        }
    }
    if groups.is_empty() {
        return QueryResult::NoData;
    }

    let mut rows = Vec::with_capacity(groups.len() * Platform::ALL.len());
    for platform in Platform::ALL {
        for (track_type, members) in &groups {
            let values: Vec<f64> = members
                .iter()
                .filter_map(|&row| number(view, row, platform.column()))
                .collect();
            let average = mean(&values);
            rows.push(PlatformMean {
                track_type: track_type.clone(),
                platform,
                mean: average,
                label: average
                    .map(format_engagement)
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            });
        }
    }
    QueryResult::Ready(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::filter::FilterState;
    use crate::analytics::table::AnalyticsTable;
    use crate::domain::Table;

    fn ranked_table(n: usize) -> AnalyticsTable {
        let columns = [
            "Track",
            "Artist",
            "All Time Rank",
            "Spotify Streams",
            "YouTube Views",
            "TikTok Views",
            "Spotify Playlist Count",
            "Explicit Track",
        ];
        let mut table = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for i in 0..n {
            // Ranks arrive in reverse so sorting is observable
            let rank = (n - i).to_string();
            let streams = ((n - i) as u64 * 1_000_000_000).to_string();
            let youtube = if i % 2 == 0 { "500000000".to_string() } else { String::new() };
            let fields = [
                format!("Song {}", rank),
                "Artist".to_string(),
                rank,
                streams,
                youtube,
                String::new(),
                "100".to_string(),
                (i % 2 == 0).to_string(),
            ];
            table.push_row(fields.iter().map(|f| Value::from_field(f)).collect());
        }
        AnalyticsTable::from_cleaned(table)
    }

    #[test]
    fn test_format_engagement() {
        assert_eq!(format_engagement(2_345_000_000.0), "2.3B");
        assert_eq!(format_engagement(1_000_000_000.0), "1.0B");
        assert_eq!(format_engagement(12_340_000.0), "12.3M");
        assert_eq!(format_engagement(999_999.0), "999999");
        assert_eq!(format_engagement(42.0), "42");
    }

    #[test]
    fn test_top_fifteen_on_ten_rows_returns_all_ascending() {
        let analytics = ranked_table(10);
        let view = FilterState::default().apply(&analytics);
        let rows = rank_vs_virality(&view).data().cloned().unwrap();

        assert_eq!(rows.len(), 10);
        let ranks: Vec<f64> = rows.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, (1..=10).map(|r| r as f64).collect::<Vec<_>>());
        assert_eq!(rows[0].track, "Song 1");
        assert_eq!(rows[0].spotify_billions, Some(1.0));
        assert_eq!(rows[0].tiktok_billions, 0.0);
    }

    #[test]
    fn test_top_fifteen_truncates_larger_tables() {
        let analytics = ranked_table(40);
        let view = FilterState::default().apply(&analytics);
        let rows = rank_vs_playlists(&view).data().cloned().unwrap();
        assert_eq!(rows.len(), TOP_RANKED);
        assert_eq!(rows.last().unwrap().rank, 15.0);
        assert_eq!(rows[0].playlist_count, 100.0);
    }

    #[test]
    fn test_rank_ties_keep_table_order() {
        let analytics = AnalyticsTable::from_cleaned(Table::from_fields(
            &["Track", "All Time Rank"],
            &[&["second", "2"], &["first-a", "1"], &["first-b", "1"], &["none", ""]],
        ));
        let view = FilterState::default().apply(&analytics);
        let tracks: Vec<String> = rank_vs_virality(&view)
            .data()
            .unwrap()
            .iter()
            .map(|r| r.track.clone())
            .collect();
        assert_eq!(tracks, vec!["first-a", "first-b", "second"]);
    }

    #[test]
    fn test_rank_queries_without_rank_column() {
        let analytics = AnalyticsTable::from_cleaned(Table::from_fields(&["Track"], &[&["a"]]));
        let view = FilterState::default().apply(&analytics);
        assert_eq!(rank_vs_virality(&view), QueryResult::Unavailable);
        assert_eq!(rank_vs_playlists(&view), QueryResult::Unavailable);
    }

    #[test]
    fn test_rank_vs_playlists_fills_missing_values_with_zero() {
        let analytics = AnalyticsTable::from_cleaned(Table::from_fields(
            &["Track", "All Time Rank", "Spotify Streams", "Spotify Playlist Count"],
            &[
                &["Unranked", "", "4000000000", "900"],
                &["No Streams", "2", "", "300"],
                &["No Playlists", "1", "2500000000", ""],
            ],
        ));
        let view = FilterState::default().apply(&analytics);
        let rows = rank_vs_playlists(&view).data().cloned().unwrap();

        assert_eq!(
            rows,
            vec![
                RankedPlaylist {
                    rank: 1.0,
                    track: "No Playlists".to_string(),
                    spotify_billions: 2.5,
                    playlist_count: 0.0,
                },
                RankedPlaylist {
                    rank: 2.0,
                    track: "No Streams".to_string(),
                    spotify_billions: 0.0,
                    playlist_count: 300.0,
                },
            ]
        );
    }

    #[test]
    fn test_rank_queries_on_empty_view_have_no_data() {
        let empty = AnalyticsTable::from_cleaned(Table::from_fields(&["All Time Rank"], &[]));
        let view = FilterState::default().apply(&empty);
        assert_eq!(rank_vs_virality(&view), QueryResult::NoData);
        assert_eq!(rank_vs_playlists(&view), QueryResult::NoData);
    }

    #[test]
    fn test_platform_share_excludes_missing_and_reports_shares() {
        let analytics = AnalyticsTable::from_cleaned(Table::from_fields(
            &["Spotify Streams", "YouTube Views", "TikTok Views"],
            &[&["300", "", "100"], &["", "600", ""]],
        ));
        let view = FilterState::default().apply(&analytics);
        let slices = platform_share(&view).data().cloned().unwrap();

        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].platform, Platform::Spotify);
        assert_eq!(slices[0].total, 300.0);
        assert_eq!(slices[1].total, 600.0);
        assert_eq!(slices[2].total, 100.0);
        assert!((slices[1].share - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_platform_share_all_zero_is_no_data() {
        let analytics = AnalyticsTable::from_cleaned(Table::from_fields(
            &["Spotify Streams", "YouTube Views", "TikTok Views"],
            &[&["0", "0", ""], &["", "0", "0"]],
        ));
        let view = FilterState::default().apply(&analytics);
        assert_eq!(platform_share(&view), QueryResult::NoData);

        let bare = AnalyticsTable::from_cleaned(Table::from_fields(&["Track"], &[&["a"]]));
        assert_eq!(platform_share(&FilterState::default().apply(&bare)), QueryResult::NoData);
    }

    #[test]
    fn test_explicit_vs_clean_is_platform_major() {
        let analytics = AnalyticsTable::from_cleaned(Table::from_fields(
            &["Explicit Track", "Spotify Streams", "YouTube Views", "TikTok Views"],
            &[
                &["True", "2000000000", "4000000", ""],
                &["True", "1000000000", "2000000", ""],
                &["False", "500", "", ""],
            ],
        ));
        let view = FilterState::default().apply(&analytics);
        let rows = explicit_vs_clean(&view).data().cloned().unwrap();

        assert_eq!(rows.len(), 6);
        let keys: Vec<(&str, Platform)> = rows
            .iter()
            .map(|r| (r.track_type.as_str(), r.platform))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Clean", Platform::Spotify),
                ("Explicit", Platform::Spotify),
                ("Clean", Platform::YouTube),
                ("Explicit", Platform::YouTube),
                ("Clean", Platform::TikTok),
                ("Explicit", Platform::TikTok),
            ]
        );
        assert_eq!(rows[0].label, "500");
        assert_eq!(rows[1].label, "1.5B");
        assert_eq!(rows[3].label, "3.0M");
        assert_eq!(rows[2].mean, None);
        assert_eq!(rows[2].label, NOT_AVAILABLE);
    }

    #[test]
    fn test_explicit_vs_clean_unavailable_without_track_type() {
        let analytics = AnalyticsTable::from_cleaned(Table::from_fields(&["Track"], &[&["a"]]));
        let view = FilterState::default().apply(&analytics);
        assert_eq!(explicit_vs_clean(&view), QueryResult::Unavailable);
    }
}
