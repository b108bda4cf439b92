use std::fmt;

use crate::analytics::{QueryResult, ViewResult};
use crate::domain::TrackType;
use crate::render::footer;

const RULE_WIDTH: usize = 70;

fn heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "-".repeat(RULE_WIDTH))
}

fn status_line<T>(f: &mut fmt::Formatter<'_>, result: &QueryResult<T>) -> fmt::Result {
    match result {
        QueryResult::NoData => writeln!(f, "No data available for current filters."),
        QueryResult::Unavailable => writeln!(f, "Not available for this dataset."),
        QueryResult::Ready(_) => Ok(()),
    }
}

fn describe_filters(view: &ViewResult<'_>) -> String {
    let f = &view.filters;
    let types = if f.track_types.is_empty() {
        "all".to_string()
    } else {
        f.track_types
            .iter()
            .map(TrackType::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let years = f
        .year_range
        .map(|(lo, hi)| format!("{}-{}", lo, hi))
        .unwrap_or_else(|| "all".to_string());
    let scores = f
        .score_range
        .map(|(lo, hi)| format!("{:.1}-{:.1}", lo, hi))
        .unwrap_or_else(|| "all".to_string());
    format!("Track type: {} | Years: {} | Score: {}", types, years, scores)
}

/// Plain-text dashboard for the terminal
pub struct TextReport<'v, 'a>(pub &'v ViewResult<'a>);

impl fmt::Display for TextReport<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;
        writeln!(f, "Most Streamed Spotify Songs 2024")?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(f, "{}", describe_filters(view))?;

        heading(f, "Key Metrics")?;
        for (label, value) in view.metrics.render() {
            writeln!(f, "  {:<12} {}", label, value)?;
        }

        heading(f, "Q1: Does Spotify rank predict cross-platform virality?")?;
        status_line(f, &view.virality)?;
        if let Some(rows) = view.virality.data() {
            writeln!(
                f,
                "  {:>4}  {:<30} {:<20} {:>9} {:>9} {:>9}",
                "Rank", "Track", "Artist", "Spotify", "YouTube", "TikTok"
            )?;
            for r in rows {
                let spotify = r
                    .spotify_billions
                    .map(|b| format!("{:.2}B", b))
                    .unwrap_or_else(|| "-".to_string());
                writeln!(
                    f,
                    "  {:>4}  {:<30} {:<20} {:>9} {:>8.2}B {:>8.2}B",
                    r.rank_int(),
                    truncate(&r.track, 30),
                    truncate(&r.artist, 20),
                    spotify,
                    r.youtube_billions,
                    r.tiktok_billions
                )?;
            }
        }

        heading(f, "Q2: Which platform drives the most engagement?")?;
        status_line(f, &view.platform_share)?;
        if let Some(slices) = view.platform_share.data() {
            for s in slices {
                writeln!(f, "  {:<8} {:>22.0} {:>6.1}%", s.platform.label(), s.total, s.share)?;
            }
        }

        heading(f, "Q3: Do playlists drive streams among top songs?")?;
        status_line(f, &view.playlist_influence)?;
        if let Some(rows) = view.playlist_influence.data() {
            writeln!(f, "  {:>4}  {:<30} {:>9} {:>10}", "Rank", "Track", "Streams", "Playlists")?;
            for r in rows {
                writeln!(
                    f,
                    "  {:>4}  {:<30} {:>8.2}B {:>10.0}",
                    r.rank_int(),
                    truncate(&r.track, 30),
                    r.spotify_billions,
                    r.playlist_count
                )?;
            }
        }

        heading(f, "Q4: Explicit vs clean performance by platform")?;
        status_line(f, &view.explicit_comparison)?;
        if let Some(rows) = view.explicit_comparison.data() {
            for r in rows {
                writeln!(f, "  {:<8} {:<9} {:>10}", r.platform.label(), r.track_type, r.label)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "{}", footer(view))
    }
}

pub fn render_text(view: &ViewResult<'_>) -> String {
    TextReport(view).to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('…');
        t
    }
}
