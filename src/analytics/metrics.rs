use serde::Serialize;

use crate::analytics::filter::FilteredView;
use crate::constants::{ARTIST, NOT_AVAILABLE, SPOTIFY_STREAMS, TRACK_SCORE, TRACK_TYPE};
use crate::domain::TrackType;

/// Characters of the top artist's name shown in the metric card
pub const TOP_ARTIST_DISPLAY_CHARS: usize = 15;

/// Headline numbers shown above the charts. `None` renders as the not-available sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineMetrics {
    pub total_songs: usize,
    pub avg_streams_millions: Option<f64>,
    pub explicit_pct: Option<f64>,
    pub avg_score: Option<f64>,
    pub top_artist: Option<String>,
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn or_not_available(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

impl HeadlineMetrics {
    pub fn compute(view: &FilteredView<'_>) -> Self {
        let avg_streams_millions = view
            .numbers(SPOTIFY_STREAMS)
            .and_then(|v| mean(&v))
            .map(|m| m / 1e6);

        let explicit_pct = view.column(TRACK_TYPE).and_then(|cells| {
            if view.is_empty() {
                return None;
            }
            let explicit = cells
                .filter(|v| v.as_text() == Some(TrackType::Explicit.as_str()))
                .count();
            Some(explicit as f64 / view.len() as f64 * 100.0)
        });

        let avg_score = view.numbers(TRACK_SCORE).and_then(|v| mean(&v));

        let top_artist = view.column(ARTIST).and_then(|cells| {
            // Counts in first-seen order so ties go to the earliest artist
            let mut counts: Vec<(&str, usize)> = Vec::new();
            for name in cells.filter_map(|v| v.as_text()) {
                match counts.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, c)) => *c += 1,
                    None => counts.push((name, 1)),
                }
            }
            let mut best: Option<(&str, usize)> = None;
            for (name, count) in counts {
                if best.map(|(_, c)| count > c).unwrap_or(true) {
                    best = Some((name, count));
                }
            }
            best.map(|(name, _)| name.to_string())
        });

        Self {
            total_songs: view.len(),
            avg_streams_millions,
            explicit_pct,
            avg_score,
            top_artist,
        }
    }

    pub fn top_artist_display(&self) -> Option<String> {
        self.top_artist
            .as_ref()
            .map(|name| name.chars().take(TOP_ARTIST_DISPLAY_CHARS).collect())
    }

    /// (label, value) pairs in card order
    pub fn render(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Songs", self.total_songs.to_string()),
            (
                "Avg Streams",
                or_not_available(self.avg_streams_millions.map(|m| format!("{:.1}M", m))),
            ),
            (
                "% Explicit",
                or_not_available(self.explicit_pct.map(|p| format!("{:.1}%", p))),
            ),
            (
                "Avg Score",
                or_not_available(self.avg_score.map(|s| format!("{:.1}", s))),
            ),
            ("Top Artist", or_not_available(self.top_artist_display())),
        ]
    }
}
