//! JSON chart specification of a computed view
//!
//! The output is a panel list laid out on a 24-column grid, one stat panel per headline
//! metric followed by one chart panel per canned query. A front end only needs to draw it.

use serde::Serialize;
use serde_json::{json, Value};

use crate::analytics::{QueryResult, ViewResult};
use crate::constants::DATA_SOURCE_URL;
use crate::render::footer;

const GRID_WIDTH: u32 = 24;
const CHART_WIDTH: u32 = 12;
const CHART_HEIGHT: u32 = 8;
const STAT_HEIGHT: u32 = 3;

/// Builder for the chart specification of one view
pub struct ChartSpecBuilder<'v, 'a> {
    title: String,
    view: &'v ViewResult<'a>,
}

fn data_or_status<T: Serialize>(result: &QueryResult<T>) -> Value {
    match result {
        QueryResult::Ready(data) => json!({ "status": "ready", "data": data }),
        QueryResult::NoData => json!({
            "status": "no_data",
            "message": "No data available for current filters"
        }),
        QueryResult::Unavailable => json!({
            "status": "unavailable",
            "message": "Not available for this dataset"
        }),
    }
}

impl<'v, 'a> ChartSpecBuilder<'v, 'a> {
    pub fn new(view: &'v ViewResult<'a>) -> Self {
        Self {
            title: "Most Streamed Spotify Songs 2024".to_string(),
            view,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn stat_panels(&self, panel_id: &mut u32) -> Vec<Value> {
        let cards = self.view.metrics.render();
        let width = GRID_WIDTH / cards.len() as u32;
        cards
            .into_iter()
            .enumerate()
            .map(|(i, (label, value))| {
                let panel = json!({
                    "id": *panel_id,
                    "type": "stat",
                    "title": label,
                    "value": value,
                    "gridPos": { "x": i as u32 * width, "y": 0, "w": width, "h": STAT_HEIGHT }
                });
                *panel_id += 1;
                panel
            })
            .collect()
    }

    fn chart_panels(&self, panel_id: &mut u32) -> Vec<Value> {
        let view = self.view;
        let charts = [
            (
                "bar",
                "Does Spotify rank predict cross-platform virality?",
                "Billions of plays per platform for the top 15 songs by All Time Rank",
                data_or_status(&view.virality),
            ),
            (
                "pie",
                "Which platform drives the most engagement?",
                "Total plays per platform",
                data_or_status(&view.platform_share),
            ),
            (
                "scatter",
                "Do playlists drive streams among top songs?",
                "Spotify streams against playlist count for the top 15 songs",
                data_or_status(&view.playlist_influence),
            ),
            (
                "grouped_bar",
                "Explicit vs clean performance by platform",
                "Mean plays per platform by track type",
                data_or_status(&view.explicit_comparison),
            ),
        ];

        let mut x = 0;
        let mut y = STAT_HEIGHT;
        let mut panels = Vec::with_capacity(charts.len());
        for (kind, title, description, data) in charts {
            panels.push(json!({
                "id": *panel_id,
                "type": kind,
                "title": title,
                "description": description,
                "gridPos": { "x": x, "y": y, "w": CHART_WIDTH, "h": CHART_HEIGHT },
                "data": data
            }));
            *panel_id += 1;

            x += CHART_WIDTH;
            if x >= GRID_WIDTH {
                x = 0;
                y += CHART_HEIGHT;
            }
        }
        panels
    }

    pub fn build(&self) -> Value {
        let mut panel_id = 1;
        let mut panels = self.stat_panels(&mut panel_id);
        panels.extend(self.chart_panels(&mut panel_id));

        let (shown, total) = self.view.showing();
        json!({
            "title": self.title.clone(),
            "filters": self.view.filters,
            "rows": { "shown": shown, "total": total },
            "panels": panels,
            "footer": footer(self.view),
            "source": DATA_SOURCE_URL
        })
    }
}
