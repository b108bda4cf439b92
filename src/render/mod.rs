//! Output adapters for a computed view: a terminal text report and a JSON chart
//! specification for an external charting front end.

pub mod chart_spec;
pub mod text;

pub use chart_spec::ChartSpecBuilder;
pub use text::{render_text, TextReport};

use crate::analytics::ViewResult;
use crate::constants::DATA_SOURCE_URL;

/// "Showing X of Y tracks" plus the data source
pub fn footer(view: &ViewResult<'_>) -> String {
    let (shown, total) = view.showing();
    format!("Showing {} of {} tracks | Data source: {}", shown, total, DATA_SOURCE_URL)
}
