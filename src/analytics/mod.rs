//! Analytics view: filters, headline metrics and the four canned queries computed over
//! the cleaned table.

pub mod filter;
pub mod metrics;
pub mod queries;
pub mod table;
pub mod view;

pub use filter::{FilterBounds, FilterState, FilteredView};
pub use metrics::HeadlineMetrics;
pub use queries::{Platform, QueryResult};
pub use table::AnalyticsTable;
pub use view::{compute_view, ViewResult};
