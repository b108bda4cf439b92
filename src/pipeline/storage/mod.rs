// Durable storage for cleaned tables and the in-process cache over them

pub mod cache;
pub mod csv_store;

pub use cache::TableCache;
pub use csv_store::{write_table, write_table_file};
