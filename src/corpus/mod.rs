//! Corpus loading: turns the scraper's JSON document into retrievable chunks.

mod loader;

pub use loader::{load, load_file, Chunk, TABLE_CELL_DELIMITER};
