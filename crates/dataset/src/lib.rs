//! # Dataset Crate
//!
//! This crate loads and holds the read-only rating snapshot the matching
//! engine runs against.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (RatingTable, PopularityIndex, MovieCatalog)
//! - **parser**: Parse the snapshot CSV files
//! - **snapshot**: Load the three files in parallel into a validated Snapshot
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use dataset::Snapshot;
//! use std::path::Path;
//!
//! // Load the entire snapshot
//! let snapshot = Snapshot::load_from_dir(Path::new("data/snapshot"))?;
//!
//! // Query data
//! let rating = snapshot.table.rating(1, 10);
//! let title = snapshot.catalog.title(10);
//!
//! println!("{} users loaded", snapshot.table.user_count());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod snapshot;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use snapshot::Snapshot;
pub use types::{
    // Type aliases
    UserId,
    MovieId,
    // Core types
    RatingTable,
    PopularityIndex,
    MovieCatalog,
    MovieEntry,
    // Rating bounds
    MIN_RATING_VALUE,
    MAX_RATING_VALUE,
};
