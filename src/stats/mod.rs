// GitHub statistics module.
// Aggregates profile, repository, language and contribution data into one cached summary.

pub mod aggregate;
pub mod aggregator;
pub mod source;
pub mod types;

pub use aggregator::{Aggregator, CACHE_KEY};
pub use source::StatsSource;
pub use types::*;
