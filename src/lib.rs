pub mod config;
pub mod constants;
pub mod granule;
pub mod granulite;
pub mod granulite_errors;
pub mod index_mask;
pub mod instrument;
pub mod matcher;
pub mod night;
pub mod range;
pub mod registry;
pub mod small_set;
pub mod target;

pub use config::MatchingConfig;
pub use granulite::Granulite;
pub use range::Range;
