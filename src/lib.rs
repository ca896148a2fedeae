//! Player-statistics dashboard data layer.
//!
//! Loads a player CSV, normalizes the monetary columns, imputes gaps with
//! column means, buckets ages and answers the queries behind each
//! dashboard page.

pub mod age;
pub mod cache;
pub mod currency;
pub mod dataset;
pub mod error;
pub mod formatting;
pub mod views;

pub use age::AgeBucket;
pub use cache::{CacheStatus, DatasetCache};
pub use currency::normalize_currency;
pub use dataset::{Dataset, NormalizedRecord, ParsePolicy, PlayerRecord, prepare};
pub use error::{CurrencyError, FieldParseError, LoadError};
pub use formatting::format_euro;
