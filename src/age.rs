use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// One of six half-open age ranges, `[15, 20)` through `[40, 45)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub struct AgeBucket(u8);

// Labels are offset by one from the bucket ranges and the last one lists
// only four ages. Kept as published.
const AGE_LABELS: [&str; 6] = [
    "16,17,18,19,20",
    "21,22,23,24,25",
    "26,27,28,29,30",
    "31,32,33,34,35",
    "36,37,38,39,40",
    "41,42,43,44",
];

const FIRST_BUCKET_START: f64 = 15.0;
const LAST_BUCKET_END: f64 = 45.0;
const BUCKET_WIDTH: f64 = 5.0;
const BUCKET_COUNT: u8 = 6;

impl AgeBucket {
    /// Fractional ages fall into the range that contains them, so `19.5`
    /// is still category 1. `NaN` has no bucket.
    pub fn classify(age: f64) -> Option<Self> {
        if !(FIRST_BUCKET_START..LAST_BUCKET_END).contains(&age) {
            return None;
        }
        Self::all().find(|bucket| age < bucket.end())
    }

    fn end(self) -> f64 {
        BUCKET_WIDTH.mul_add(f64::from(self.0), FIRST_BUCKET_START)
    }

    pub fn from_category(category: u8) -> Option<Self> {
        (1..=BUCKET_COUNT).contains(&category).then_some(Self(category))
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (1..=BUCKET_COUNT).map(Self)
    }

    pub const fn category(self) -> u8 {
        self.0
    }

    pub const fn label(self) -> &'static str {
        AGE_LABELS[(self.0 - 1) as usize]
    }
}

impl From<AgeBucket> for u8 {
    fn from(bucket: AgeBucket) -> Self {
        bucket.0
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts either the category number (`"2"`) or its label (`"21,22,23,24,25"`).
impl FromStr for AgeBucket {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if let Ok(category) = trimmed.parse::<u8>() {
            return Self::from_category(category)
                .ok_or_else(|| format!("age group must be between 1 and {BUCKET_COUNT}"));
        }
        let compact: String = trimmed.chars().filter(|ch| !ch.is_whitespace()).collect();
        Self::all()
            .find(|bucket| bucket.label() == compact)
            .ok_or_else(|| format!("unknown age group '{input}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_left_inclusive() {
        let bucket = AgeBucket::classify(15.0).unwrap();
        assert_eq!(bucket.category(), 1);
        assert_eq!(bucket.label(), "16,17,18,19,20");
        assert_eq!(AgeBucket::classify(19.0).unwrap().category(), 1);
        assert_eq!(AgeBucket::classify(20.0).unwrap().category(), 2);
        assert_eq!(AgeBucket::classify(40.0).unwrap().category(), 6);
    }

    #[test]
    fn fractional_ages_use_the_containing_range() {
        assert_eq!(AgeBucket::classify(19.5).unwrap().category(), 1);
        assert_eq!(AgeBucket::classify(24.99).unwrap().category(), 2);
        assert_eq!(AgeBucket::classify(44.9).unwrap().category(), 6);
        assert_eq!(AgeBucket::classify(14.9), None);
    }

    #[test]
    fn last_bucket_keeps_four_age_label() {
        let bucket = AgeBucket::classify(44.0).unwrap();
        assert_eq!(bucket.category(), 6);
        assert_eq!(bucket.label(), "41,42,43,44");
    }

    #[test]
    fn out_of_range_ages_have_no_bucket() {
        assert_eq!(AgeBucket::classify(14.0), None);
        assert_eq!(AgeBucket::classify(45.0), None);
        assert_eq!(AgeBucket::classify(0.0), None);
        assert_eq!(AgeBucket::classify(f64::MAX), None);
        assert_eq!(AgeBucket::classify(f64::NAN), None);
    }

    #[test]
    fn parses_category_or_label() {
        assert_eq!("3".parse::<AgeBucket>().unwrap().category(), 3);
        assert_eq!("21, 22, 23, 24, 25".parse::<AgeBucket>().unwrap().category(), 2);
        assert!("7".parse::<AgeBucket>().is_err());
        assert!("teenagers".parse::<AgeBucket>().is_err());
    }
}
