//! Column type resolution strategies.
//!
//! Raw values are classified one by one and counted in a [`TypeFrequencies`]
//! table that remembers first-observation order. A [`TypeResolutionStrategy`]
//! then turns that table into a single column type.

use super::classify::classify_value;
use crate::core::{ColumnType, CsvDbError};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// How per-value observations are aggregated into one column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AnalysisMethod {
    /// The type observed most often; ties go to the type seen first.
    MostFrequent,
    /// All observed types widened into one.
    #[default]
    BestMatch,
}

impl AnalysisMethod {
    pub fn strategy(&self) -> &'static dyn TypeResolutionStrategy {
        match self {
            AnalysisMethod::MostFrequent => &MostFrequentStrategy,
            AnalysisMethod::BestMatch => &BestMatchStrategy,
        }
    }
}

impl fmt::Display for AnalysisMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMethod::MostFrequent => f.write_str("MostFrequent"),
            AnalysisMethod::BestMatch => f.write_str("BestMatch"),
        }
    }
}

impl FromStr for AnalysisMethod {
    type Err = CsvDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "mostfrequent" => Ok(AnalysisMethod::MostFrequent),
            "bestmatch" => Ok(AnalysisMethod::BestMatch),
            _ => Err(CsvDbError::invalid_config("ANALYSISMETHOD", s)),
        }
    }
}

/// Occurrence counts per type, in order of first observation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeFrequencies {
    counts: Vec<(ColumnType, usize)>,
}

impl TypeFrequencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies and counts every value. `None` and empty values are skipped.
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut frequencies = Self::new();
        for data_type in values.into_iter().flatten().filter_map(classify_value) {
            frequencies.record(data_type);
        }
        frequencies
    }

    pub fn record(&mut self, data_type: ColumnType) {
        match self.counts.iter_mut().find(|(t, _)| *t == data_type) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((data_type, 1)),
        }
    }

    pub fn count(&self, data_type: ColumnType) -> usize {
        self.counts
            .iter()
            .find(|(t, _)| *t == data_type)
            .map_or(0, |(_, count)| *count)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColumnType, usize)> + '_ {
        self.counts.iter().copied()
    }

    pub fn types(&self) -> impl Iterator<Item = ColumnType> + '_ {
        self.counts.iter().map(|(t, _)| *t)
    }
}

/// Strategy for turning observed type counts into a column type.
pub trait TypeResolutionStrategy: Send + Sync {
    /// Resolves the column type. An empty table resolves to `String`.
    fn resolve(&self, frequencies: &TypeFrequencies) -> ColumnType;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MostFrequentStrategy;

impl TypeResolutionStrategy for MostFrequentStrategy {
    fn resolve(&self, frequencies: &TypeFrequencies) -> ColumnType {
        let mut best: Option<(ColumnType, usize)> = None;
        for (data_type, count) in frequencies.iter() {
            // strict comparison keeps the first-observed type on ties
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((data_type, count));
            }
        }
        best.map_or(ColumnType::String, |(data_type, _)| data_type)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BestMatchStrategy;

impl TypeResolutionStrategy for BestMatchStrategy {
    fn resolve(&self, frequencies: &TypeFrequencies) -> ColumnType {
        frequencies
            .types()
            .reduce(widen)
            .unwrap_or(ColumnType::String)
    }
}

/// Narrowest type able to represent values of both `a` and `b`.
///
/// Booleans only combine with booleans, numerics widen to `Float`, date/times
/// only combine with date/times; every other pairing is `String`. The
/// operation is commutative and associative, so fold order never matters.
pub fn widen(a: ColumnType, b: ColumnType) -> ColumnType {
    match (a, b) {
        (ColumnType::Boolean, ColumnType::Boolean) => ColumnType::Boolean,
        (ColumnType::DateTime, ColumnType::DateTime) => ColumnType::DateTime,
        (x, y) if x.is_numeric() && y.is_numeric() => ColumnType::Float,
        _ => ColumnType::String,
    }
}

/// Infers the type of one column from its sampled raw values.
pub fn infer_column_type<'a, I>(values: I, method: AnalysisMethod) -> ColumnType
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let frequencies = TypeFrequencies::from_values(values);
    method.strategy().resolve(&frequencies)
}
