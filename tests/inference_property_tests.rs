//! Property-based tests for column type inference using proptest.

use csvdb::inference::{TypeFrequencies, infer_column_type};
use csvdb::{AnalysisMethod, ColumnType};
use proptest::prelude::*;

/// Raw field spellings covering every classification outcome.
const LITERALS: &[&str] = &[
    "1",
    "0",
    "-7",
    "2.5",
    "1e3",
    "true",
    "FALSE",
    "2020-01-01",
    "2021-02-03 10:00:00",
    "06/15/2020",
    "hello",
    "NaN",
    "",
    " ",
];

const BLANKS: &[&str] = &["", " ", "\t", "  "];

fn literal() -> impl Strategy<Value = &'static str> {
    prop::sample::select(LITERALS)
}

fn infer(values: &[&str], method: AnalysisMethod) -> ColumnType {
    infer_column_type(values.iter().map(|v| Some(*v)), method)
}

proptest! {
    #[test]
    fn best_match_ignores_row_order(
        (values, shuffled) in prop::collection::vec(literal(), 0..40)
            .prop_flat_map(|values| (Just(values.clone()), Just(values).prop_shuffle()))
    ) {
        prop_assert_eq!(
            infer(&values, AnalysisMethod::BestMatch),
            infer(&shuffled, AnalysisMethod::BestMatch)
        );
    }

    #[test]
    fn most_frequent_is_deterministic(values in prop::collection::vec(literal(), 0..40)) {
        let first = infer(&values, AnalysisMethod::MostFrequent);
        let second = infer(&values, AnalysisMethod::MostFrequent);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn most_frequent_picks_a_top_count(values in prop::collection::vec(literal(), 1..40)) {
        let frequencies = TypeFrequencies::from_values(values.iter().map(|v| Some(*v)));
        let chosen = infer(&values, AnalysisMethod::MostFrequent);

        match frequencies.iter().map(|(_, count)| count).max() {
            Some(max) => prop_assert_eq!(frequencies.count(chosen), max),
            None => prop_assert_eq!(chosen, ColumnType::String),
        }
    }

    #[test]
    fn empty_columns_are_strings(
        values in prop::collection::vec(prop::sample::select(BLANKS), 0..20),
        nulls in 0usize..5,
    ) {
        let column = values
            .iter()
            .map(|v| Some(*v))
            .chain(std::iter::repeat_n(None, nulls));
        prop_assert_eq!(
            infer_column_type(column.clone(), AnalysisMethod::BestMatch),
            ColumnType::String
        );
        prop_assert_eq!(
            infer_column_type(column, AnalysisMethod::MostFrequent),
            ColumnType::String
        );
    }

    #[test]
    fn numeric_columns_widen_to_float(
        values in prop::collection::vec(any::<i32>().prop_map(|n| n.to_string()), 1..20),
        decimals in prop::collection::vec(-1.0e6f64..1.0e6, 0..5),
    ) {
        let mut column: Vec<String> = values;
        column.extend(decimals.iter().map(|f| f.to_string()));
        let refs: Vec<&str> = column.iter().map(String::as_str).collect();

        prop_assert_eq!(infer(&refs, AnalysisMethod::BestMatch), ColumnType::Float);
    }
}
