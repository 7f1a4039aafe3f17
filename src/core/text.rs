//! Small string helpers shared by configuration parsing and value conversion.

/// Permissive boolean parsing: `true/t/1/yes/y` and `false/f/0/no/n`,
/// case-insensitive, surrounding whitespace ignored.
pub fn parse_bool(source: &str) -> Option<bool> {
    match source.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Strict boolean literal check used by type classification.
pub fn is_bool_literal(source: &str) -> bool {
    let trimmed = source.trim();
    trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false")
}
