//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

/// Validate a concept id given on the command line.
///
/// Ids are free-form in datasets, but an argument must be non-empty and
/// free of whitespace to be unambiguous.
pub fn validate_node_id(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Concept id cannot be empty".to_string());
    }

    if s.chars().any(char::is_whitespace) {
        return Err(format!("Concept id cannot contain whitespace: '{s}'"));
    }

    Ok(s.to_string())
}

/// Validate the generated-id length override.
///
/// Delegates to the config validator to keep a single source of truth for
/// the accepted range.
pub fn validate_id_length(s: &str) -> Result<usize, String> {
    let length: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid id length: '{s}'"))?;
    crate::config::validate_id_length(length).map_err(|e| e.to_string())?;
    Ok(length)
}
