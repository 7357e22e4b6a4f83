//! Name transliteration helpers shared across generation and emission.

/// Split an identifier into words at camelCase boundaries.
///
/// A word boundary is inserted before a capital letter that is followed by
/// lowercase letters, and before a capital letter that directly follows a
/// lowercase letter or digit. Separator characters (`-`, `.`, `_`, space)
/// also split words. This keeps capital runs together: `HTTPStatus` splits
/// into `HTTP` and `Status`.
fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '-' | '.' | '_' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let after_lower_or_digit = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            let ends_capital_run = prev.is_ascii_uppercase() && next_is_lower;
            if (after_lower_or_digit || ends_capital_run) && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Derive an enum constant name from a wire value: `workdayRaas` ->
/// `WORKDAY_RAAS`, `SALESFORCE` -> `SALESFORCE`.
pub fn enum_constant_name(value: &str) -> String {
    split_words(value)
        .iter()
        .map(|w| w.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert a type name to snake_case for module paths: `ForEachTask` ->
/// `for_each_task`.
pub fn to_snake_case(name: &str) -> String {
    split_words(name)
        .iter()
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_constant_name() {
        assert_eq!(enum_constant_name("myEnumValue"), "MY_ENUM_VALUE");
        assert_eq!(enum_constant_name("workdayRaas"), "WORKDAY_RAAS");
        assert_eq!(enum_constant_name("SALESFORCE"), "SALESFORCE");
    }

    #[test]
    fn test_enum_constant_name_capital_runs() {
        // Multi-capital run followed by lowercase
        assert_eq!(enum_constant_name("HTTPStatus"), "HTTP_STATUS");
        assert_eq!(enum_constant_name("parseHTTPResponse"), "PARSE_HTTP_RESPONSE");
    }

    #[test]
    fn test_enum_constant_name_separators() {
        assert_eq!(enum_constant_name("snowflake-import"), "SNOWFLAKE_IMPORT");
        assert_eq!(enum_constant_name("already_snake"), "ALREADY_SNAKE");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Task"), "task");
        assert_eq!(to_snake_case("ForEachTask"), "for_each_task");
        assert_eq!(to_snake_case("HTTPStatus"), "http_status");
        assert_eq!(to_snake_case("JobCluster"), "job_cluster");
    }
}
