#[cfg(test)]
/// # Panics
/// Panics if the result is `Ok` or the error is not a dependency cycle naming
/// exactly `expected_entities` (order-insensitive).
pub fn assert_dependency_cycle<T: std::fmt::Debug>(
    result: crate::BackupResult<T>,
    expected_entities: &[&str],
) {
    match result {
        Err(crate::BackupError::DependencyCycle { entities }) => {
            let mut actual: Vec<&str> = entities.iter().map(String::as_str).collect();
            let mut expected = expected_entities.to_vec();
            actual.sort_unstable();
            expected.sort_unstable();
            assert_eq!(actual, expected, "Cycle names the wrong entities");
        }
        Err(e) => {
            panic!("Expected a dependency cycle, got: {e}");
        }
        Ok(value) => {
            panic!("Expected a dependency cycle, but sorting succeeded: {value:?}");
        }
    }
}

#[cfg(test)]
/// # Panics
/// Panics if the result is `Ok` (operation succeeded when error was expected).
pub fn assert_error_contains<T>(
    result: crate::BackupResult<T>,
    expected_substring: &str,
) {
    match result {
        Err(e) => {
            let message = e.to_string();
            assert!(
                message.contains(expected_substring),
                "Error message '{message}' does not contain '{expected_substring}'"
            );
        }
        Ok(_) => {
            panic!("Expected error containing '{expected_substring}', but operation succeeded");
        }
    }
}
