//! Input Validation Module
//!
//! Checks applied to names that come from configuration or catalog rows
//! before they are spliced into generated DDL.
//!
//! Catalog names arrive already quoted by the query layer, so these checks
//! are about shape (qualified, non-empty, within the engine's identifier
//! limit), not about escaping.

use crate::config::MAX_IDENTIFIER_LENGTH;
use crate::error::{BackupError, BackupResult};
use crate::utils::split_qualified_name;

/// Validate that a name is `schema.name` with both parts present
///
/// # Examples
///
/// ```rust
/// use gp_predata::validation::validate_qualified_name;
///
/// assert!(validate_qualified_name("public.orders", "relation").is_ok());
/// assert!(validate_qualified_name("orders", "relation").is_err());
/// ```
pub fn validate_qualified_name(name: &str, param_name: &str) -> BackupResult<()> {
    if name.is_empty() {
        return Err(BackupError::InvalidIdentifier {
            identifier: name.to_string(),
            reason: format!("{param_name} cannot be empty"),
        });
    }

    if split_qualified_name(name).is_none() {
        return Err(BackupError::InvalidIdentifier {
            identifier: sanitize_for_logging(name),
            reason: format!("{param_name} must be schema-qualified (schema.name)"),
        });
    }

    Ok(())
}

/// Validate a single (possibly quoted) identifier against the engine limit
///
/// The limit applies to the stored name: surrounding quotes do not count and
/// an escaped `""` counts as one byte.
pub fn validate_identifier_length(identifier: &str) -> BackupResult<()> {
    if identifier.is_empty() || identifier == "\"\"" {
        return Err(BackupError::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason: "Identifier cannot be empty".to_string(),
        });
    }

    let quoted = identifier.len() >= 2 && identifier.starts_with('"') && identifier.ends_with('"');
    let length = if quoted {
        let inner = &identifier[1..identifier.len() - 1];
        inner.len() - inner.matches("\"\"").count()
    } else {
        identifier.len()
    };

    if length > MAX_IDENTIFIER_LENGTH {
        return Err(BackupError::InvalidIdentifier {
            identifier: sanitize_for_logging(identifier),
            reason: format!(
                "Identifier is {} bytes, limit is {}",
                length,
                MAX_IDENTIFIER_LENGTH
            ),
        });
    }

    Ok(())
}

/// Sanitize string for safe logging (truncate and escape control characters)
pub fn sanitize_for_logging(s: &str) -> String {
    let max_len = 50;
    let truncated = if s.chars().count() > max_len {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    } else {
        s.to_string()
    };

    truncated
        .replace('\0', "\\0")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}
