use std::fmt;

pub mod testing;

/// Main error type for predata DDL synthesis
#[derive(Debug, Clone, PartialEq)]
pub enum BackupError {
    // ============ Catalog Input Errors ============
    /// A table reached the renderer without a `TableDefinition`
    MissingTableDefinition {
        relation: String,
    },

    /// Raw ACL item could not be parsed
    InvalidAclItem {
        item: String,
        reason: String,
    },

    /// Identifier cannot be rendered as a valid name
    InvalidIdentifier {
        identifier: String,
        reason: String,
    },

    // ============ Dependency Errors ============
    /// Cycle that no shell type can break
    DependencyCycle {
        entities: Vec<String>,
    },

    /// Two sortable objects share one qualified name
    DuplicateObject {
        name: String,
    },

    // ============ Configuration Errors ============
    /// Configuration error (inconsistent flags or constants)
    ConfigError {
        setting: String,
        value: String,
        reason: String,
    },

    // ============ I/O and System Errors ============
    /// Serialization/deserialization failed
    SerializationError {
        message: String,
    },

    /// Internal error (bug in the synthesizer)
    InternalError {
        message: String,
        file: &'static str,
        line: u32,
    },
}

impl BackupError {
    /// Create internal error with file/line info
    pub fn internal(message: String, file: &'static str, line: u32) -> Self {
        BackupError::InternalError { message, file, line }
    }
}

impl fmt::Display for BackupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BackupError::*;
        match self {
            MissingTableDefinition { relation } => {
                write!(f, "No table definition found for relation '{}'", relation)
            }
            InvalidAclItem { item, reason } => {
                write!(f, "Invalid ACL item '{}': {}", item, reason)
            }
            InvalidIdentifier { identifier, reason } => {
                write!(f, "Invalid identifier '{}': {}", identifier, reason)
            }
            DependencyCycle { entities } => {
                write!(
                    f,
                    "Dependency resolution failed; unresolvable cycle among: {}",
                    entities.join(", ")
                )
            }
            DuplicateObject { name } => {
                write!(f, "Object '{}' appears more than once in the dependency graph", name)
            }
            ConfigError { setting, value, reason } => {
                write!(f, "Configuration error for '{}': {} (value: {})", setting, reason, value)
            }
            SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
            InternalError { message, file, line } => {
                write!(f, "Internal error at {}:{}: {}\nPlease report this bug.",
                       file, line, message)
            }
        }
    }
}

impl std::error::Error for BackupError {}

/// Result type for predata operations
pub type BackupResult<T> = Result<T, BackupError>;

/// Convert serde_json::Error to BackupError
impl From<serde_json::Error> for BackupError {
    fn from(e: serde_json::Error) -> Self {
        BackupError::SerializationError {
            message: format!("JSON serialization error: {}", e),
        }
    }
}

/// Convert regex::Error to BackupError
impl From<regex::Error> for BackupError {
    fn from(e: regex::Error) -> Self {
        BackupError::InternalError {
            message: format!("Regex compilation failed: {}", e),
            file: file!(),
            line: line!(),
        }
    }
}

/// Helper macro for creating internal errors with automatic file/line
#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::error::BackupError::internal($msg.to_string(), file!(), line!())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::BackupError::internal(format!($fmt, $($arg)*), file!(), line!())
    };
}

/// Helper macro for requiring a value or returning error
#[macro_export]
macro_rules! require {
    ($opt:expr, $err:expr) => {
        match $opt {
            Some(v) => v,
            None => return Err($err),
        }
    };
}
