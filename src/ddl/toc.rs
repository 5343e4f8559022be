use serde::{Deserialize, Serialize};

/// Table-of-contents record for one emitted statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub schema: String,
    /// Object the statement hangs off when it is not the object itself
    /// (the table or domain of a constraint)
    pub reference_object: String,
    pub name: String,
    pub object_type: String,
}

impl CatalogEntry {
    pub fn new(schema: &str, reference_object: &str, name: &str, object_type: &str) -> Self {
        CatalogEntry {
            schema: schema.to_string(),
            reference_object: reference_object.to_string(),
            name: name.to_string(),
            object_type: object_type.to_string(),
        }
    }
}

/// A statement and the catalog entry the archive writer files it under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedStatement {
    pub entry: CatalogEntry,
    pub statement: String,
}

/// Append-only text buffer that remembers which span belongs to which object
///
/// Renderers note `byte_count()` before printing an object and register the
/// span with `add_entry` afterwards, so entries always follow emission order.
#[derive(Debug, Default)]
pub struct MetadataWriter {
    buffer: String,
    entries: Vec<(CatalogEntry, usize, usize)>,
}

impl MetadataWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn byte_count(&self) -> usize {
        self.buffer.len()
    }

    pub fn print(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn println(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// Register everything printed since `start` under `entry`
    pub fn add_entry(&mut self, entry: CatalogEntry, start: usize) {
        let end = self.buffer.len();
        self.entries.push((entry, start, end));
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().map(|(entry, _, _)| entry)
    }

    pub fn contents(&self) -> &str {
        &self.buffer
    }

    /// Statements in emission order, surrounding whitespace trimmed
    pub fn statements(&self) -> Vec<EmittedStatement> {
        self.entries
            .iter()
            .map(|(entry, start, end)| EmittedStatement {
                entry: entry.clone(),
                statement: self.buffer[*start..*end].trim().to_string(),
            })
            .collect()
    }
}
