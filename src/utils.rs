/// Join an already-quoted schema and object name into `schema.name`
pub fn make_fqn(schema: &str, name: &str) -> String {
    format!("{schema}.{name}")
}

/// Double every single quote so the text can sit inside a SQL literal
pub fn escape_single_quotes(text: &str) -> String {
    text.replace('\'', "''")
}

/// Split `schema.name` at the first dot that is not inside double quotes.
///
/// Names arrive already quoted where the engine needs it, so `"a.b".c` has
/// schema `"a.b"`. Returns `None` when there is no such dot or either side
/// is empty.
pub fn split_qualified_name(fqn: &str) -> Option<(&str, &str)> {
    let mut in_quotes = false;
    for (idx, ch) in fqn.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => {
                let (schema, rest) = (&fqn[..idx], &fqn[idx + 1..]);
                if schema.is_empty() || rest.is_empty() {
                    return None;
                }
                return Some((schema, rest));
            }
            _ => {}
        }
    }
    None
}

/// Split `schema.table.column` at the last unquoted dot.
///
/// Used for sequence owner columns, where the column is always the last part.
pub fn split_owning_column(qualified: &str) -> Option<(&str, &str)> {
    let mut in_quotes = false;
    let mut split_at = None;
    for (idx, ch) in qualified.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => split_at = Some(idx),
            _ => {}
        }
    }
    let idx = split_at?;
    let (table, column) = (&qualified[..idx], &qualified[idx + 1..]);
    if table.is_empty() || column.is_empty() {
        return None;
    }
    Some((table, column))
}
