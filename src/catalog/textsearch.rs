use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::make_fqn;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSearchParser {
    pub oid: u32,
    pub schema: String,
    pub name: String,
    pub start_func: String,
    pub token_func: String,
    pub end_func: String,
    pub lex_types_func: String,
    pub headline_func: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSearchTemplate {
    pub oid: u32,
    pub schema: String,
    pub name: String,
    pub init_func: String,
    pub lexize_func: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSearchDictionary {
    pub oid: u32,
    pub schema: String,
    pub name: String,
    pub template: String,
    /// Pre-rendered `key = value` init options
    pub init_option: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSearchConfiguration {
    pub oid: u32,
    pub schema: String,
    pub name: String,
    pub parser: String,
    /// Token type -> dictionaries; iteration order is sorted by token
    pub token_to_dicts: BTreeMap<String, Vec<String>>,
}

macro_rules! impl_fqn {
    ($($ty:ty),*) => {
        $(impl $ty {
            pub fn fqn(&self) -> String {
                make_fqn(&self.schema, &self.name)
            }
        })*
    };
}

impl_fqn!(TextSearchParser, TextSearchTemplate, TextSearchDictionary, TextSearchConfiguration);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_tokens_iterate_sorted() {
        let mut config = TextSearchConfiguration::default();
        config.token_to_dicts.insert("word".to_string(), vec!["simple".to_string()]);
        config.token_to_dicts.insert("asciiword".to_string(), vec!["english_stem".to_string()]);

        let tokens: Vec<&String> = config.token_to_dicts.keys().collect();
        assert_eq!(tokens, vec!["asciiword", "word"]);
    }

    #[test]
    fn test_fqn() {
        let parser = TextSearchParser {
            schema: "public".to_string(),
            name: "testparser".to_string(),
            ..Default::default()
        };
        assert_eq!(parser.fqn(), "public.testparser");
    }
}
