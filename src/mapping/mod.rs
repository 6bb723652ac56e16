//! Field mapper - turns arbitrary template field labels into canonical data keys.
//!
//! Normalization is fixed (lower-case, keep only letters and digits); which
//! normalized labels map to which key is data supplied by an [`AliasTable`].

mod aliases;
pub mod keys;

use std::collections::HashMap;
use std::sync::Arc;

use aliases::DEFAULT_ALIAS_MAP;

/// Lookup from a normalized field label to a canonical key.
pub trait AliasTable: Send + Sync {
    fn resolve(&self, normalized: &str) -> Option<&str>;
}

/// The alias set shipped with the server.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAliases;

impl AliasTable for DefaultAliases {
    fn resolve(&self, normalized: &str) -> Option<&str> {
        DEFAULT_ALIAS_MAP.get(normalized).copied()
    }
}

/// Alias table built at runtime, e.g. for a customer-specific form set.
#[derive(Debug, Default, Clone)]
pub struct MapAliasTable {
    entries: HashMap<String, String>,
}

impl MapAliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alias. The alias is normalized on the way in.
    pub fn with(mut self, alias: &str, key: impl Into<String>) -> Self {
        self.entries.insert(normalize_field_name(alias), key.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A: AsRef<str>, K: Into<String>> FromIterator<(A, K)> for MapAliasTable {
    fn from_iter<I: IntoIterator<Item = (A, K)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |table, (alias, key)| table.with(alias.as_ref(), key))
    }
}

impl AliasTable for MapAliasTable {
    fn resolve(&self, normalized: &str) -> Option<&str> {
        self.entries.get(normalized).map(String::as_str)
    }
}

/// Lower-case and strip everything that is not a letter or digit.
pub fn normalize_field_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Clone)]
pub struct FieldMapper {
    aliases: Arc<dyn AliasTable>,
}

impl FieldMapper {
    pub fn new(aliases: Arc<dyn AliasTable>) -> Self {
        Self { aliases }
    }

    /// Canonical key for `raw`, or `None` when the label is unknown.
    pub fn map_field_name(&self, raw: &str) -> Option<&str> {
        let normalized = normalize_field_name(raw);
        if normalized.is_empty() {
            return None;
        }
        self.aliases.resolve(&normalized)
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new(Arc::new(DefaultAliases))
    }
}

impl std::fmt::Debug for FieldMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldMapper").finish_non_exhaustive()
    }
}
