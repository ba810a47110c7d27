use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Ordered category names, derived once from the packed categories field
/// and fixed for the life of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySchema {
    names: Vec<String>,
}

impl CategorySchema {
    /// Build a schema from explicit names. Names must be unique and non-empty.
    pub fn new(names: Vec<String>) -> Result<Self> {
        for (idx, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(AppError::Validation(format!(
                    "Category at position {} has an empty name",
                    idx
                )));
            }
            if names[..idx].contains(name) {
                return Err(AppError::Validation(format!(
                    "Category '{}' appears more than once",
                    name
                )));
            }
        }
        Ok(Self { names })
    }

    /// Derive the schema from a packed `name-value;name-value` field.
    ///
    /// Each name is the pair with its trailing two characters removed.
    pub fn from_packed(packed: &str) -> Result<Self> {
        let names = packed
            .split(';')
            .map(|pair| {
                pair_name(pair).map(str::to_string).ok_or_else(|| {
                    AppError::Validation(format!("Malformed category pair '{}'", pair))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(names)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Name part of a `name-value` pair: everything before the last two characters.
pub(crate) fn pair_name(pair: &str) -> Option<&str> {
    let mut chars = pair.char_indices().rev();
    chars.next()?;
    let (sep_idx, _) = chars.next()?;
    if sep_idx == 0 {
        return None;
    }
    Some(&pair[..sep_idx])
}
