use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::validate_name;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Category already exists: {0}")]
    DuplicateName(String),

    #[error("Category number {index} is out of range (1 to {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Category name cannot be empty")]
    EmptyName,
}

/// Ordered list of unique, case-sensitive category names.
///
/// Positions are 1-based on every public method, matching the numbered lists
/// shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRegistry {
    names: Vec<String>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from stored names, dropping blanks and repeats.
    /// Returns the registry and the names that were dropped as duplicates.
    pub fn from_names<I>(names: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = String>,
    {
        let mut registry = Self::new();
        let mut duplicates = Vec::new();
        for name in names {
            if let Err(RegistryError::DuplicateName(dup)) = registry.add(&name) {
                duplicates.push(dup);
            }
        }
        (registry, duplicates)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Append a new category. Leaves the registry unchanged if the name exists.
    pub fn add(&mut self, name: &str) -> Result<(), RegistryError> {
        let name = validate_name(name).map_err(|_| RegistryError::EmptyName)?;
        if self.contains(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        self.names.push(name);
        Ok(())
    }

    pub fn at(&self, index: usize) -> Result<&str, RegistryError> {
        let slot = self.slot(index)?;
        Ok(&self.names[slot])
    }

    /// Remove the category at `index`, returning its name.
    pub fn remove(&mut self, index: usize) -> Result<String, RegistryError> {
        let slot = self.slot(index)?;
        Ok(self.names.remove(slot))
    }

    /// Rename the category at `index`, returning the previous name.
    pub fn replace(&mut self, index: usize, new_name: &str) -> Result<String, RegistryError> {
        let slot = self.slot(index)?;
        let new_name = validate_name(new_name).map_err(|_| RegistryError::EmptyName)?;
        if self
            .names
            .iter()
            .enumerate()
            .any(|(i, n)| i != slot && *n == new_name)
        {
            return Err(RegistryError::DuplicateName(new_name));
        }
        Ok(std::mem::replace(&mut self.names[slot], new_name))
    }

    fn slot(&self, index: usize) -> Result<usize, RegistryError> {
        if index == 0 || index > self.names.len() {
            return Err(RegistryError::IndexOutOfRange {
                index,
                len: self.names.len(),
            });
        }
        Ok(index - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[&str]) -> CategoryRegistry {
        let (registry, _) = CategoryRegistry::from_names(names.iter().map(|n| n.to_string()));
        registry
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut reg = CategoryRegistry::new();
        assert_eq!(reg.add("Food"), Ok(()));
        assert_eq!(
            reg.add("Food"),
            Err(RegistryError::DuplicateName("Food".into()))
        );
        assert_eq!(reg.names(), ["Food"]);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut reg = registry(&["Food"]);
        assert!(reg.add("food").is_ok());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_at_bounds() {
        let reg = registry(&["Food", "Transport"]);
        assert_eq!(reg.at(1), Ok("Food"));
        assert_eq!(reg.at(2), Ok("Transport"));
        assert_eq!(
            reg.at(0),
            Err(RegistryError::IndexOutOfRange { index: 0, len: 2 })
        );
        assert_eq!(
            reg.at(3),
            Err(RegistryError::IndexOutOfRange { index: 3, len: 2 })
        );
    }

    #[test]
    fn test_remove_and_replace() {
        let mut reg = registry(&["Food", "Transport", "Rent"]);
        assert_eq!(reg.remove(2), Ok("Transport".to_string()));
        assert_eq!(reg.names(), ["Food", "Rent"]);

        assert_eq!(reg.replace(1, "Groceries"), Ok("Food".to_string()));
        assert_eq!(reg.names(), ["Groceries", "Rent"]);

        // Renaming to itself is fine, renaming onto another entry is not
        assert!(reg.replace(2, "Rent").is_ok());
        assert_eq!(
            reg.replace(2, "Groceries"),
            Err(RegistryError::DuplicateName("Groceries".into()))
        );
        assert!(reg.remove(5).is_err());
    }

    #[test]
    fn test_from_names_collapses_duplicates() {
        let (reg, dups) = CategoryRegistry::from_names(
            ["Food", "Rent", "Food", ""].iter().map(|n| n.to_string()),
        );
        assert_eq!(reg.names(), ["Food", "Rent"]);
        assert_eq!(dups, vec!["Food".to_string()]);
    }
}
