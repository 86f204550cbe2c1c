//! # PAM environment mapping
//!
//! String-keyed, string-valued store representing the authentication
//! environment to be exported to the calling process. Keys must be non-empty
//! and must not contain `=`; violations fail at the point of the write,
//! never later. Enumeration order is unspecified.
//!
//! ## License
//!
//! pam-pyhost
//! Copyright (C) 2024 pam-pyhost contributors
//!
//! This program is free software: you can redistribute it and/or modify
//! it under the terms of the GNU General Public License as published by
//! the Free Software Foundation, either version 3 of the License, or
//! (at your option) any later version.
//!
//! This program is distributed in the hope that it will be useful,
//! but WITHOUT ANY WARRANTY; without even the implied warranty of
//! MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//! GNU General Public License for more details.
//!
//! You should have received a copy of the GNU General Public License
//! along with this program.  If not, see <http://www.gnu.org/licenses/>.

use std::collections::hash_map;
use std::collections::HashMap;

use thiserror::Error;

/// Validation and lookup errors of the environment mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("PAM environment key '{0}' not found")]
    KeyNotFound(String),
    #[error("PAM environment key mustn't be 0 length")]
    EmptyKey,
    #[error("PAM environment key can't contain '='")]
    IllegalKey(String),
    #[error("putenv expects key=value")]
    MissingSeparator(String),
}

/// The per-transaction authentication environment.
#[derive(Debug, Default)]
pub struct PamEnv {
    vars: HashMap<String, String>,
}

impl PamEnv {
    #[must_use]
    pub fn new() -> Self {
        PamEnv::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Get-with-default lookup.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Lookup that fails when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns `EnvError::KeyNotFound` when the key is not set.
    pub fn try_get(&self, key: &str) -> Result<&str, EnvError> {
        self.get(key)
            .ok_or_else(|| EnvError::KeyNotFound(key.to_string()))
    }

    /// Inserts or overwrites a variable.
    ///
    /// # Errors
    ///
    /// Returns `EnvError::EmptyKey` for a zero-length key and
    /// `EnvError::IllegalKey` when the key contains `=`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), EnvError> {
        validate_key(key)?;
        self.vars.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Removes a variable, returning its previous value.
    ///
    /// # Errors
    ///
    /// Returns `EnvError::KeyNotFound` when the key is not set.
    pub fn remove(&mut self, key: &str) -> Result<String, EnvError> {
        self.vars
            .remove(key)
            .ok_or_else(|| EnvError::KeyNotFound(key.to_string()))
    }

    /// Accepts a single `key=value` string and splits it on the first `=`.
    ///
    /// # Errors
    ///
    /// Returns `EnvError::MissingSeparator` when the input carries no `=`,
    /// or a key validation error from [`PamEnv::set`].
    pub fn putenv(&mut self, kv: &str) -> Result<(), EnvError> {
        let (key, value) = kv
            .split_once('=')
            .ok_or_else(|| EnvError::MissingSeparator(kv.to_string()))?;
        self.set(key, value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.vars.values().map(String::as_str)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.vars.iter()
    }
}

impl<'a> IntoIterator for &'a PamEnv {
    type Item = (&'a String, &'a String);
    type IntoIter = hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.iter()
    }
}

fn validate_key(key: &str) -> Result<(), EnvError> {
    if key.is_empty() {
        return Err(EnvError::EmptyKey);
    }
    if key.contains('=') {
        return Err(EnvError::IllegalKey(key.to_string()));
    }
    Ok(())
}
