//! # Constant table module
//!
//! Per-transaction mapping of symbolic PAM result and item names to small
//! integers. The table is populated exactly once, from the constant set the
//! loaded module declares (or a minimal `PAM_SUCCESS=0` default), and sealed
//! immediately afterwards. After sealing, any write to a name following the
//! reserved `PAM_`/`_PAM_` naming convention fails with a read-only
//! attribute error; non-reserved handle attributes stay freely settable.
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

use std::collections::BTreeMap;

use thiserror::Error;

use crate::PAM_SUCCESS;

/// Errors raised by writes to sealed or reserved handle attributes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttrError {
    #[error("attribute '{0}' is not writable")]
    ReadOnly(String),
    #[error("constant table is already populated")]
    Sealed,
}

/// Returns true for names following the reserved constant naming convention.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    name.starts_with("PAM_") || name.starts_with("_PAM_")
}

/// Symbolic-name to integer table, sealed after its one-time population.
#[derive(Debug, Default)]
pub struct ConstantTable {
    entries: BTreeMap<String, i32>,
    sealed: bool,
}

impl ConstantTable {
    #[must_use]
    pub fn new() -> Self {
        ConstantTable::default()
    }

    /// Populates the table from the constant set a module declares and seals
    /// it. A module declaring no constants seeds exactly one entry,
    /// `PAM_SUCCESS=0`.
    ///
    /// # Errors
    ///
    /// Returns `AttrError::Sealed` if the table was already populated.
    pub fn populate(&mut self, declared: Option<BTreeMap<String, i32>>) -> Result<(), AttrError> {
        if self.sealed {
            return Err(AttrError::Sealed);
        }
        match declared {
            Some(consts) => self.entries.extend(consts),
            None => {
                self.entries.insert("PAM_SUCCESS".to_string(), PAM_SUCCESS);
            }
        }
        self.sealed = true;
        Ok(())
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<i32> {
        self.entries.get(name).copied()
    }

    /// Resolves a symbolic constant, falling back to the conventional value
    /// when the module's table does not declare it.
    #[must_use]
    pub fn get_or(&self, name: &str, default: i32) -> i32 {
        self.get(name).unwrap_or(default)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
