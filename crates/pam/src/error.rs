//! # PAM error types
//!
//! The two structured error forms recognized at the dispatcher boundary.
//!
//! `PamError` is the stack's own error signal: a human-readable message plus
//! a numeric result code that callers are expected to inspect ("Symbol not
//! found" with code 2, "pam service returned error" with the translated
//! code, and so on).
//!
//! `PamException` carries a PAM result code raised from inside a module.
//! Any module failure that is not already one of these two forms is wrapped
//! by the dispatcher into a `PamException` with result code
//! [`crate::PAM_SERVICE_ERR`] before it crosses the boundary.
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

use thiserror::Error;

/// Structured error raised by the stack on behalf of a lifecycle call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{msg}")]
pub struct PamError {
    pub msg: String,
    pub code: i32,
}

impl PamError {
    #[must_use]
    pub fn new(msg: impl Into<String>, code: i32) -> Self {
        PamError {
            msg: msg.into(),
            code,
        }
    }
}

/// Exception-style error carrying a PAM result code, raised inside a module
/// or synthesized by the dispatcher when wrapping a module fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{msg}")]
pub struct PamException {
    pub pam_result: i32,
    pub msg: String,
}

impl PamException {
    #[must_use]
    pub fn new(pam_result: i32, msg: impl Into<String>) -> Self {
        PamException {
            pam_result,
            msg: msg.into(),
        }
    }
}
