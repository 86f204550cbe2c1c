//! # Module contract
//!
//! The `PamModule` trait is the boundary the dispatcher calls across. A
//! loadable module implements the entry points it provides and leaves the
//! rest at their defaults; a default entry point returns `None`, which the
//! dispatcher reports exactly like a native loader reports an unresolved
//! symbol ("Symbol not found", code 2).
//!
//! An implemented entry point receives `(handle, flags, argv)` and either
//! returns a numeric result code or fails with a [`ModuleError`]. Failures
//! that are not already one of the two recognized structured forms are
//! wrapped by the dispatcher before they cross its boundary.
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

use crate::conv::ConvError;
use crate::error::{PamError, PamException};
use crate::handle::PamHandle;
use crate::PamFlag;

/// Failure raised inside a module entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    /// One of the stack's own structured errors, re-raised unchanged.
    #[error(transparent)]
    Pam(#[from] PamError),
    /// An exception already carrying a PAM result code.
    #[error(transparent)]
    Exception(#[from] PamException),
    /// Anything else. The dispatcher wraps this into a `PamException` with
    /// result code [`crate::PAM_SERVICE_ERR`].
    #[error("{0}")]
    Fault(String),
}

impl From<ConvError> for ModuleError {
    fn from(err: ConvError) -> Self {
        ModuleError::Fault(err.to_string())
    }
}

/// Outcome of one implemented entry point.
pub type ModuleResult = Result<i32, ModuleError>;

/// The entry points a loadable authentication module may provide.
///
/// Every method has a default body returning `None`, meaning "this symbol
/// is not exported". Override the ones your module handles. See `man pam(3)`
/// for the semantics of each service.
#[allow(unused_variables)]
pub trait PamModule {
    /// The constant set this module declares. Used to populate the
    /// transaction's constant table right after loading; `None` seeds the
    /// minimal default table.
    fn constants(&self) -> Option<BTreeMap<String, i32>> {
        None
    }

    /// Authenticates the user (`pam_sm_authenticate`).
    fn authenticate(
        &mut self,
        pamh: &mut PamHandle,
        flags: PamFlag,
        argv: &[String],
    ) -> Option<ModuleResult> {
        None
    }

    /// Alters the user's credentials (`pam_sm_setcred`).
    fn setcred(
        &mut self,
        pamh: &mut PamHandle,
        flags: PamFlag,
        argv: &[String],
    ) -> Option<ModuleResult> {
        None
    }

    /// Establishes whether the account may gain access at this time
    /// (`pam_sm_acct_mgmt`).
    fn acct_mgmt(
        &mut self,
        pamh: &mut PamHandle,
        flags: PamFlag,
        argv: &[String],
    ) -> Option<ModuleResult> {
        None
    }

    /// Starts a session (`pam_sm_open_session`).
    fn open_session(
        &mut self,
        pamh: &mut PamHandle,
        flags: PamFlag,
        argv: &[String],
    ) -> Option<ModuleResult> {
        None
    }

    /// Ends a session (`pam_sm_close_session`).
    fn close_session(
        &mut self,
        pamh: &mut PamHandle,
        flags: PamFlag,
        argv: &[String],
    ) -> Option<ModuleResult> {
        None
    }

    /// Changes the authentication token (`pam_sm_chauthtok`). Called twice
    /// per token change: once with `PAM_PRELIM_CHECK`, then with
    /// `PAM_UPDATE_AUTHTOK`.
    fn chauthtok(
        &mut self,
        pamh: &mut PamHandle,
        flags: PamFlag,
        argv: &[String],
    ) -> Option<ModuleResult> {
        None
    }

    /// End-of-transaction cleanup (`pam_sm_end`). Invoked best-effort with
    /// only the handle; failures are swallowed by the dispatcher.
    fn end(&mut self, pamh: &mut PamHandle) -> Result<(), ModuleError> {
        Ok(())
    }
}

// Unit Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::conv::Response;

    struct Bare;
    impl PamModule for Bare {}

    #[test]
    fn test_default_entry_points_are_absent_symbols() {
        let mut module = Bare;
        let mut pamh = PamHandle::new(
            "/opt/mod.py".into(),
            None,
            Box::new(|_: &[crate::conv::Message]| Ok(Vec::<Response>::new())),
        );
        assert!(module.constants().is_none());
        assert!(module.authenticate(&mut pamh, 0, &[]).is_none());
        assert!(module.setcred(&mut pamh, 0, &[]).is_none());
        assert!(module.acct_mgmt(&mut pamh, 0, &[]).is_none());
        assert!(module.open_session(&mut pamh, 0, &[]).is_none());
        assert!(module.close_session(&mut pamh, 0, &[]).is_none());
        assert!(module.chauthtok(&mut pamh, 0, &[]).is_none());
        assert!(module.end(&mut pamh).is_ok());
    }

    #[test]
    fn test_conv_error_becomes_fault() {
        let err: ModuleError = ConvError("tty closed".to_string()).into();
        assert_eq!(
            err,
            ModuleError::Fault("conversation failed: tty closed".to_string())
        );
    }
}
