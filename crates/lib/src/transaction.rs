//! # Transaction dispatcher
//!
//! Owns one authentication transaction from `start` through end-of-life
//! cleanup: config resolution, module loading, handle construction,
//! per-service argument resolution, lifecycle dispatch and outcome
//! translation.
//!
//! All module-originated failures are normalized at this boundary to one of
//! the two structured forms ([`pam::error::PamError`],
//! [`pam::error::PamException`]); no foreign error type escapes. End-of-life
//! cleanup failures are swallowed. Nothing is ever retried.
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

use std::io;
use std::path::{Path, PathBuf};

use common::config::{self, Service, ServiceArgs};
use common::{log_error, log_info, syslog};
use pam::constants::AttrError;
use pam::conv::Conversation;
use pam::env::EnvError;
use pam::error::{PamError, PamException};
use pam::handle::PamHandle;
use pam::items::{ItemError, ItemType};
use pam::module::{ModuleError, ModuleResult, PamModule};
use pam::{
    PamFlag, PAM_IGNORE, PAM_OPEN_ERR, PAM_PERM_DENIED, PAM_PRELIM_CHECK, PAM_SERVICE_ERR,
    PAM_SUCCESS, PAM_SYMBOL_ERR, PAM_UPDATE_AUTHTOK,
};
use thiserror::Error;

/// Failure reported by a [`ModuleLoader`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {reason}", .path.display())]
pub struct LoadError {
    pub path: PathBuf,
    pub reason: String,
}

impl LoadError {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        LoadError {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Resolves the module script path discovered in the configuration to a
/// loaded module instance. Closures of signature
/// `FnMut(&Path) -> Result<Box<dyn PamModule>, LoadError>` implement this
/// trait directly.
pub trait ModuleLoader {
    /// Loads the module behind the given script path.
    ///
    /// # Errors
    ///
    /// Returns a `LoadError` when the script cannot be loaded.
    fn load(&mut self, path: &Path) -> Result<Box<dyn PamModule>, LoadError>;
}

impl<F> ModuleLoader for F
where
    F: FnMut(&Path) -> Result<Box<dyn PamModule>, LoadError>,
{
    fn load(&mut self, path: &Path) -> Result<Box<dyn PamModule>, LoadError> {
        self(path)
    }
}

/// Error raised by a lifecycle call. Every module-originated failure is one
/// of the `Pam` or `Exception` variants; the remaining variants are raised
/// by the dispatcher itself before any module code runs.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum TxError {
    /// The stack's structured error signal (symbol missing, service denied,
    /// load failure).
    #[error(transparent)]
    Pam(#[from] PamError),
    /// A module exception carrying a PAM result code.
    #[error(transparent)]
    Exception(#[from] PamException),
    /// Item attribute validation failure.
    #[error(transparent)]
    Item(#[from] ItemError),
    /// Environment mapping validation failure.
    #[error(transparent)]
    Env(#[from] EnvError),
    /// Constant table write violation.
    #[error(transparent)]
    Attr(#[from] AttrError),
    /// A lifecycle entry point was called before `start`.
    #[error("module not started")]
    NotStarted,
    /// No qualifying record named a module script.
    #[error("could not find module script in {0}")]
    ModuleNotFound(String),
}

/// The well-known module entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Authenticate,
    Setcred,
    AcctMgmt,
    OpenSession,
    CloseSession,
    Chauthtok,
}

impl Entry {
    fn symbol(self) -> &'static str {
        match self {
            Entry::Authenticate => "pam_sm_authenticate",
            Entry::Setcred => "pam_sm_setcred",
            Entry::AcctMgmt => "pam_sm_acct_mgmt",
            Entry::OpenSession => "pam_sm_open_session",
            Entry::CloseSession => "pam_sm_close_session",
            Entry::Chauthtok => "pam_sm_chauthtok",
        }
    }

    fn service(self) -> Service {
        match self {
            Entry::Authenticate | Entry::Setcred => Service::Auth,
            Entry::AcctMgmt => Service::Account,
            Entry::OpenSession | Entry::CloseSession => Service::Session,
            Entry::Chauthtok => Service::Password,
        }
    }
}

/// One authentication transaction.
///
/// Single-threaded and synchronous: every lifecycle call blocks until the
/// module returns or fails, and exactly one transaction is in flight per
/// `Transaction` value. Calling `start` a second time on the same value is
/// a precondition violation (the previous transaction's state is replaced,
/// without its end-of-life cleanup being rerun).
#[derive(Default)]
pub struct Transaction {
    module: Option<Box<dyn PamModule>>,
    handle: Option<PamHandle>,
    module_path: Option<PathBuf>,
    service_args: ServiceArgs,
    ended: bool,
}

impl Transaction {
    #[must_use]
    pub fn new() -> Self {
        Transaction::default()
    }

    /// Starts the transaction: resolves the configuration, loads the module
    /// named by it, builds the handle seeded with module path, user and
    /// conversation delegate, populates and seals the constant table, and
    /// records the service argument table.
    ///
    /// # Errors
    ///
    /// Returns `TxError::ModuleNotFound` when no qualifying configuration
    /// record names a module script, or a `PamError` with code 1 when the
    /// loader fails.
    pub fn start(
        &mut self,
        config_ref: &str,
        user: Option<&str>,
        conv: Box<dyn Conversation>,
        loader: &mut dyn ModuleLoader,
    ) -> Result<(), TxError> {
        let resolved = config::resolve(config_ref);

        let tag = resolved
            .config_path
            .file_name()
            .map_or_else(|| "unknown".to_string(), |n| n.to_string_lossy().into_owned());
        // logging is best-effort; a transaction works without a syslog channel
        let _ = syslog::init_host_log(&tag);

        let module_path = resolved.module_path.ok_or_else(|| {
            TxError::ModuleNotFound(resolved.config_path.display().to_string())
        })?;

        let module = loader.load(&module_path).map_err(|err| {
            log_error!("could not load {}: {err}", module_path.display());
            PamError::new(format!("Failed to load module: {err}"), PAM_OPEN_ERR)
        })?;

        let mut handle = PamHandle::new(module_path.clone(), user.map(str::to_string), conv);
        handle.populate_constants(module.constants())?;

        log_info!("loaded module script {}", module_path.display());

        self.module = Some(module);
        self.handle = Some(handle);
        self.module_path = Some(module_path);
        self.service_args = resolved.service_args;
        self.ended = false;
        Ok(())
    }

    /// Authenticates the user.
    ///
    /// # Errors
    ///
    /// Returns a `TxError` per the outcome translation rules.
    pub fn authenticate(
        &mut self,
        flags: PamFlag,
        argv: Option<Vec<String>>,
    ) -> Result<i32, TxError> {
        self.call(Entry::Authenticate, flags, argv)
    }

    /// Sets the user's credentials.
    ///
    /// # Errors
    ///
    /// Returns a `TxError` per the outcome translation rules.
    pub fn setcred(&mut self, flags: PamFlag, argv: Option<Vec<String>>) -> Result<i32, TxError> {
        self.call(Entry::Setcred, flags, argv)
    }

    /// Runs account management.
    ///
    /// # Errors
    ///
    /// Returns a `TxError` per the outcome translation rules.
    pub fn acct_mgmt(&mut self, flags: PamFlag, argv: Option<Vec<String>>) -> Result<i32, TxError> {
        self.call(Entry::AcctMgmt, flags, argv)
    }

    /// Opens a session.
    ///
    /// # Errors
    ///
    /// Returns a `TxError` per the outcome translation rules.
    pub fn open_session(
        &mut self,
        flags: PamFlag,
        argv: Option<Vec<String>>,
    ) -> Result<i32, TxError> {
        self.call(Entry::OpenSession, flags, argv)
    }

    /// Closes a session.
    ///
    /// # Errors
    ///
    /// Returns a `TxError` per the outcome translation rules.
    pub fn close_session(
        &mut self,
        flags: PamFlag,
        argv: Option<Vec<String>>,
    ) -> Result<i32, TxError> {
        self.call(Entry::CloseSession, flags, argv)
    }

    /// Changes the authentication token. Two-phase: the module is invoked
    /// first with `PAM_PRELIM_CHECK` and then with `PAM_UPDATE_AUTHTOK`
    /// (both resolved through the constant table and OR-ed into `flags`),
    /// with the same resolved argument vector. The preliminary pass's
    /// return status is discarded; a failure it raises still surfaces
    /// through the normal translation. The update pass's outcome is the
    /// call's result.
    ///
    /// # Errors
    ///
    /// Returns a `TxError` per the outcome translation rules.
    pub fn chauthtok(&mut self, flags: PamFlag, argv: Option<Vec<String>>) -> Result<i32, TxError> {
        if self.module.is_none() || self.handle.is_none() {
            return Err(TxError::NotStarted);
        }
        let argv = self.resolve_argv(Entry::Chauthtok, argv);
        let (prelim, update) = {
            let handle = self.handle.as_ref().ok_or(TxError::NotStarted)?;
            (
                handle.constant_or("PAM_PRELIM_CHECK", PAM_PRELIM_CHECK),
                handle.constant_or("PAM_UPDATE_AUTHTOK", PAM_UPDATE_AUTHTOK),
            )
        };

        if let Err(err) = self.invoke(Entry::Chauthtok, flags | prelim, &argv)? {
            return Err(from_module(err));
        }

        let outcome = self.invoke(Entry::Chauthtok, flags | update, &argv)?;
        self.translate(outcome)
    }

    /// Ends the transaction: invokes the module's end-of-life entry point
    /// with only the handle, exactly once, swallowing its failures. Called
    /// automatically on drop if the application did not call it.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        if let (Some(module), Some(handle)) = (self.module.as_mut(), self.handle.as_mut()) {
            if let Err(err) = module.end(handle) {
                log_error!("pam_sm_end failed: {err}");
            }
        }
    }

    /// Presets an item attribute by its numeric code. Only the
    /// application-settable items are accepted.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::Unknown` for codes outside the item set and
    /// `ItemError::NotSettable` for module-owned items, or
    /// `TxError::NotStarted` before `start`.
    pub fn set_item(&mut self, item: i32, value: &str) -> Result<(), TxError> {
        let handle = self.handle.as_mut().ok_or(TxError::NotStarted)?;
        let item = ItemType::try_from(item).map_err(TxError::Item)?;
        if !item.is_app_settable() {
            return Err(TxError::Item(ItemError::NotSettable(item)));
        }
        handle.set_item(item, Some(value.to_string()))?;
        Ok(())
    }

    /// Inserts a `key=value` pair into the transaction environment.
    ///
    /// # Errors
    ///
    /// Returns an `EnvError` for a malformed pair, or `TxError::NotStarted`
    /// before `start`.
    pub fn putenv(&mut self, kv: &str) -> Result<(), TxError> {
        let handle = self.handle.as_mut().ok_or(TxError::NotStarted)?;
        handle.env_mut().putenv(kv)?;
        Ok(())
    }

    /// The transaction handle, once started.
    #[must_use]
    pub fn handle(&self) -> Option<&PamHandle> {
        self.handle.as_ref()
    }

    pub fn handle_mut(&mut self) -> Option<&mut PamHandle> {
        self.handle.as_mut()
    }

    /// The service argument table parsed at `start`.
    #[must_use]
    pub fn service_args(&self) -> &ServiceArgs {
        &self.service_args
    }

    /// Writes the diagnostic JSON dump of the service argument table.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the dump can't be written.
    pub fn dump_service_args(&self, path: &Path) -> io::Result<()> {
        self.service_args.write_debug_dump(path)
    }

    fn call(&mut self, entry: Entry, flags: PamFlag, argv: Option<Vec<String>>) -> Result<i32, TxError> {
        if self.module.is_none() || self.handle.is_none() {
            return Err(TxError::NotStarted);
        }
        let argv = self.resolve_argv(entry, argv);
        let outcome = self.invoke(entry, flags, &argv)?;
        self.translate(outcome)
    }

    /// Resolves the argument vector for one call: explicit argv, else the
    /// configured vector of the entry point's service category, else a
    /// single-element vector holding the module's own file path.
    fn resolve_argv(&self, entry: Entry, explicit: Option<Vec<String>>) -> Vec<String> {
        if let Some(argv) = explicit {
            return argv;
        }
        if let Some(args) = self.service_args.get(entry.service()) {
            return args.to_vec();
        }
        self.module_path
            .as_ref()
            .map_or_else(Vec::new, |path| vec![path.display().to_string()])
    }

    fn invoke(
        &mut self,
        entry: Entry,
        flags: PamFlag,
        argv: &[String],
    ) -> Result<ModuleResult, TxError> {
        let module = self.module.as_mut().ok_or(TxError::NotStarted)?;
        let handle = self.handle.as_mut().ok_or(TxError::NotStarted)?;
        let outcome = match entry {
            Entry::Authenticate => module.authenticate(handle, flags, argv),
            Entry::Setcred => module.setcred(handle, flags, argv),
            Entry::AcctMgmt => module.acct_mgmt(handle, flags, argv),
            Entry::OpenSession => module.open_session(handle, flags, argv),
            Entry::CloseSession => module.close_session(handle, flags, argv),
            Entry::Chauthtok => module.chauthtok(handle, flags, argv),
        };
        outcome.map_or_else(
            || {
                log_error!("module does not export {}", entry.symbol());
                Err(TxError::Pam(PamError::new("Symbol not found", PAM_SYMBOL_ERR)))
            },
            Ok,
        )
    }

    /// Translates a module outcome into the stack's convention: zero or the
    /// declared success constant pass; any other returned code surfaces as
    /// a structured error, with a module's "ignore" substituted by
    /// "permission denied" so a not-applicable result reaches the
    /// application as a plain denial.
    fn translate(&self, outcome: ModuleResult) -> Result<i32, TxError> {
        let handle = self.handle.as_ref().ok_or(TxError::NotStarted)?;
        match outcome {
            Ok(code) => {
                let success = handle.constant_or("PAM_SUCCESS", PAM_SUCCESS);
                if code == PAM_SUCCESS || code == success {
                    return Ok(code);
                }
                let ignore = handle.constant_or("PAM_IGNORE", PAM_IGNORE);
                let denied = handle.constant_or("PAM_PERM_DENIED", PAM_PERM_DENIED);
                let code = if code == ignore { denied } else { code };
                Err(TxError::Pam(PamError::new("pam service returned error", code)))
            }
            Err(err) => Err(from_module(err)),
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        self.end();
    }
}

/// Normalizes a module failure to one of the two recognized structured
/// forms; anything else is wrapped into a generic transaction exception
/// with code 3 and the original message preserved.
fn from_module(err: ModuleError) -> TxError {
    match err {
        ModuleError::Pam(e) => TxError::Pam(e),
        ModuleError::Exception(e) => TxError::Exception(e),
        ModuleError::Fault(msg) => TxError::Exception(PamException::new(PAM_SERVICE_ERR, msg)),
    }
}
