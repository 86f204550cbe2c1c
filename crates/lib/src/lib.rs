//! # `pam-pyhost` Dispatcher Library
//!
//! pam-pyhost emulates the runtime contract between the PAM authentication
//! stack and loadable authentication modules. The application starts a
//! [`transaction::Transaction`] against a PAM configuration; the transaction
//! loads the configured module through a [`transaction::ModuleLoader`],
//! builds the per-transaction handle, and exposes the lifecycle entry points
//! (authenticate, setcred, acct_mgmt, open/close session, chauthtok) as
//! calls that resolve the service argument vector, invoke the module and
//! translate its outcome into the stack's error convention.
//!
//! ## Usage
//!
//! ```no_run
//! use pam::conv::{ConvError, Message, Response};
//! use pam::module::PamModule;
//! use pam_pyhost::transaction::{LoadError, Transaction};
//!
//! struct Quiet;
//! impl PamModule for Quiet {}
//!
//! let conv = |_: &[Message]| -> Result<Vec<Response>, ConvError> { Ok(vec![]) };
//! let mut loader =
//!     |_: &std::path::Path| Ok::<Box<dyn PamModule>, LoadError>(Box::new(Quiet));
//!
//! let mut tx = Transaction::new();
//! tx.start("/etc/pam.d/login", Some("ferris"), Box::new(conv), &mut loader)?;
//! let result = tx.authenticate(0, None);
//! tx.end();
//! # Ok::<(), pam_pyhost::transaction::TxError>(())
//! ```
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

pub mod transaction;

pub use transaction::{LoadError, ModuleLoader, Transaction, TxError};
