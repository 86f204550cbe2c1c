//! # PAM Contract Crate
//!
//! This crate defines the types shared across the module boundary of the
//! pam-pyhost runtime: the per-transaction handle, the conversation types,
//! the environment mapping, the constant table and the `PamModule` trait
//! that loadable authentication modules implement.
//!
//! The main types provided by this crate are:
//! - `PamHandle`: the per-transaction object passed to every module entry
//!   point. It owns the sealed constant table, the environment mapping, the
//!   item attributes and the conversation delegate.
//! - `PamModule`: the trait a loadable module implements. Entry points
//!   return `None` when the corresponding symbol is not provided, mirroring
//!   how a native loader reports unresolved symbols.
//! - `Message` / `Response`: the value pair exchanged through the
//!   conversation engine.
//! - `PamError` / `PamException`: the two structured error forms that may
//!   cross the dispatcher boundary.
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

pub mod constants;
pub mod conv;
pub mod env;
pub mod error;
pub mod handle;
pub mod items;
pub mod module;

/// Flag word passed to every module entry point.
pub type PamFlag = i32;
/// Style code carried by a conversation [`conv::Message`].
pub type PamMessageStyle = i32;

// Message styles, see /usr/include/security/_pam_types.h
pub const PAM_PROMPT_ECHO_OFF: PamMessageStyle = 1;
pub const PAM_PROMPT_ECHO_ON: PamMessageStyle = 2;
pub const PAM_ERROR_MSG: PamMessageStyle = 3;
pub const PAM_TEXT_INFO: PamMessageStyle = 4;

// Result codes. A transaction resolves these through the handle's constant
// table; the values below are the conventional defaults used when a module
// declares no table of its own.
pub const PAM_SUCCESS: i32 = 0;
pub const PAM_OPEN_ERR: i32 = 1;
pub const PAM_SYMBOL_ERR: i32 = 2;
pub const PAM_SERVICE_ERR: i32 = 3;
pub const PAM_SYSTEM_ERR: i32 = 4;
pub const PAM_PERM_DENIED: i32 = 6;
pub const PAM_AUTH_ERR: i32 = 7;
pub const PAM_USER_UNKNOWN: i32 = 10;
pub const PAM_CONV_ERR: i32 = 19;
pub const PAM_IGNORE: i32 = 25;
pub const PAM_ABORT: i32 = 26;

// Phase flags for the two-phase token change, see
// /usr/include/security/pam_modules.h
pub const PAM_PRELIM_CHECK: PamFlag = 0x4000;
pub const PAM_UPDATE_AUTHTOK: PamFlag = 0x2000;
pub const PAM_SILENT: PamFlag = 0x8000;

/// Number of distinct PAM return values, used by the `strerror` debug hook.
pub const PAM_RETURN_VALUES: i32 = 32;
