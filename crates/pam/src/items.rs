//! # PAM items module
//!
//! Defines the fixed set of item attributes a transaction handle exposes,
//! their numeric codes, and the `XAuthData` value type.
//!
//! Lookup of an unset item yields `None` rather than an error; numeric codes
//! outside the enumerated set are rejected with a clear unknown-item error.
//! A subset of the items is settable by the application through
//! `Transaction::set_item`; the remainder (authtok, oldauthtok, service,
//! xauthdata) is accessed by modules but never preset by the host.
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

/// Item attribute errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("unknown PAM item {0}")]
    Unknown(i32),
    #[error("PAM item {0:?} can't be set through set_item")]
    NotSettable(ItemType),
}

/// The item attributes a transaction handle carries, with their
/// conventional numeric codes (see /usr/include/security/_pam_types.h).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ItemType {
    /// The service name
    Service = 1,
    /// The user name
    User = 2,
    /// The tty name
    Tty = 3,
    /// The remote host name
    Rhost = 4,
    /// The authentication token (password)
    Authtok = 6,
    /// The old authentication token
    Oldauthtok = 7,
    /// The remote user name
    Ruser = 8,
    /// The prompt for getting a username
    UserPrompt = 9,
    /// The X display
    Xdisplay = 11,
    /// X server authentication data
    Xauthdata = 12,
    /// The type for the authentication token prompt
    AuthtokType = 13,
}

impl ItemType {
    /// True for the items an application may preset through the dispatcher.
    /// The remaining items are owned by the module side of the contract.
    #[must_use]
    pub fn is_app_settable(self) -> bool {
        matches!(
            self,
            ItemType::User
                | ItemType::Tty
                | ItemType::Rhost
                | ItemType::Ruser
                | ItemType::UserPrompt
                | ItemType::Xdisplay
                | ItemType::AuthtokType
        )
    }
}

impl TryFrom<i32> for ItemType {
    type Error = ItemError;

    fn try_from(code: i32) -> Result<Self, ItemError> {
        match code {
            1 => Ok(ItemType::Service),
            2 => Ok(ItemType::User),
            3 => Ok(ItemType::Tty),
            4 => Ok(ItemType::Rhost),
            6 => Ok(ItemType::Authtok),
            7 => Ok(ItemType::Oldauthtok),
            8 => Ok(ItemType::Ruser),
            9 => Ok(ItemType::UserPrompt),
            11 => Ok(ItemType::Xdisplay),
            12 => Ok(ItemType::Xauthdata),
            13 => Ok(ItemType::AuthtokType),
            other => Err(ItemError::Unknown(other)),
        }
    }
}

/// X server authentication datum, constructible by modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XAuthData {
    pub name: String,
    pub data: String,
}

impl XAuthData {
    #[must_use]
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        XAuthData {
            name: name.into(),
            data: data.into(),
        }
    }
}
