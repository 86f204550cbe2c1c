//! # Transaction handle
//!
//! `PamHandle` is the per-transaction object passed to every module entry
//! point. It owns the sealed constant table, the environment mapping, the
//! item attributes, a free-form attribute map for module bookkeeping, and
//! the conversation delegate.
//!
//! Item attributes hold string values; looking up an unset item yields
//! `None`, never an error. Symbolic constants are resolved through the
//! handle rather than any ambient process-wide state.
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

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::constants::{is_reserved, AttrError, ConstantTable};
use crate::conv::{ConvError, ConvReply, Conversation, Message, Prompts, Response};
use crate::env::PamEnv;
use crate::error::PamException;
use crate::items::{ItemError, ItemType, XAuthData};
use crate::PAM_RETURN_VALUES;

/// Magic base the `strerror` debug hook recognizes.
const DEBUG_MAGIC: i64 = 0x4567_abcd;

#[derive(Debug, Default)]
struct Items {
    service: Option<String>,
    user: Option<String>,
    tty: Option<String>,
    rhost: Option<String>,
    authtok: Option<String>,
    oldauthtok: Option<String>,
    ruser: Option<String>,
    user_prompt: Option<String>,
    xdisplay: Option<String>,
    authtok_type: Option<String>,
}

/// The per-transaction handle exposed to module entry points.
pub struct PamHandle {
    module_path: PathBuf,
    items: Items,
    xauthdata: Option<XAuthData>,
    constants: ConstantTable,
    env: PamEnv,
    attrs: HashMap<String, String>,
    conv: Box<dyn Conversation>,
}

impl PamHandle {
    /// Builds a fresh handle seeded with the module script path, the user
    /// identity supplied by the application, and the conversation delegate.
    /// The constant table starts empty and unsealed; the dispatcher
    /// populates it right after the module is loaded.
    #[must_use]
    pub fn new(module_path: PathBuf, user: Option<String>, conv: Box<dyn Conversation>) -> Self {
        PamHandle {
            module_path,
            items: Items {
                user,
                ..Items::default()
            },
            xauthdata: None,
            constants: ConstantTable::new(),
            env: PamEnv::new(),
            attrs: HashMap::new(),
            conv,
        }
    }

    #[must_use]
    pub fn module_path(&self) -> &Path {
        &self.module_path
    }

    /// Populates and seals the constant table from the module's declared
    /// constant set.
    ///
    /// # Errors
    ///
    /// Returns `AttrError::Sealed` if the table was already populated.
    pub fn populate_constants(
        &mut self,
        declared: Option<BTreeMap<String, i32>>,
    ) -> Result<(), AttrError> {
        self.constants.populate(declared)
    }

    #[must_use]
    pub fn constants(&self) -> &ConstantTable {
        &self.constants
    }

    #[must_use]
    pub fn constant(&self, name: &str) -> Option<i32> {
        self.constants.get(name)
    }

    /// Resolves a symbolic constant through the handle, falling back to the
    /// conventional value when the module declared none.
    #[must_use]
    pub fn constant_or(&self, name: &str, default: i32) -> i32 {
        self.constants.get_or(name, default)
    }

    /// Reads an item attribute. Unset items yield `None`.
    /// `ItemType::Xauthdata` is not a string item; use
    /// [`PamHandle::xauthdata`].
    #[must_use]
    pub fn item(&self, item: ItemType) -> Option<&str> {
        let slot = match item {
            ItemType::Service => &self.items.service,
            ItemType::User => &self.items.user,
            ItemType::Tty => &self.items.tty,
            ItemType::Rhost => &self.items.rhost,
            ItemType::Authtok => &self.items.authtok,
            ItemType::Oldauthtok => &self.items.oldauthtok,
            ItemType::Ruser => &self.items.ruser,
            ItemType::UserPrompt => &self.items.user_prompt,
            ItemType::Xdisplay => &self.items.xdisplay,
            ItemType::AuthtokType => &self.items.authtok_type,
            ItemType::Xauthdata => return None,
        };
        slot.as_deref()
    }

    /// Writes (or clears) a string item attribute.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::NotSettable` for `ItemType::Xauthdata`, which
    /// does not carry a string value.
    pub fn set_item(&mut self, item: ItemType, value: Option<String>) -> Result<(), ItemError> {
        let slot = match item {
            ItemType::Service => &mut self.items.service,
            ItemType::User => &mut self.items.user,
            ItemType::Tty => &mut self.items.tty,
            ItemType::Rhost => &mut self.items.rhost,
            ItemType::Authtok => &mut self.items.authtok,
            ItemType::Oldauthtok => &mut self.items.oldauthtok,
            ItemType::Ruser => &mut self.items.ruser,
            ItemType::UserPrompt => &mut self.items.user_prompt,
            ItemType::Xdisplay => &mut self.items.xdisplay,
            ItemType::AuthtokType => &mut self.items.authtok_type,
            ItemType::Xauthdata => return Err(ItemError::NotSettable(ItemType::Xauthdata)),
        };
        *slot = value;
        Ok(())
    }

    #[must_use]
    pub fn xauthdata(&self) -> Option<&XAuthData> {
        self.xauthdata.as_ref()
    }

    pub fn set_xauthdata(&mut self, data: Option<XAuthData>) {
        self.xauthdata = data;
    }

    /// The name of the user who is authenticating or logging in, when known.
    /// The prompt argument is accepted for contract parity; an unset user is
    /// reported as `None` rather than prompted for here.
    #[must_use]
    pub fn get_user(&self, _prompt: Option<&str>) -> Option<&str> {
        self.items.user.as_deref()
    }

    #[must_use]
    pub fn env(&self) -> &PamEnv {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut PamEnv {
        &mut self.env
    }

    /// Writes a free-form handle attribute used by modules for their own
    /// bookkeeping.
    ///
    /// # Errors
    ///
    /// Returns `AttrError::ReadOnly` for reserved `PAM_`/`_PAM_` names once
    /// the constant table has been sealed.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) -> Result<(), AttrError> {
        if is_reserved(name) && self.constants.is_sealed() {
            return Err(AttrError::ReadOnly(name.to_string()));
        }
        self.attrs.insert(name.to_string(), value.into());
        Ok(())
    }

    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Runs one conversation exchange through the registered delegate,
    /// preserving payload cardinality: a single prompt yields a single
    /// response (or none), a batch yields the delegate's responses in order.
    ///
    /// # Errors
    ///
    /// Returns `ConvError` when the delegate fails.
    pub fn conversation(&mut self, prompts: impl Into<Prompts>) -> Result<ConvReply, ConvError> {
        match prompts.into() {
            Prompts::Single(message) => {
                let mut responses = self.conv.converse(std::slice::from_ref(&message))?;
                if responses.is_empty() {
                    Ok(ConvReply::Single(None))
                } else {
                    Ok(ConvReply::Single(Some(responses.remove(0))))
                }
            }
            Prompts::Batch(messages) => {
                let responses = self.conv.converse(&messages)?;
                Ok(ConvReply::Batch(responses))
            }
        }
    }

    /// Requests a delay on authentication failure. The host keeps no failure
    /// timing state, so this is a no-op kept for contract parity.
    #[allow(clippy::unused_self)]
    pub fn fail_delay(&self, _seconds: u32) {}

    /// Maps a PAM result code to its message text.
    ///
    /// Codes at `0x4567abcd` and above, within the return-value range, form
    /// a debug hook: the low-order offset is raised as a `PamException`
    /// unless it is the success value.
    ///
    /// # Errors
    ///
    /// Returns the `PamException` produced by the debug hook.
    pub fn strerror(&self, code: i64) -> Result<&'static str, PamException> {
        if code >= DEBUG_MAGIC {
            let max = i64::from(self.constants.get_or("_PAM_RETURN_VALUES", PAM_RETURN_VALUES));
            if code < DEBUG_MAGIC + max {
                let pam_result = (code - DEBUG_MAGIC) as i32;
                if pam_result != 0 {
                    return Err(PamException::new(pam_result, "debug"));
                }
            }
        }
        Ok(match code {
            0 => "Success",
            1 => "Failed to load module",
            30 => "Conversation is waiting for event",
            31 => "Application needs to call libpam again",
            _ => "Unknown error",
        })
    }
}
