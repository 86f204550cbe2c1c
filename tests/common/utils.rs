//! # Integration test utilities
//!
//! Scriptable stand-in module, conversation delegates and configuration
//! fixtures shared by the transaction integration tests.
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

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use pam::conv::{ConvError, Conversation, Message, Response};
use pam::handle::PamHandle;
use pam::module::{ModuleError, ModuleResult, PamModule};
use pam::PamFlag;
use pam_pyhost::{LoadError, Transaction};
use tempdir::TempDir;

/// One recorded lifecycle invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub entry: &'static str,
    pub flags: PamFlag,
    pub argv: Vec<String>,
}

pub type Journal = Rc<RefCell<Vec<Call>>>;

/// A module whose entry points replay pre-scripted outcomes and record
/// every invocation. A field left at `None` behaves like an unexported
/// symbol; `chauthtok` replays its queue front to back.
#[derive(Default)]
pub struct StubModule {
    pub journal: Journal,
    pub constants: Option<BTreeMap<String, i32>>,
    pub authenticate: Option<ModuleResult>,
    pub setcred: Option<ModuleResult>,
    pub acct_mgmt: Option<ModuleResult>,
    pub open_session: Option<ModuleResult>,
    pub close_session: Option<ModuleResult>,
    pub chauthtok: VecDeque<ModuleResult>,
    pub end_error: Option<ModuleError>,
    pub end_calls: Rc<RefCell<u32>>,
}

impl StubModule {
    fn record(&self, entry: &'static str, flags: PamFlag, argv: &[String]) {
        self.journal.borrow_mut().push(Call {
            entry,
            flags,
            argv: argv.to_vec(),
        });
    }
}

impl PamModule for StubModule {
    fn constants(&self) -> Option<BTreeMap<String, i32>> {
        self.constants.clone()
    }

    fn authenticate(
        &mut self,
        _pamh: &mut PamHandle,
        flags: PamFlag,
        argv: &[String],
    ) -> Option<ModuleResult> {
        self.record("authenticate", flags, argv);
        self.authenticate.clone()
    }

    fn setcred(
        &mut self,
        _pamh: &mut PamHandle,
        flags: PamFlag,
        argv: &[String],
    ) -> Option<ModuleResult> {
        self.record("setcred", flags, argv);
        self.setcred.clone()
    }

    fn acct_mgmt(
        &mut self,
        _pamh: &mut PamHandle,
        flags: PamFlag,
        argv: &[String],
    ) -> Option<ModuleResult> {
        self.record("acct_mgmt", flags, argv);
        self.acct_mgmt.clone()
    }

    fn open_session(
        &mut self,
        _pamh: &mut PamHandle,
        flags: PamFlag,
        argv: &[String],
    ) -> Option<ModuleResult> {
        self.record("open_session", flags, argv);
        self.open_session.clone()
    }

    fn close_session(
        &mut self,
        _pamh: &mut PamHandle,
        flags: PamFlag,
        argv: &[String],
    ) -> Option<ModuleResult> {
        self.record("close_session", flags, argv);
        self.close_session.clone()
    }

    fn chauthtok(
        &mut self,
        _pamh: &mut PamHandle,
        flags: PamFlag,
        argv: &[String],
    ) -> Option<ModuleResult> {
        self.record("chauthtok", flags, argv);
        self.chauthtok.pop_front()
    }

    fn end(&mut self, _pamh: &mut PamHandle) -> Result<(), ModuleError> {
        *self.end_calls.borrow_mut() += 1;
        match &self.end_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// A conversation delegate that acknowledges every prompt without input.
pub fn silent_conv() -> Box<dyn Conversation> {
    Box::new(|messages: &[Message]| -> Result<Vec<Response>, ConvError> {
        Ok(messages.iter().map(|_| Response::new(None, 0)).collect())
    })
}

pub fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("host.pam");
    fs::write(&path, content).expect("Failed to write config");
    path
}

/// Starts a transaction over the given configuration with the stub module
/// as the loaded script.
pub fn start_stub(module: StubModule, config: &Path) -> Transaction {
    let mut slot = Some(module);
    let mut loader = move |path: &Path| {
        slot.take()
            .map(|m| Box::new(m) as Box<dyn PamModule>)
            .ok_or_else(|| LoadError::new(path, "module already taken"))
    };

    let mut tx = Transaction::new();
    tx.start(
        config.to_str().expect("non-utf8 config path"),
        Some("ferris"),
        silent_conv(),
        &mut loader,
    )
    .expect("start failed");
    tx
}
