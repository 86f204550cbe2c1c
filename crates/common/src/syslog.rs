//! # Syslog Module
//!
//! Manages syslog logging for the pam-pyhost dispatcher and the `pyhost`
//! CLI. It initializes the syslog logger once and provides macros for
//! logging informational and error messages with the transaction context
//! prepended.
//!
//! ## Overview
//!
//! The module defines a `LogState` structure holding the logger state,
//! including initialization status and a pre-formatted log prefix, exposed
//! through the static `SYSLOG_STATE`. `init_host_log` initializes the
//! logger for a transaction, `init_cli_log` for the CLI binary; the
//! `log_info!` and `log_error!` macros perform the actual logging.
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

use log::LevelFilter;
use sysinfo::{Pid, System};
use syslog::{BasicLogger, Facility, Formatter3164};
use thiserror::Error;

/// Constants
const MODULE_NAME: &str = "pam_pyhost";

/// Failure to set up the syslog logger.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("could not open a syslog channel")]
    Channel,
    #[error("a global logger is already installed")]
    AlreadySet,
}

/// Struct to hold syslog state
pub struct LogState {
    pub logger_initialized: bool,
    pub pre_log: Option<String>,
}

/// Static variable to hold syslog state
pub static mut SYSLOG_STATE: LogState = LogState {
    logger_initialized: false,
    pre_log: None,
};

fn process_name() -> String {
    let mut sys = System::new_all();
    sys.refresh_all();
    sys.process(Pid::from_u32(std::process::id()))
        .map_or("unknown-process".to_string(), |p| p.name().to_string())
}

fn init_log(pre_log: String) -> Result<(), LogError> {
    unsafe {
        if SYSLOG_STATE.logger_initialized {
            return Ok(());
        }

        let formatter = Formatter3164 {
            facility: Facility::LOG_AUTH,
            hostname: None,
            process: process_name(),
            pid: 0,
        };

        let logger = match syslog::unix(formatter) {
            Err(_) => return Err(LogError::Channel),
            Ok(logger) => logger,
        };

        log::set_boxed_logger(Box::new(BasicLogger::new(logger)))
            .map(|()| log::set_max_level(LevelFilter::Info))
            .map_err(|_| LogError::AlreadySet)?;

        SYSLOG_STATE.logger_initialized = true;
        SYSLOG_STATE.pre_log = Some(pre_log);
        Ok(())
    }
}

/// Initializes syslog logging for a transaction.
///
/// Called once, best-effort, when a transaction starts. The tag is the
/// configuration name the transaction was started with and becomes part of
/// the log prefix used by the `log_info!` and `log_error!` macros.
///
/// # Errors
///
/// Returns a `LogError` when no syslog channel can be opened or another
/// global logger is already installed.
pub fn init_host_log(tag: &str) -> Result<(), LogError> {
    init_log(format!("{MODULE_NAME}({tag})"))
}

/// Initializes syslog logging for the cli.
///
/// # Errors
///
/// Returns a `LogError` when no syslog channel can be opened or another
/// global logger is already installed.
pub fn init_cli_log() -> Result<(), LogError> {
    init_log(format!("{MODULE_NAME}(CLI)"))
}

/// Macro for logging informational messages.
///
/// This macro logs messages at the "info" level using the syslog logger.
///
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        {
            unsafe {
                if $crate::syslog::SYSLOG_STATE.logger_initialized {
                    if let Some(ref pre_log) = $crate::syslog::SYSLOG_STATE.pre_log {
                        log::info!("{}: {}", pre_log, format_args!($($arg)*));
                    }
                }
            }
        }
    };
}

/// Macro for logging error messages.
///
/// This macro logs messages at the "error" level using the syslog logger.
///
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        {
            unsafe {
                if $crate::syslog::SYSLOG_STATE.logger_initialized {
                    if let Some(ref pre_log) = $crate::syslog::SYSLOG_STATE.pre_log {
                        log::error!("{}: {}", pre_log, format_args!($($arg)*));
                    }
                }
            }
        }
    };
}
