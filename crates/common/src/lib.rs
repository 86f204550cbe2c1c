//! # `pam-pyhost` Common Crate
//!
//! The `common` crate provides functionality shared by the pam-pyhost
//! dispatcher library and the `pyhost` CLI binary.
//!
//! # Modules
//!
//! ## `config`
//!
//! The `config` module locates and scans the PAM stack configuration: it
//! discovers the module script a transaction should load and builds the
//! per-service argument table consulted by the dispatcher. It also writes
//! the optional JSON debug dump of that table.
//!
//! ## `syslog`
//!
//! The `syslog` module provides functionality for initializing syslog
//! logging in both the dispatcher library and the CLI binary, together with
//! the `log_info!` and `log_error!` macros.
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

pub mod config;
pub mod syslog;
