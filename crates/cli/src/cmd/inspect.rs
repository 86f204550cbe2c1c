//! # Inspect Module
//!
//! Resolves a PAM configuration the way a transaction would and reports the
//! module script path and the per-service argument table, as colored text,
//! as JSON on stdout, or as a JSON dump file. Diagnostics only; nothing
//! here is a stable interface.
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

use colored::Colorize;
use common::config::{self, Service};
use std::path::Path;

use crate::{PyCliError, PyCliInfo, PyCliResult as Pcr, PyCliSuccess};

/// Resolves the given configuration reference and reports the outcome.
///
/// - With `out`, writes the JSON dump of the service argument table there.
/// - With `json`, prints the table as JSON on stdout.
/// - Otherwise prints a per-service listing.
pub fn config(config_ref: &str, json: bool, out: Option<&Path>) -> Pcr {
    let resolved = config::resolve(config_ref);

    let Some(module_path) = resolved.module_path else {
        return Pcr::Info(PyCliInfo {
            message: format!(
                "no module script found in '{}'",
                resolved.config_path.display().to_string().yellow()
            ),
        });
    };

    if let Some(out) = out {
        return match resolved.service_args.write_debug_dump(out) {
            Ok(()) => Pcr::Success(Some(PyCliSuccess {
                message: format!("service argument table written to '{}'", out.display()),
            })),
            Err(e) => Pcr::Error(PyCliError {
                message: format!("{e}"),
            }),
        };
    }

    if json {
        return match resolved.service_args.to_json() {
            Ok(text) => {
                println!("{text}");
                Pcr::Success(None)
            }
            Err(e) => Pcr::Error(PyCliError {
                message: format!("{e}"),
            }),
        };
    }

    println!("module: {}", module_path.display().to_string().green());
    for service in [
        Service::Auth,
        Service::Account,
        Service::Session,
        Service::Password,
    ] {
        if let Some(args) = resolved.service_args.get(service) {
            println!("{:>10}: {}", service.as_str().yellow(), args.join(" "));
        }
    }

    Pcr::Success(Some(PyCliSuccess {
        message: format!(
            "resolved {} service entr{} from '{}'",
            resolved.service_args.len(),
            if resolved.service_args.len() == 1 {
                "y"
            } else {
                "ies"
            },
            resolved.config_path.display()
        ),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempdir::TempDir;

    #[test]
    fn test_inspect_writes_dump() {
        let temp_dir = TempDir::new("test_inspect_dump").expect("Failed to create temp dir");
        let cfg = temp_dir.path().join("host.pam");
        fs::write(&cfg, "auth required pam_python.so /opt/mod.py a b\n").unwrap();
        let out = temp_dir.path().join("dump.json");

        let result = config(cfg.to_str().unwrap(), false, Some(&out));

        assert!(matches!(result, Pcr::Success(Some(_))));
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(parsed["auth"][1], "b");
    }

    #[test]
    fn test_inspect_missing_module_is_informational() {
        let temp_dir = TempDir::new("test_inspect_missing").expect("Failed to create temp dir");
        let cfg = temp_dir.path().join("empty.pam");
        fs::write(&cfg, "auth required pam_unix.so\n").unwrap();

        let result = config(cfg.to_str().unwrap(), false, None);
        assert!(matches!(result, Pcr::Info(_)));
    }
}
