//! # Configuration Module
//!
//! Resolves the PAM stack configuration consumed by a transaction: which
//! module script to load and which extra arguments each service category
//! receives.
//!
//! The configuration is plain text, one whitespace-delimited record per
//! line. A record qualifies when it has at least four fields and its third
//! field ends with the native-extension filename marker (`pam_python.so`).
//! The field after the marker is the module script path; the service
//! category token is the first of the two leading fields that parses as
//! one of `auth`, `account`, `session` or `password` (both the pam.d and
//! the single-file pam.conf record shapes are accepted); the remaining
//! fields are that service's argument vector. The first qualifying line
//! fixes the module script path, later lines for the same service overwrite
//! earlier ones.
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

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Serialize;

/// Filename marker identifying records addressed to this module host.
pub const MODULE_MARKER: &str = "pam_python.so";

/// Conventional module script consulted when the configuration itself is
/// unreadable.
pub const FALLBACK_SCRIPT: &str = "test.py";

/// The four service categories lifecycle calls are grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Auth,
    Account,
    Session,
    Password,
}

impl Service {
    /// Parses a configuration service token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Service> {
        match token {
            "auth" => Some(Service::Auth),
            "account" => Some(Service::Account),
            "session" => Some(Service::Session),
            "password" => Some(Service::Password),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Service::Auth => "auth",
            Service::Account => "account",
            Service::Session => "session",
            Service::Password => "password",
        }
    }
}

/// Ordered argument vectors per service category, parsed once from the
/// configuration and immutable afterwards.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ServiceArgs {
    args: HashMap<Service, Vec<String>>,
}

impl ServiceArgs {
    #[must_use]
    pub fn get(&self, service: Service) -> Option<&[String]> {
        self.args.get(&service).map(Vec::as_slice)
    }

    pub fn insert(&mut self, service: Service, argv: Vec<String>) {
        self.args.insert(service, argv);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Serializes the table as JSON, keyed by lowercase service tokens.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json` error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Writes the diagnostic JSON dump of the table. This artifact exists
    /// for troubleshooting only and carries no stability contract.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the dump can't be written.
    pub fn write_debug_dump(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::from)?;
        fs::write(path, json)
    }
}

/// Outcome of a configuration scan.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// The configuration file that was (or failed to be) read.
    pub config_path: PathBuf,
    /// Module script named by the first qualifying record, or the cwd
    /// fallback, or `None` when neither exists.
    pub module_path: Option<PathBuf>,
    /// Per-service argument vectors from every qualifying record.
    pub service_args: ServiceArgs,
}

/// Locates and scans a configuration reference.
///
/// `config_ref` may be an absolute path, an existing relative path, or a
/// bare name resolved against the current working directory. A missing or
/// unreadable file is non-fatal for the argument table (it stays empty);
/// module discovery then falls back to [`FALLBACK_SCRIPT`] in the working
/// directory when present.
#[must_use]
pub fn resolve(config_ref: &str) -> Resolved {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let given = Path::new(config_ref);
    let config_path = if given.is_absolute() || given.exists() {
        given.to_path_buf()
    } else {
        cwd.join(config_ref)
    };

    let mut module_path = None;
    let mut service_args = ServiceArgs::default();

    match fs::read_to_string(&config_path) {
        Ok(text) => {
            for line in text.lines() {
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.len() < 4 || !fields[2].ends_with(MODULE_MARKER) {
                    continue;
                }
                if module_path.is_none() {
                    module_path = Some(PathBuf::from(fields[3]));
                }
                if let Some(service) = fields[..2].iter().find_map(|t| Service::from_token(t)) {
                    let argv = fields[4..].iter().map(ToString::to_string).collect();
                    service_args.insert(service, argv);
                }
            }
        }
        Err(_) => {
            let fallback = cwd.join(FALLBACK_SCRIPT);
            if fallback.exists() {
                module_path = Some(fallback);
            }
        }
    }

    Resolved {
        config_path,
        module_path,
        service_args,
    }
}

// Unit Tests
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempdir::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("host.pam");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_resolve_pam_conf_record() {
        let dir = TempDir::new("test_resolve_pam_conf").unwrap();
        let path = write_config(&dir, "login auth /lib/pam_python.so /opt/mod.py arg1 arg2\n");

        let resolved = resolve(path.to_str().unwrap());

        assert_eq!(resolved.module_path, Some(PathBuf::from("/opt/mod.py")));
        assert_eq!(
            resolved.service_args.get(Service::Auth).unwrap(),
            ["arg1", "arg2"]
        );
    }

    #[test]
    fn test_resolve_pam_d_record() {
        let dir = TempDir::new("test_resolve_pam_d").unwrap();
        let path = write_config(
            &dir,
            "auth required pam_python.so /opt/mod.py try_first_pass\n\
             session optional pam_python.so /opt/mod.py\n",
        );

        let resolved = resolve(path.to_str().unwrap());

        assert_eq!(resolved.module_path, Some(PathBuf::from("/opt/mod.py")));
        assert_eq!(
            resolved.service_args.get(Service::Auth).unwrap(),
            ["try_first_pass"]
        );
        assert!(resolved
            .service_args
            .get(Service::Session)
            .unwrap()
            .is_empty());
        assert!(resolved.service_args.get(Service::Password).is_none());
    }

    #[test]
    fn test_first_qualifying_line_fixes_module_path() {
        let dir = TempDir::new("test_first_line_wins").unwrap();
        let path = write_config(
            &dir,
            "auth required pam_python.so /opt/first.py\n\
             account required pam_python.so /opt/second.py\n",
        );

        let resolved = resolve(path.to_str().unwrap());
        assert_eq!(resolved.module_path, Some(PathBuf::from("/opt/first.py")));
    }

    #[test]
    fn test_later_lines_overwrite_same_service() {
        let dir = TempDir::new("test_overwrite").unwrap();
        let path = write_config(
            &dir,
            "auth required pam_python.so /opt/mod.py old\n\
             auth required pam_python.so /opt/mod.py new1 new2\n",
        );

        let resolved = resolve(path.to_str().unwrap());
        assert_eq!(
            resolved.service_args.get(Service::Auth).unwrap(),
            ["new1", "new2"]
        );
    }

    #[test]
    fn test_non_qualifying_lines_are_skipped() {
        let dir = TempDir::new("test_skip_lines").unwrap();
        let path = write_config(
            &dir,
            "# comment line\n\
             \n\
             auth required pam_unix.so nullok\n\
             auth pam_python.so short\n\
             auth required pam_python.so /opt/mod.py ok\n",
        );

        let resolved = resolve(path.to_str().unwrap());
        assert_eq!(resolved.module_path, Some(PathBuf::from("/opt/mod.py")));
        assert_eq!(resolved.service_args.len(), 1);
        assert_eq!(resolved.service_args.get(Service::Auth).unwrap(), ["ok"]);
    }

    #[test]
    fn test_missing_file_yields_empty_table() {
        let dir = TempDir::new("test_missing_file").unwrap();
        let path = dir.path().join("absent.pam");

        let resolved = resolve(path.to_str().unwrap());
        assert_eq!(resolved.module_path, None);
        assert!(resolved.service_args.is_empty());
    }

    #[test]
    fn test_debug_dump_is_json() {
        let dir = TempDir::new("test_debug_dump").unwrap();
        let path = write_config(&dir, "auth required pam_python.so /opt/mod.py a b\n");
        let resolved = resolve(path.to_str().unwrap());

        let dump_path = dir.path().join("service_args_debug.json");
        resolved.service_args.write_debug_dump(&dump_path).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&dump_path).unwrap()).unwrap();
        assert_eq!(parsed["auth"][0], "a");
        assert_eq!(parsed["auth"][1], "b");
    }
}
