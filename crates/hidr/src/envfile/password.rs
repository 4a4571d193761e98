//! Password resolution for env files.
//!
//! First match wins:
//!
//! 1. the password passed by the caller;
//! 2. `<NAME>_PASS` derived from the file name, e.g. `.env.prod` → `DOTENV_PROD_PASS`;
//! 3. the sibling file `<base>.pass`;
//! 4. `DOTENV_PASS`;
//! 5. `.env.pass` next to the file.
//!
//! Empty values count as absent. Password files are used verbatim.

use std::path::{Path, PathBuf};

use tracing::debug;
use zeroize::Zeroizing;

use super::EnvFileError;

pub const GLOBAL_PASSWORD_VAR: &str = "DOTENV_PASS";
pub const GLOBAL_PASSWORD_FILE: &str = ".env.pass";

const ENCRYPTED_SUFFIXES: [&str; 2] = [".encrypted", ".enc"];

/// Resolve the password for `file` from the process environment.
///
/// # Errors
///
/// Returns [`EnvFileError::NoPassword`] if no source yields a non-empty value.
pub fn resolve_password(
    file: &Path,
    explicit: Option<&str>,
) -> Result<Zeroizing<String>, EnvFileError> {
    resolve_password_with(file, explicit, |name| std::env::var(name).ok())
}

/// [`resolve_password`] with an injectable environment lookup.
pub fn resolve_password_with(
    file: &Path,
    explicit: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Zeroizing<String>, EnvFileError> {
    let present = |v: &String| !v.is_empty();

    if let Some(pw) = explicit.filter(|p| !p.is_empty()) {
        return Ok(Zeroizing::new(pw.to_owned()));
    }

    if let Some(var) = password_var_name(file) {
        if let Some(pw) = lookup(&var).filter(present) {
            debug!(source = %var, "password from environment");
            return Ok(Zeroizing::new(pw));
        }
    }

    if let Some(path) = password_file_path(file) {
        if let Some(pw) = read_password_file(&path)? {
            debug!(source = %path.display(), "password from file");
            return Ok(pw);
        }
    }

    if let Some(pw) = lookup(GLOBAL_PASSWORD_VAR).filter(present) {
        debug!(source = GLOBAL_PASSWORD_VAR, "password from environment");
        return Ok(Zeroizing::new(pw));
    }

    let global = sibling(file, GLOBAL_PASSWORD_FILE);
    if let Some(pw) = read_password_file(&global)? {
        debug!(source = %global.display(), "password from file");
        return Ok(pw);
    }

    Err(EnvFileError::NoPassword)
}

/// Environment variable consulted for `file`'s own password.
///
/// Derived from the `.env…` part of the base name when there is one, so
/// `.env.prod` and `secrets.env.prod` both give `DOTENV_PROD_PASS`. The first
/// `.` becomes `DOT`, every other non-alphanumeric character becomes `_`.
pub fn password_var_name(file: &Path) -> Option<String> {
    let base = base_name(file)?;
    let base = base.find(".env").map_or(base.as_str(), |at| &base[at..]);
    let mut name = String::with_capacity(base.len() + 8);
    let mut seen_dot = false;
    for c in base.chars() {
        match c {
            '.' if !seen_dot => {
                seen_dot = true;
                name.push_str("DOT");
            }
            c if c.is_ascii_alphanumeric() => name.push(c.to_ascii_uppercase()),
            _ => name.push('_'),
        }
    }
    name.push_str("_PASS");
    Some(name)
}

/// `<base>.pass` next to `file`.
pub fn password_file_path(file: &Path) -> Option<PathBuf> {
    let base = base_name(file)?;
    Some(sibling(file, &format!("{base}.pass")))
}

/// File name with any encrypted-file suffix removed.
fn base_name(file: &Path) -> Option<String> {
    let name = file.file_name()?.to_str()?;
    let base = ENCRYPTED_SUFFIXES
        .iter()
        .find_map(|s| name.strip_suffix(*s))
        .unwrap_or(name);
    (!base.is_empty()).then(|| base.to_owned())
}

fn sibling(file: &Path, name: &str) -> PathBuf {
    match file.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

fn read_password_file(path: &Path) -> Result<Option<Zeroizing<String>>, EnvFileError> {
    match std::fs::read_to_string(path) {
        Ok(pw) if pw.is_empty() => Ok(None),
        Ok(pw) => Ok(Some(Zeroizing::new(pw))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(EnvFileError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
