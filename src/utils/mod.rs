use log::info;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

pub mod security;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Creates the directory that will hold the SQLite file.
pub fn ensure_data_dir(db_path: &Path) -> std::io::Result<()> {
    if let Some(dir) = db_path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            info!("Creating data directory {:?}...", dir);
            fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}
