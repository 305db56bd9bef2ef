// src/key.rs

//! API credential lookup.
//!
//! The flag wins. Otherwise the key is read from `api_key.txt` under the
//! tool's XDG config directory. Without a key the API may throttle or block
//! heavy request volumes.

use std::fs;
use tracing::{debug, warn};

const KEY_FILE: &str = "api_key.txt";

/// Resolve the credential to send with every request, if any.
pub fn resolve_api_key(flag: Option<String>) -> Option<String> {
    if flag.is_some() {
        return flag;
    }
    match read_key_file() {
        Some(key) => {
            debug!("using API key from config file");
            Some(key)
        }
        None => {
            warn!("no API key configured; requests may be throttled");
            None
        }
    }
}

fn read_key_file() -> Option<String> {
    let dirs = xdg::BaseDirectories::with_prefix("census-backup").ok()?;
    let path = dirs.find_config_file(KEY_FILE)?;
    match fs::read_to_string(&path) {
        Ok(contents) => {
            let key = contents.trim();
            if key.is_empty() {
                None
            } else {
                Some(key.to_string())
            }
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read API key file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_takes_precedence() {
        let key = resolve_api_key(Some("from-flag".to_string()));
        assert_eq!(key.as_deref(), Some("from-flag"));
    }
}
