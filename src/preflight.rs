// src/preflight.rs

//! Checks run before commands that change the system

use crate::error::{Error, Result};

/// Whether the process runs with an effective uid of 0
pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Fail unless running as root
pub fn require_root(action: &str) -> Result<()> {
    if is_root() {
        Ok(())
    } else {
        Err(Error::InitError(format!(
            "root privileges are required to {action} (try sudo)"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_root_matches_euid() {
        assert_eq!(require_root("install").is_ok(), is_root());
    }
}
