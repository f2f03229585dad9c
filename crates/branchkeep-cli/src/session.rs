//! Remembers the signed-in user between invocations.

use anyhow::{Context, Result};
use branchkeep_core::CurrentUser;
use std::path::{Path, PathBuf};

/// The session file and the user it names, if any.
#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    user: Option<CurrentUser>,
}

impl Session {
    /// Read the session at `path`. An absent or unreadable file means signed out.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let user = std::fs::read_to_string(&path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok());
        Self { path, user }
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    /// The signed-in user, or an error if nobody is.
    pub fn require_user(&self) -> Result<&CurrentUser> {
        self.user
            .as_ref()
            .context("Not signed in (run `branchkeep login` first)")
    }

    pub fn sign_in(&mut self, user: CurrentUser) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(&user).context("Failed to serialize session")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write session: {}", self.path.display()))?;
        self.user = Some(user);
        Ok(())
    }

    /// Forget the current user. Signing out while signed out is fine.
    pub fn sign_out(&mut self) -> Result<()> {
        self.user = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to remove session: {}", self.path.display()))),
        }
    }
}
