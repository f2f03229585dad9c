//! Application state management.
//!
//! Each method corresponds to one user gesture and returns the lines the
//! frontend should print.

use crate::session::Session;
use anyhow::Result;
use branchkeep_core::auth::{LOGGED_IN_MESSAGE, REGISTERED_MESSAGE};
use branchkeep_core::branches::ADDED_MESSAGE;
use branchkeep_core::scanner::Scanner;
use branchkeep_core::{BranchManager, CredentialGate, CurrentUser, RecordStore, ScanLog};

/// Account and branch operations over a record store.
pub struct App<S> {
    store: S,
    session: Session,
}

impl<S: RecordStore> App<S> {
    pub fn new(store: S, session: Session) -> Self {
        Self { store, session }
    }

    /// Create an account and sign in as it.
    pub fn signup(&mut self, username: &str, password: &str) -> Result<Vec<String>> {
        let record = CredentialGate::new(&self.store).register_user(username, password)?;
        self.session.sign_in(CurrentUser::new(record.username.clone()))?;
        Ok(vec![
            REGISTERED_MESSAGE.to_string(),
            format!("User: {}", record.username),
        ])
    }

    /// Check credentials and sign in.
    pub fn login(&mut self, username: &str, password: &str) -> Result<Vec<String>> {
        CredentialGate::new(&self.store).login_user(username, password)?;
        let username = username.trim();
        self.session.sign_in(CurrentUser::new(username))?;
        Ok(vec![
            LOGGED_IN_MESSAGE.to_string(),
            format!("User: {username}"),
        ])
    }

    fn branch_manager(&self) -> Result<BranchManager<&S>> {
        let user = self.session.require_user()?;
        Ok(BranchManager::new(&self.store, user.user_id.clone()))
    }

    /// The signed-in user's branches.
    pub fn list_branches(&self) -> Result<Vec<String>> {
        let mut manager = self.branch_manager()?;
        manager.load_branches()?;

        let mut lines = vec![format!("User: {}", manager.user_id())];
        lines.extend(manager.display_lines());
        Ok(lines)
    }

    /// Add a branch, then show the collection including it.
    pub fn add_branch(&self, name: &str, start_date: &str, end_date: &str) -> Result<Vec<String>> {
        let mut manager = self.branch_manager()?;
        if let Err(e) = manager.load_branches() {
            // The dashboard still accepts new branches when the initial load fails.
            tracing::warn!("Continuing without existing branches: {}", e);
        }
        manager.add_branch(name, start_date, end_date)?;

        let mut lines = vec![format!("✅ {ADDED_MESSAGE}")];
        lines.extend(manager.display_lines());
        Ok(lines)
    }
}

/// Forget the signed-in user. Needs no store.
pub fn logout(session: &mut Session) -> Result<Vec<String>> {
    let was = session.current_user().map(|u| u.username.clone());
    session.sign_out()?;
    Ok(vec![match was {
        Some(name) => format!("Signed out {name}"),
        None => "Not signed in".to_string(),
    }])
}

/// Scan-history gestures.
pub struct ScanHistory {
    log: ScanLog,
}

impl ScanHistory {
    pub fn new(log: ScanLog) -> Self {
        Self { log }
    }

    /// Newest first, each line prefixed with the index `delete` takes.
    pub fn lines(&self) -> Vec<String> {
        if self.log.is_empty() {
            return vec!["No scans yet".to_string()];
        }
        self.log
            .history()
            .map(|(index, record)| format!("[{index}] {record}"))
            .collect()
    }

    pub fn add(&mut self, barcode: &str) -> Result<Vec<String>> {
        match self.log.add(barcode)? {
            Some(record) => Ok(vec![format!("Scanned: {}", record.barcode)]),
            None => Ok(vec!["Nothing to record".to_string()]),
        }
    }

    /// Take one code from `scanner` and record it.
    pub fn scan_with(&mut self, scanner: &mut impl Scanner) -> Result<Vec<String>> {
        match scanner.scan() {
            Some(code) => self.add(&code),
            None => Ok(vec!["No barcode detected".to_string()]),
        }
    }

    pub fn delete(&mut self, index: usize) -> Result<Vec<String>> {
        Ok(match self.log.delete(index)? {
            Some(record) => vec![format!("Deleted: {}", record.barcode)],
            None => Vec::new(),
        })
    }

    pub fn clear(&mut self) -> Result<Vec<String>> {
        self.log.clear()?;
        Ok(vec!["History cleared".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchkeep_core::{hash_password, AuthError, MemoryRecordStore};
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> Session {
        Session::load(dir.path().join("session.json"))
    }

    fn app<'a>(dir: &TempDir, store: &'a MemoryRecordStore) -> App<&'a MemoryRecordStore> {
        App::new(store, session(dir))
    }

    #[test]
    fn signup_signs_in_and_branches_follow_the_user() {
        let dir = TempDir::new().unwrap();
        let store = MemoryRecordStore::new();
        let mut app = app(&dir, &store);

        assert_eq!(app.signup("alice", "hunter22").unwrap()[0], "Registration successful");
        assert_eq!(session(&dir).require_user().unwrap().username, "alice");

        let lines = app.add_branch("North", "2024-01-01", "2024-02-01").unwrap();
        assert_eq!(
            lines,
            ["✅ Branch added successfully", "North (2024-01-01 - 2024-02-01)"]
        );
        assert_eq!(
            app.list_branches().unwrap(),
            ["User: alice", "North (2024-01-01 - 2024-02-01)"]
        );
    }

    #[test]
    fn branch_commands_require_a_session() {
        let dir = TempDir::new().unwrap();
        let store = MemoryRecordStore::new();
        let app = app(&dir, &store);
        let err = app.list_branches().unwrap_err();
        assert!(err.to_string().starts_with("Not signed in"));
    }

    #[test]
    fn failed_login_keeps_session_empty() {
        let dir = TempDir::new().unwrap();
        let store = MemoryRecordStore::new();
        let mut app = app(&dir, &store);

        let err = app.login("ghost", "hunter22").unwrap_err();
        assert!(matches!(err.downcast_ref::<AuthError>(), Some(AuthError::UserNotFound)));
        assert!(session(&dir).current_user().is_none());
    }

    #[test]
    fn logout_then_login_again() {
        let dir = TempDir::new().unwrap();
        let store = MemoryRecordStore::new();
        app(&dir, &store).signup("alice", "hunter22").unwrap();

        let mut signed_in = session(&dir);
        assert_eq!(logout(&mut signed_in).unwrap(), ["Signed out alice"]);
        assert_eq!(logout(&mut signed_in).unwrap(), ["Not signed in"]);

        assert!(session(&dir).current_user().is_none());
        let mut app = app(&dir, &store);
        assert_eq!(app.login("alice", "hunter22").unwrap()[0], "Login successful");
    }

    #[test]
    fn login_session_uses_typed_username() {
        let dir = TempDir::new().unwrap();
        let store = MemoryRecordStore::new();
        let stored = serde_json::json!({
            "username": "someone-else",
            "password": hash_password("hunter22"),
        });
        store.put("users/alice", &stored).unwrap();

        let lines = app(&dir, &store).login(" alice ", "hunter22").unwrap();
        assert_eq!(lines, ["Login successful", "User: alice"]);
        assert_eq!(session(&dir).require_user().unwrap().user_id, "alice");
    }

    #[test]
    fn empty_branch_list_message() {
        let dir = TempDir::new().unwrap();
        let store = MemoryRecordStore::new();
        let mut app = app(&dir, &store);
        app.signup("alice", "hunter22").unwrap();
        assert_eq!(app.list_branches().unwrap(), ["User: alice", "No branches yet"]);
    }

    struct FixedScanner(Option<&'static str>);

    impl Scanner for FixedScanner {
        fn scan(&mut self) -> Option<String> {
            self.0.take().map(str::to_string)
        }
    }

    #[test]
    fn scan_history_flow() {
        let dir = TempDir::new().unwrap();
        let mut history = ScanHistory::new(ScanLog::load(dir.path().join("scans.json")));
        assert_eq!(history.lines(), ["No scans yet"]);

        history.add("111").unwrap();
        let mut scanner = FixedScanner(Some("222"));
        assert_eq!(history.scan_with(&mut scanner).unwrap(), ["Scanned: 222"]);
        assert_eq!(history.scan_with(&mut scanner).unwrap(), ["No barcode detected"]);

        let lines = history.lines();
        assert!(lines[0].starts_with("[1] ") && lines[0].ends_with("222"));
        assert!(lines[1].starts_with("[0] ") && lines[1].ends_with("111"));

        assert!(history.delete(5).unwrap().is_empty());
        assert_eq!(history.delete(0).unwrap(), ["Deleted: 111"]);
        history.clear().unwrap();
        assert_eq!(history.lines(), ["No scans yet"]);
    }
}
