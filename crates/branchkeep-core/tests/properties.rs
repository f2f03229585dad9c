use branchkeep_core::{
    hash_password, AuthError, BranchManager, CredentialGate, MemoryRecordStore, ScanLog,
};
use tempfile::TempDir;

#[test]
fn registered_users_can_sign_in() {
    let store = MemoryRecordStore::new();
    let gate = CredentialGate::new(&store);

    for (user, pass) in [("abc", "123456"), ("alice", "correct horse"), ("Ünïcode", "pässwörd")] {
        gate.register_user(user, pass).unwrap();
        assert!(gate.login_user(user, pass).is_ok());
        assert!(matches!(
            gate.login_user(user, "wrong-password"),
            Err(AuthError::InvalidPassword)
        ));
    }
}

#[test]
fn unknown_user_is_reported() {
    let store = MemoryRecordStore::new();
    let gate = CredentialGate::new(&store);
    let err = gate.login_user("nobody", "whatever").unwrap_err();
    assert_eq!(err.to_string(), "User not found");
}

#[test]
fn signup_then_branches_for_that_user() {
    let store = MemoryRecordStore::new();
    let user = CredentialGate::new(&store)
        .register_user("alice", "hunter22")
        .unwrap();

    let mut manager = BranchManager::new(&store, user.username.clone());
    manager.add_branch("A", "2024-01-01", "2024-02-01").unwrap();
    manager.add_branch("B", "2024-03-01", "2024-04-01").unwrap();

    let mut reloaded = BranchManager::new(&store, user.username);
    let names: Vec<_> = reloaded
        .load_branches()
        .unwrap()
        .iter()
        .map(|b| b.name.clone())
        .collect();
    assert_eq!(names, ["A", "B"]);
}

#[test]
fn scan_log_restart_cycle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");

    ScanLog::load(&path).add("123").unwrap();
    let mut log = ScanLog::load(&path);
    assert_eq!(log.len(), 1);
    assert_eq!(log.records()[0].barcode, "123");

    log.clear().unwrap();
    assert!(ScanLog::load(&path).is_empty());
}

#[test]
fn digests_differ_per_password() {
    let digests: std::collections::HashSet<_> =
        ["aaaaaa", "aaaaab", "bbbbbb", "123456"].iter().map(|p| hash_password(p)).collect();
    assert_eq!(digests.len(), 4);
}
