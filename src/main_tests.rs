use std::path::PathBuf;

use crate::app::AppError;
use crate::cli::{Commands, LoginArgs};
use crate::session::Session;

use super::{maybe_run_local_command, read_input};

fn unique_dir(prefix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::now_v7()));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

#[test]
fn store_commands_are_not_local() {
    let dir = unique_dir("leadboard-main-test");
    let outcome = maybe_run_local_command(&Commands::Members, &dir).expect("probe should succeed");
    assert!(outcome.is_none());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn login_whoami_logout_cycle() {
    let dir = unique_dir("leadboard-main-test");
    let login = Commands::Login(LoginArgs {
        user_id: "U5".to_string(),
    });
    assert_eq!(
        maybe_run_local_command(&login, &dir).expect("login should work"),
        Some("signed in as U5\n".to_string())
    );
    assert_eq!(
        Session::load(&dir).expect("session should load").user_id(),
        Some("U5")
    );
    assert_eq!(
        maybe_run_local_command(&Commands::Whoami, &dir).expect("whoami"),
        Some("U5\n".to_string())
    );
    maybe_run_local_command(&Commands::Logout, &dir).expect("logout");
    assert_eq!(
        maybe_run_local_command(&Commands::Whoami, &dir).expect("whoami"),
        Some("not signed in\n".to_string())
    );
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn blank_login_is_rejected() {
    let dir = unique_dir("leadboard-main-test");
    let login = Commands::Login(LoginArgs {
        user_id: "  ".to_string(),
    });
    let err = maybe_run_local_command(&login, &dir).expect_err("blank id must fail");
    assert!(matches!(err, AppError::InvalidArgument(_)));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn read_input_reads_files() {
    let dir = unique_dir("leadboard-main-test");
    let path = dir.join("rows.json");
    std::fs::write(&path, "[]").expect("fixture should be writable");
    assert_eq!(read_input(&path).expect("file should read"), "[]");
    assert!(matches!(
        read_input(&dir.join("missing.json")),
        Err(AppError::Io(_))
    ));
    let _ = std::fs::remove_dir_all(dir);
}
