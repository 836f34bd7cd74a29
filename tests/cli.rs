//! Drives the `userreg` binary against a fresh database file.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn run(db: &Path, args: &[&str]) -> (Option<i32>, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_userreg"))
        .arg("--db")
        .arg(db)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    (output.status.code(), stdout.trim_end().to_string())
}

#[test]
fn add_login_and_list_through_the_binary() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("u.db");

    assert_eq!(
        run(&db, &["add", "u1", "u1@x.com", "p1"]),
        (Some(0), "Created user 'u1' (id 1)".to_string())
    );
    assert_eq!(
        run(&db, &["add", "u1", "other@x.com", "p2"]),
        (Some(1), "Username 'u1' is already taken".to_string())
    );
    assert_eq!(
        run(&db, &["login", "u1", "p1"]),
        (Some(0), "Authenticated".to_string())
    );
    assert_eq!(
        run(&db, &["login", "u1", "wrong"]),
        (Some(1), "Invalid username or password".to_string())
    );
    assert_eq!(
        run(&db, &["login", "u2", "p1"]),
        (Some(1), "Invalid username or password".to_string())
    );

    let (code, listing) = run(&db, &["list"]);
    assert_eq!(code, Some(0));
    assert_eq!(listing, "Registered users (1):\n     1  u1  <u1@x.com>");
    assert!(!listing.contains("p1"));
}

#[test]
fn every_command_initializes_a_fresh_file() {
    let tmp = TempDir::new().unwrap();

    let (code, listing) = run(&tmp.path().join("list.db"), &["list"]);
    assert_eq!(code, Some(0));
    assert_eq!(listing, "No registered users.");

    let (code, out) = run(&tmp.path().join("login.db"), &["login", "ghost", "pw"]);
    assert_eq!(code, Some(1));
    assert_eq!(out, "Invalid username or password");

    let init_db = tmp.path().join("nested").join("init.db");
    let (code, out) = run(&init_db, &["init"]);
    assert_eq!(code, Some(0));
    assert_eq!(out, format!("Initialized {}", init_db.display()));
    assert!(init_db.is_file());
}

#[test]
fn padded_username_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("u.db");

    let (code, out) = run(&db, &["add", " u1 ", "u1@x.com", "p1"]);
    assert_ne!(code, Some(0));
    assert!(out.is_empty());
    assert_eq!(
        run(&db, &["list"]),
        (Some(0), "No registered users.".to_string())
    );
}
