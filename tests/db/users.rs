#[path = "../common/mod.rs"]
mod common;
use common::*;

#[test]
fn test_create_and_fetch_user() {
    let conn = setup_test_db();
    let user = create_test_user(&conn, "ana@example.com", false);

    let by_id = queries::get_user_by_id(&conn, &user.id)
        .unwrap()
        .expect("user should be found by id");
    assert_eq!(by_id.email, "ana@example.com");
    assert!(by_id.is_active, "new users start active");
    assert!(!by_id.is_admin);

    let by_email = queries::get_user_by_email(&conn, "ana@example.com")
        .unwrap()
        .expect("user should be found by email");
    assert_eq!(by_email.id, user.id);
    assert!(
        by_email.password_hash.starts_with("$argon2"),
        "password hash should be stored in PHC format"
    );
}

#[test]
fn test_email_is_unique() {
    let conn = setup_test_db();
    create_test_user(&conn, "ana@example.com", false);

    assert!(queries::email_exists(&conn, "ana@example.com").unwrap());
    assert!(!queries::email_exists(&conn, "bob@example.com").unwrap());

    let hash = hash_password(TEST_PASSWORD, &PasswordParams::insecure_fast()).unwrap();
    let duplicate = queries::create_user(
        &conn,
        &NewUser {
            email: "ana@example.com",
            password_hash: &hash,
            full_name: "Other Ana",
            company: None,
            phone: None,
            is_admin: false,
        },
        now(),
    );
    assert!(duplicate.is_err(), "duplicate email must violate the unique index");
}

#[test]
fn test_set_user_flags() {
    let conn = setup_test_db();
    let user = create_test_user(&conn, "ana@example.com", false);

    assert!(queries::set_user_active(&conn, &user.id, false).unwrap());
    assert!(queries::set_user_admin(&conn, &user.id, true).unwrap());

    let updated = queries::get_user_by_id(&conn, &user.id).unwrap().unwrap();
    assert!(!updated.is_active);
    assert!(updated.is_admin);

    assert!(
        !queries::set_user_active(&conn, "missing", true).unwrap(),
        "updating an unknown user should report no change"
    );
}

#[test]
fn test_sessions_are_listed_per_user() {
    let conn = setup_test_db();
    let user = create_test_user(&conn, "ana@example.com", false);
    let other = create_test_user(&conn, "bob@example.com", false);
    let t = now();

    queries::create_session(&conn, &user.id, "hash-1", Some("10.0.0.1"), t, t + ONE_DAY).unwrap();
    queries::create_session(&conn, &user.id, "hash-2", None, t + 1, t + ONE_DAY).unwrap();
    queries::create_session(&conn, &other.id, "hash-3", None, t, t + ONE_DAY).unwrap();

    let sessions = queries::list_sessions_for_user(&conn, &user.id).unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].token_hash, "hash-2", "newest session first");
    assert_eq!(sessions[1].ip_address.as_deref(), Some("10.0.0.1"));
}

#[test]
fn test_list_users_includes_everyone() {
    let conn = setup_test_db();
    create_test_user(&conn, "ana@example.com", true);
    create_test_user(&conn, "bob@example.com", false);

    let users = queries::list_users(&conn).unwrap();
    assert_eq!(users.len(), 2);
}
