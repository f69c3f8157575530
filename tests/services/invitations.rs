#[path = "../common/mod.rs"]
mod common;
use common::*;

#[test]
fn test_create_code_records_creator_and_expiry() {
    let conn = setup_test_db();
    let clock = test_clock();
    let ledger = InvitationLedger::new(clock.clone());
    let admin = create_test_user(&conn, "admin@example.com", true);

    let code = ledger
        .create_code(
            &conn,
            Some(&admin.id),
            &CreateInvitationCode {
                max_uses: 3,
                days_valid: 7,
            },
        )
        .unwrap();

    assert_eq!(code.max_uses, 3);
    assert_eq!(code.current_uses, 0);
    assert!(code.is_active);
    assert_eq!(code.created_by.as_deref(), Some(admin.id.as_str()));
    assert_eq!(code.expires_at, Some(clock.now() + 7 * ONE_DAY));
    assert!(
        code.code.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
        "invitation codes are lowercase hex"
    );
}

#[test]
fn test_code_without_expiry() {
    let conn = setup_test_db();
    let ledger = InvitationLedger::new(test_clock());

    let code = ledger
        .create_code(&conn, None, &CreateInvitationCode { max_uses: 1, days_valid: 0 })
        .unwrap();
    assert_eq!(code.expires_at, None);
    assert_eq!(code.created_by, None);
}

#[test]
fn test_zero_uses_is_rejected() {
    let conn = setup_test_db();
    let ledger = InvitationLedger::new(test_clock());

    let result = ledger.create_code(&conn, None, &CreateInvitationCode { max_uses: 0, days_valid: 0 });
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert!(ledger.list_codes(&conn).unwrap().is_empty());
}

#[test]
fn test_deactivating_code_keeps_registered_users() {
    let mut conn = setup_test_db();
    let clock = test_clock();
    let ledger = InvitationLedger::new(clock.clone());
    let auth = test_auth_service(clock, None);

    let code = ledger
        .create_code(&conn, None, &CreateInvitationCode { max_uses: 5, days_valid: 0 })
        .unwrap();
    let registered = auth
        .register(&mut conn, &register_request("ana@example.com", &code.code), None)
        .unwrap();

    let disabled = ledger.set_status(&conn, &code.id, false).unwrap();
    assert!(!disabled.is_active);
    assert_eq!(disabled.current_uses, 1);

    let user = queries::get_user_by_id(&conn, &registered.user.id).unwrap().unwrap();
    assert!(user.is_active, "existing accounts are unaffected");

    let err = auth
        .register(&mut conn, &register_request("bob@example.com", &code.code), None)
        .unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthFailure::InvalidCode)));

    assert!(matches!(
        ledger.set_status(&conn, "missing", true),
        Err(AppError::NotFound(_))
    ));
}
