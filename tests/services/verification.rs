#[path = "../common/mod.rs"]
mod common;
use common::*;

fn verifier(clock: &std::sync::Arc<FixedClock>) -> LicenseVerifier {
    LicenseVerifier::new(clock.clone())
}

#[test]
fn test_valid_license_binds_device() {
    let mut conn = setup_test_db();
    let clock = test_clock();
    let license = create_test_license(&conn, 1, Some(clock.now() + 10 * ONE_DAY + 60), &["CALCULADORA", "VISOR"]);

    let response = verifier(&clock)
        .verify(&mut conn, &verify_request(&license.license_code, "AAA", "calculadora"))
        .unwrap();

    assert!(response.valid, "expected valid, got {:?}", response.message);
    assert_eq!(response.message, MSG_VALID);
    assert_eq!(response.client_name.as_deref(), Some("Acme Corp"));
    assert_eq!(response.expires_at, license.expires_at);
    assert_eq!(response.days_remaining, Some(DaysRemaining::Days(10)));
    assert_eq!(
        response.modules,
        Some(vec!["CALCULADORA".to_string(), "VISOR".to_string()])
    );

    let devices = queries::list_devices(&conn, &license.id).unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].machine_id, "AAA");
    assert_eq!(devices[0].device_name.as_deref(), Some("Device-AAA"));
}

#[test]
fn test_reverification_is_idempotent() {
    let mut conn = setup_test_db();
    let clock = test_clock();
    let license = create_test_license(&conn, 1, None, &["VISOR"]);
    let request = verify_request(&license.license_code, "machine-1", "VISOR");

    let first = verifier(&clock).verify(&mut conn, &request).unwrap();
    let first_check = queries::find_device(&conn, &license.id, "machine-1").unwrap().unwrap().last_check;

    clock.advance(120);
    let second = verifier(&clock).verify(&mut conn, &request).unwrap();
    let device = queries::find_device(&conn, &license.id, "machine-1").unwrap().unwrap();

    assert!(first.valid && second.valid);
    assert_eq!(queries::count_devices(&conn, &license.id).unwrap(), 1, "no second device row");
    assert!(device.last_check > first_check, "last_check should advance");
    assert_eq!(device.first_activation, first_check);
}

#[test]
fn test_device_quota_is_enforced() {
    let mut conn = setup_test_db();
    let clock = test_clock();
    let license = create_test_license(&conn, 2, None, &["CALCULADORA"]);

    for machine in ["machine-1", "machine-2"] {
        let response = verifier(&clock)
            .verify(&mut conn, &verify_request(&license.license_code, machine, "CALCULADORA"))
            .unwrap();
        assert!(response.valid, "{} should bind", machine);
    }

    let third = verifier(&clock)
        .verify(&mut conn, &verify_request(&license.license_code, "machine-3", "CALCULADORA"))
        .unwrap();
    assert!(!third.valid);
    assert_eq!(third.message, "device limit reached (2 max)");
    assert!(third.modules.is_none(), "rejections carry no license details");
    assert_eq!(queries::count_devices(&conn, &license.id).unwrap(), 2);
}

#[test]
fn test_single_device_scenario() {
    let mut conn = setup_test_db();
    let clock = test_clock();
    let license = LicenseRegistry::new(clock.clone())
        .issue(
            &mut conn,
            &IssueLicense {
                client_name: "Acme".into(),
                client_email: String::new(),
                max_devices: 1,
                days_valid: 0,
                notes: String::new(),
                modules: vec!["CALCULADORA".into()],
            },
        )
        .unwrap();

    let first = verifier(&clock)
        .verify(&mut conn, &verify_request(&license.license_code, "AAA", "calculadora"))
        .unwrap();
    assert!(first.valid);
    assert_eq!(first.days_remaining, Some(DaysRemaining::NoLimit));

    let second = verifier(&clock)
        .verify(&mut conn, &verify_request(&license.license_code, "BBB", "calculadora"))
        .unwrap();
    assert!(!second.valid);
    assert!(second.message.contains("device limit"), "got {:?}", second.message);
    assert_eq!(queries::count_devices(&conn, &license.id).unwrap(), 1);
}

#[test]
fn test_entitlement_checked_before_device_slot() {
    let mut conn = setup_test_db();
    let clock = test_clock();
    let license = create_test_license(&conn, 1, None, &["VISOR"]);

    let response = verifier(&clock)
        .verify(&mut conn, &verify_request(&license.license_code, "machine-1", "nomina"))
        .unwrap();
    assert!(!response.valid);
    assert_eq!(response.message, "no access to NOMINA");
    assert_eq!(
        queries::count_devices(&conn, &license.id).unwrap(),
        0,
        "an entitlement failure must not consume a slot"
    );
}

#[test]
fn test_expired_license_always_fails() {
    let mut conn = setup_test_db();
    let clock = test_clock();
    let license = create_test_license(&conn, 1, Some(clock.now() + ONE_DAY), &["VISOR"]);

    let before = verifier(&clock)
        .verify(&mut conn, &verify_request(&license.license_code, "machine-1", "VISOR"))
        .unwrap();
    assert!(before.valid);

    clock.advance(2 * ONE_DAY);
    let bound = verifier(&clock)
        .verify(&mut conn, &verify_request(&license.license_code, "machine-1", "VISOR"))
        .unwrap();
    assert!(!bound.valid, "already bound device must be refused after expiry");
    assert_eq!(bound.message, MSG_EXPIRED);

    let wrong_product = verifier(&clock)
        .verify(&mut conn, &verify_request(&license.license_code, "machine-2", "NOMINA"))
        .unwrap();
    assert_eq!(wrong_product.message, MSG_EXPIRED, "expiry is checked before entitlement");
}

#[test]
fn test_inactive_and_unknown_licenses() {
    let mut conn = setup_test_db();
    let clock = test_clock();
    let license = create_test_license(&conn, 1, None, &["VISOR"]);
    queries::set_license_active(&conn, &license.id, false).unwrap();

    let inactive = verifier(&clock)
        .verify(&mut conn, &verify_request(&license.license_code, "machine-1", "VISOR"))
        .unwrap();
    assert!(!inactive.valid);
    assert_eq!(inactive.message, MSG_INACTIVE);

    let unknown = verifier(&clock)
        .verify(&mut conn, &verify_request("0000", "machine-1", "VISOR"))
        .unwrap();
    assert!(!unknown.valid);
    assert_eq!(unknown.message, MSG_NOT_FOUND);
    assert_eq!(queries::count_devices(&conn, &license.id).unwrap(), 0);
}

#[test]
fn test_blank_machine_id_is_rejected() {
    let mut conn = setup_test_db();
    let clock = test_clock();
    let license = create_test_license(&conn, 1, None, &["VISOR"]);

    let response = verifier(&clock)
        .verify(&mut conn, &verify_request(&license.license_code, "   ", "VISOR"))
        .unwrap();
    assert!(!response.valid);
    assert_eq!(response.message, MSG_MACHINE_ID_REQUIRED);
    assert_eq!(queries::count_devices(&conn, &license.id).unwrap(), 0);
}

#[test]
fn test_removed_device_frees_slot_for_another_machine() {
    let mut conn = setup_test_db();
    let clock = test_clock();
    let registry = LicenseRegistry::new(clock.clone());
    let license = create_test_license(&conn, 1, None, &["VISOR"]);

    assert!(
        verifier(&clock)
            .verify(&mut conn, &verify_request(&license.license_code, "AAA", "VISOR"))
            .unwrap()
            .valid
    );
    let device = registry.list_devices(&conn, &license.id).unwrap().remove(0);
    registry.remove_device(&conn, &license.id, &device.id).unwrap();

    let response = verifier(&clock)
        .verify(&mut conn, &verify_request(&license.license_code, "BBB", "VISOR"))
        .unwrap();
    assert!(response.valid, "freed slot should accept a new machine");
}
