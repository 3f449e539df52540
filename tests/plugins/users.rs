use brokerdesk::core::broker::DocBroker;
use brokerdesk::core::error::DeskError;
use brokerdesk::core::store::Store;
use brokerdesk::core::workflow::ApprovalStatus;
use brokerdesk::plugins::users::{
    KycInput, NewUser, Registration, approve_user, delete_user, get_user, list_users,
    public_profile, register_user, submit_kyc,
};
use tempfile::tempdir;

fn new_user(uid: &str) -> NewUser {
    NewUser {
        uid: uid.to_string(),
        email: format!("{}@example.com", uid),
        name: format!("User {}", uid),
    }
}

fn kyc_input() -> KycInput {
    KycInput {
        full_name: "Ada Lovelace".to_string(),
        date_of_birth: "1990-12-10".to_string(),
        address: "12 Main Street".to_string(),
        id_type: "passport".to_string(),
        id_number: "N1234567".to_string(),
        id_front_image: Some("aGVsbG8=".to_string()),
        ..KycInput::default()
    }
}

#[test]
fn test_register_is_idempotent_on_uid() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());

    let first = register_user(&store, &new_user("u1")).unwrap();
    assert!(first.is_created());
    assert_eq!(first.status_code(), 201);

    let second = register_user(
        &store,
        &NewUser {
            uid: "u1".to_string(),
            email: "other@example.com".to_string(),
            name: String::new(),
        },
    )
    .unwrap();
    assert!(matches!(second, Registration::Existing(_)));
    assert_eq!(second.status_code(), 200);
    assert_eq!(second.user().id, first.user().id);
    assert_eq!(second.user().email, "u1@example.com");

    assert_eq!(list_users(&store, None).unwrap().len(), 1);
    assert_eq!(store.load().unwrap().next_user_id, 2);
}

#[test]
fn test_repeat_registration_writes_nothing() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    register_user(&store, &new_user("u1")).unwrap();
    let before = std::fs::read(store.document_path()).unwrap();

    // An existing uid answers with the stored record even when the new
    // email would not pass the format check.
    let again = register_user(
        &store,
        &NewUser {
            uid: "u1".to_string(),
            email: "not-an-email".to_string(),
            name: String::new(),
        },
    )
    .unwrap();
    assert!(!again.is_created());
    assert_eq!(again.user().email, "u1@example.com");

    assert_eq!(std::fs::read(store.document_path()).unwrap(), before);
    let ops: Vec<String> = DocBroker::new(&store)
        .audit_log()
        .unwrap()
        .into_iter()
        .map(|e| e.op)
        .collect();
    assert_eq!(ops, vec!["user.register"]);

    let err = register_user(
        &store,
        &NewUser {
            uid: "u2".to_string(),
            email: "not-an-email".to_string(),
            name: String::new(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, DeskError::ValidationError(_)));
}

#[test]
fn test_user_ids_are_one_to_n() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());

    let ids: Vec<u64> = (0..6)
        .map(|i| {
            register_user(&store, &new_user(&format!("u{}", i)))
                .unwrap()
                .into_user()
                .id
        })
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_register_validation() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());

    let missing_uid = NewUser {
        uid: "  ".to_string(),
        email: "a@b.com".to_string(),
        name: String::new(),
    };
    assert!(matches!(
        register_user(&store, &missing_uid),
        Err(DeskError::ValidationError(_))
    ));

    let missing_email = NewUser {
        uid: "u1".to_string(),
        email: String::new(),
        name: String::new(),
    };
    let err = register_user(&store, &missing_email).unwrap_err();
    assert_eq!(err.status_code(), 400);

    let bad_email = NewUser {
        uid: "u1".to_string(),
        email: "not-an-email".to_string(),
        name: String::new(),
    };
    assert!(register_user(&store, &bad_email).is_err());
    assert!(list_users(&store, None).unwrap().is_empty());
}

#[test]
fn test_new_user_defaults() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    let user = register_user(&store, &new_user("u1")).unwrap().into_user();
    assert_eq!(user.id, 1);
    assert_eq!(user.status, ApprovalStatus::Pending);
    assert_eq!(user.kyc_status, ApprovalStatus::Pending);
    assert!(!user.kyc_completed);
    assert!(user.kyc.is_none());
}

#[test]
fn test_get_and_profile() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    register_user(&store, &new_user("u1")).unwrap();

    assert_eq!(get_user(&store, "u1").unwrap().name, "User u1");
    assert!(matches!(get_user(&store, "ghost"), Err(DeskError::NotFound(_))));

    let profile = public_profile(&store, "u1").unwrap();
    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["uid"], "u1");
    assert_eq!(json["kycStatus"], "pending");
    assert!(json.get("email").is_none());
    assert!(json.get("kyc").is_none());
}

#[test]
fn test_approve_and_filter_by_status() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    register_user(&store, &new_user("u1")).unwrap();
    register_user(&store, &new_user("u2")).unwrap();

    let approved = approve_user(&store, 2).unwrap();
    assert_eq!(approved.status, ApprovalStatus::Approved);

    let pending = list_users(&store, Some(ApprovalStatus::Pending)).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].uid, "u1");
    assert!(matches!(approve_user(&store, 99), Err(DeskError::NotFound(_))));
}

#[test]
fn test_delete_user() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    register_user(&store, &new_user("u1")).unwrap();

    let removed = delete_user(&store, 1).unwrap();
    assert_eq!(removed.uid, "u1");
    assert!(list_users(&store, None).unwrap().is_empty());
    assert!(matches!(delete_user(&store, 1), Err(DeskError::NotFound(_))));

    // The counter is not reused after a delete.
    let next = register_user(&store, &new_user("u2")).unwrap().into_user();
    assert_eq!(next.id, 2);
}

#[test]
fn test_submit_kyc_marks_completed_and_pending() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    register_user(&store, &new_user("u1")).unwrap();

    let user = submit_kyc(&store, "u1", &kyc_input()).unwrap();
    assert!(user.kyc_completed);
    assert_eq!(user.kyc_status, ApprovalStatus::Pending);
    let kyc = user.kyc.unwrap();
    assert_eq!(kyc.full_name, "Ada Lovelace");
    assert_eq!(kyc.id_front_image.as_deref(), Some("aGVsbG8="));
    assert!(!kyc.submitted_at.is_empty());
}

#[test]
fn test_submit_kyc_validation_and_unknown_user() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    register_user(&store, &new_user("u1")).unwrap();

    let mut incomplete = kyc_input();
    incomplete.id_number = String::new();
    let err = submit_kyc(&store, "u1", &incomplete).unwrap_err();
    assert!(err.to_string().contains("idNumber"));
    assert!(get_user(&store, "u1").unwrap().kyc.is_none());

    assert!(matches!(
        submit_kyc(&store, "ghost", &kyc_input()),
        Err(DeskError::NotFound(_))
    ));
}
