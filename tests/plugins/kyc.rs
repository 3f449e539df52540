use brokerdesk::core::error::DeskError;
use brokerdesk::core::store::Store;
use brokerdesk::core::workflow::ApprovalStatus;
use brokerdesk::plugins::kyc::{approve_kyc, get_kyc_request, list_kyc_requests, reject_kyc};
use brokerdesk::plugins::users::{KycInput, NewUser, get_user, register_user, submit_kyc};
use tempfile::tempdir;

fn setup_user(store: &Store, uid: &str) {
    register_user(
        store,
        &NewUser {
            uid: uid.to_string(),
            email: format!("{}@example.com", uid),
            name: format!("Name {}", uid),
        },
    )
    .unwrap();
}

fn submit(store: &Store, uid: &str) {
    let input = KycInput {
        full_name: "Grace Hopper".to_string(),
        date_of_birth: "1985-01-01".to_string(),
        address: "1 Harbor Road".to_string(),
        id_type: "nic".to_string(),
        id_number: "851234567V".to_string(),
        ..KycInput::default()
    };
    submit_kyc(store, uid, &input).unwrap();
}

#[test]
fn test_kyc_approve_keeps_completed_flag() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    setup_user(&store, "u1");
    submit(&store, "u1");

    assert_eq!(get_kyc_request(&store, "u1").unwrap().kyc_status, ApprovalStatus::Pending);

    let approved = approve_kyc(&store, "u1").unwrap();
    assert_eq!(approved.kyc_status, ApprovalStatus::Approved);
    assert!(approved.kyc_completed);

    let user = get_user(&store, "u1").unwrap();
    assert_eq!(user.kyc_status, ApprovalStatus::Approved);
    assert!(user.kyc_completed);
    // Account status is a separate workflow.
    assert_eq!(user.status, ApprovalStatus::Pending);
}

#[test]
fn test_kyc_reject_without_submission_is_not_found() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    setup_user(&store, "u1");

    let err = reject_kyc(&store, "u1").unwrap_err();
    assert!(matches!(err, DeskError::NotFound(_)));
    assert_eq!(err.status_code(), 404);
    assert!(matches!(approve_kyc(&store, "ghost"), Err(DeskError::NotFound(_))));
    assert!(matches!(get_kyc_request(&store, "u1"), Err(DeskError::NotFound(_))));
    assert_eq!(get_user(&store, "u1").unwrap().kyc_status, ApprovalStatus::Pending);
}

#[test]
fn test_kyc_decisions_can_be_corrected() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    setup_user(&store, "u1");
    submit(&store, "u1");

    reject_kyc(&store, "u1").unwrap();
    let corrected = approve_kyc(&store, "u1").unwrap();
    assert_eq!(corrected.kyc_status, ApprovalStatus::Approved);
}

#[test]
fn test_resubmission_resets_review() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    setup_user(&store, "u1");
    submit(&store, "u1");
    reject_kyc(&store, "u1").unwrap();

    submit(&store, "u1");
    let user = get_user(&store, "u1").unwrap();
    assert_eq!(user.kyc_status, ApprovalStatus::Pending);
    assert!(user.kyc_completed);
}

#[test]
fn test_list_only_includes_submissions_and_enriches() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    setup_user(&store, "u1");
    setup_user(&store, "u2");
    setup_user(&store, "u3");
    submit(&store, "u1");
    submit(&store, "u3");
    approve_kyc(&store, "u3").unwrap();

    let all = list_kyc_requests(&store, None).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].uid, "u1");
    assert_eq!(all[0].name, "Name u1");
    assert_eq!(all[0].email, "u1@example.com");

    let approved = list_kyc_requests(&store, Some(ApprovalStatus::Approved)).unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].uid, "u3");

    let json = serde_json::to_value(&all[0]).unwrap();
    assert_eq!(json["kyc"]["fullName"], "Grace Hopper");
    assert_eq!(json["userId"], 1);
}
