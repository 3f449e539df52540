use brokerdesk::core::error::DeskError;
use brokerdesk::core::store::Store;
use brokerdesk::core::workflow::ApprovalStatus;
use brokerdesk::plugins::accounts::{NewAccount, create_account};
use brokerdesk::plugins::bots::{
    NewBotAssignment, approve_bot_request, assign_bot, get_bot_request, list_bot_requests,
    list_user_bots, reject_bot_request,
};
use brokerdesk::plugins::catalog::{AdminBotPatch, NewAdminBot, create_admin_bot, update_admin_bot};
use brokerdesk::plugins::users::{NewUser, delete_user, register_user};
use tempfile::tempdir;

struct Fixture {
    account_id: u64,
    bot_id: u64,
}

fn setup(store: &Store, uid: &str) -> Fixture {
    register_user(
        store,
        &NewUser {
            uid: uid.to_string(),
            email: format!("{}@example.com", uid),
            name: format!("Trader {}", uid),
        },
    )
    .unwrap();
    let account = create_account(
        store,
        uid,
        &NewAccount {
            broker: "X".to_string(),
            account_type: "margin".to_string(),
            account_number: "123".to_string(),
        },
    )
    .unwrap();
    let bot = create_admin_bot(
        store,
        &NewAdminBot {
            name: "Scalper".to_string(),
            price: Some(10.0),
            cost: Some(5.0),
            subscription_fee: Some(1.0),
        },
    )
    .unwrap();
    Fixture {
        account_id: account.id,
        bot_id: bot.id,
    }
}

fn assignment(uid: &str, fx: &Fixture) -> NewBotAssignment {
    NewBotAssignment {
        uid: uid.to_string(),
        broker_account_id: fx.account_id,
        bot_id: fx.bot_id,
        signed_agreement_url: "https://files.example.com/agreement.pdf".to_string(),
    }
}

#[test]
fn test_assign_denormalizes_catalog_and_account() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    let fx = setup(&store, "u1");

    let bot = assign_bot(&store, &assignment("u1", &fx)).unwrap();
    assert_eq!(bot.bot_name, "Scalper");
    assert_eq!(bot.price, 10.0);
    assert_eq!(bot.broker, "X");
    assert_eq!(bot.account_number, "123");
    assert_eq!(bot.status, ApprovalStatus::Pending);

    // Later catalog edits do not reach existing requests.
    update_admin_bot(
        &store,
        fx.bot_id,
        &AdminBotPatch {
            name: Some("Renamed".to_string()),
            price: Some(99.0),
            ..AdminBotPatch::default()
        },
    )
    .unwrap();
    let bots = list_user_bots(&store, "u1").unwrap();
    let stored = &bots[0];
    assert_eq!(stored.bot_name, "Scalper");
    assert_eq!(stored.price, 10.0);
}

#[test]
fn test_unknown_catalog_bot_is_not_found_and_not_stored() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    let fx = setup(&store, "u1");

    let mut input = assignment("u1", &fx);
    input.bot_id = fx.bot_id + 1_000;
    let err = assign_bot(&store, &input).unwrap_err();
    assert!(matches!(err, DeskError::NotFound(ref m) if m.starts_with("bot")));
    assert!(store.load().unwrap().bots.is_empty());
}

#[test]
fn test_resolution_order_user_account_bot() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    let fx = setup(&store, "u1");
    setup(&store, "u2");

    let mut ghost = assignment("ghost", &fx);
    ghost.bot_id = 1;
    let err = assign_bot(&store, &ghost).unwrap_err();
    assert!(matches!(err, DeskError::NotFound(ref m) if m.starts_with("user")));

    // Account missing and bot missing: the account is reported.
    let mut both_missing = assignment("u1", &fx);
    both_missing.broker_account_id = 1;
    both_missing.bot_id = 1;
    let err = assign_bot(&store, &both_missing).unwrap_err();
    assert!(matches!(err, DeskError::NotFound(ref m) if m.starts_with("account")));

    // Another user's account does not resolve.
    let err = assign_bot(&store, &assignment("u2", &fx)).unwrap_err();
    assert!(matches!(err, DeskError::NotFound(ref m) if m.starts_with("account")));
}

#[test]
fn test_assign_validation() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    let fx = setup(&store, "u1");

    let mut input = assignment("u1", &fx);
    input.signed_agreement_url = String::new();
    assert!(matches!(
        assign_bot(&store, &input),
        Err(DeskError::ValidationError(_))
    ));
}

#[test]
fn test_request_review_workflow() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    let fx = setup(&store, "u1");
    let bot = assign_bot(&store, &assignment("u1", &fx)).unwrap();

    let approved = approve_bot_request(&store, bot.id).unwrap();
    assert_eq!(approved.bot.status, ApprovalStatus::Approved);
    assert_eq!(approved.user_name, "Trader u1");
    assert_eq!(approved.user_email, "u1@example.com");

    let rejected = reject_bot_request(&store, bot.id).unwrap();
    assert_eq!(rejected.bot.status, ApprovalStatus::Rejected);
    assert!(matches!(
        approve_bot_request(&store, bot.id + 1),
        Err(DeskError::NotFound(_))
    ));
}

#[test]
fn test_request_views_filter_and_enrich() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    let fx = setup(&store, "u1");
    let first = assign_bot(&store, &assignment("u1", &fx)).unwrap();
    let second = assign_bot(&store, &assignment("u1", &fx)).unwrap();
    assert!(second.id > first.id);
    approve_bot_request(&store, second.id).unwrap();

    let pending = list_bot_requests(&store, Some(ApprovalStatus::Pending)).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].bot.id, first.id);

    let json = serde_json::to_value(&pending[0]).unwrap();
    assert_eq!(json["botName"], "Scalper");
    assert_eq!(json["userName"], "Trader u1");
    assert_eq!(json["status"], "pending");
}

#[test]
fn test_views_of_deleted_owner_show_unknown() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    let fx = setup(&store, "u1");
    let bot = assign_bot(&store, &assignment("u1", &fx)).unwrap();
    delete_user(&store, 1).unwrap();

    let view = get_bot_request(&store, bot.id).unwrap();
    assert_eq!(view.user_name, "Unknown");
    assert_eq!(view.user_email, "");
    assert_eq!(list_user_bots(&store, "u1").unwrap().len(), 1);
}
