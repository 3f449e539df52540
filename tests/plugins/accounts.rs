use brokerdesk::core::error::DeskError;
use brokerdesk::core::store::Store;
use brokerdesk::plugins::accounts::{NewAccount, create_account, delete_account, list_accounts};
use brokerdesk::plugins::users::{NewUser, register_user};
use tempfile::tempdir;

fn setup(store: &Store, uid: &str) {
    register_user(
        store,
        &NewUser {
            uid: uid.to_string(),
            email: format!("{}@example.com", uid),
            name: String::new(),
        },
    )
    .unwrap();
}

fn margin(number: &str) -> NewAccount {
    NewAccount {
        broker: "X".to_string(),
        account_type: "margin".to_string(),
        account_number: number.to_string(),
    }
}

#[test]
fn test_create_and_list_accounts() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    setup(&store, "u1");
    setup(&store, "u2");

    let a1 = create_account(&store, "u1", &margin("123")).unwrap();
    let a2 = create_account(&store, "u1", &margin("456")).unwrap();
    create_account(&store, "u2", &margin("789")).unwrap();

    assert!(a2.id > a1.id);
    assert_eq!(a1.uid, "u1");
    assert_eq!(a1.account_type, "margin");

    let mine = list_accounts(&store, "u1").unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].account_number, "123");
    assert_eq!(mine[1].account_number, "456");
    assert!(list_accounts(&store, "nobody").unwrap().is_empty());
}

#[test]
fn test_create_requires_user_and_fields() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    setup(&store, "u1");

    assert!(matches!(
        create_account(&store, "ghost", &margin("1")),
        Err(DeskError::NotFound(_))
    ));

    let mut missing = margin("1");
    missing.broker = " ".to_string();
    let err = create_account(&store, "u1", &missing).unwrap_err();
    assert!(matches!(err, DeskError::ValidationError(_)));
    assert!(err.to_string().contains("broker"));

    assert!(store.load().unwrap().accounts.is_empty());
}

#[test]
fn test_delete_is_scoped_to_owner() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path());
    setup(&store, "u1");
    setup(&store, "u2");
    let account = create_account(&store, "u1", &margin("123")).unwrap();

    assert!(matches!(
        delete_account(&store, "u2", account.id),
        Err(DeskError::NotFound(_))
    ));
    assert_eq!(list_accounts(&store, "u1").unwrap().len(), 1);

    let removed = delete_account(&store, "u1", account.id).unwrap();
    assert_eq!(removed.id, account.id);
    assert!(list_accounts(&store, "u1").unwrap().is_empty());
}
