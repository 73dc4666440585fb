//! Integration tests for contacts, CSV import and the waiting list.

use assert_matches::assert_matches;
use empodhera_core::contacts::parse_contacts_csv;
use empodhera_db::models::contact::CreateContact;
use empodhera_db::models::waiting_list::CreateWaitingListEntry;
use empodhera_db::repositories::{ContactRepo, DashboardRepo, WaitingListRepo};
use sqlx::PgPool;

fn new_contact(email: &str, name: Option<&str>) -> CreateContact {
    CreateContact {
        email: email.to_string(),
        name: name.map(str::to_string),
        created_by: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_email_violates_unique_constraint(pool: PgPool) {
    ContactRepo::create(&pool, &new_contact("ana@x.com", Some("Ana"))).await.unwrap();
    let err = ContactRepo::create(&pool, &new_contact("ana@x.com", None)).await.unwrap_err();

    assert_matches!(
        err,
        sqlx::Error::Database(ref db) if db.constraint() == Some("uq_contacts_email")
    );
    assert!(!ContactRepo::create_if_absent(&pool, &new_contact("ana@x.com", None))
        .await
        .unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn import_skips_existing_addresses(pool: PgPool) {
    ContactRepo::create(&pool, &new_contact("ana@x.com", Some("Ana"))).await.unwrap();

    let parsed = parse_contacts_csv("email;nome\nANA@x.com;Ana\nbia@x.com;Bia\ncarla@x.com;\n")
        .unwrap();
    assert_eq!(parsed.len(), 3);

    let inserted = ContactRepo::import(&pool, &parsed, None).await.unwrap();
    assert_eq!(inserted, 2);

    let carla = ContactRepo::find_by_email(&pool, "carla@x.com").await.unwrap().unwrap();
    assert_eq!(carla.name, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn search_matches_email_or_name(pool: PgPool) {
    ContactRepo::create(&pool, &new_contact("ana@x.com", Some("Ana Souza"))).await.unwrap();
    ContactRepo::create(&pool, &new_contact("bia@y.com", Some("Beatriz"))).await.unwrap();

    let by_name = ContactRepo::list(&pool, Some("souza")).await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].email, "ana@x.com");

    let by_domain = ContactRepo::list(&pool, Some("Y.COM")).await.unwrap();
    assert_eq!(by_domain.len(), 1);

    let all = ContactRepo::list(&pool, None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].email, "bia@y.com", "newest first");
}

#[sqlx::test(migrations = "./migrations")]
async fn waiting_list_join_is_idempotent(pool: PgPool) {
    let entry = CreateWaitingListEntry {
        name: "Ana Souza".to_string(),
        email: "ana@x.com".to_string(),
        phone: None,
        subscribed_to_marketing: false,
    };

    let first = WaitingListRepo::create_if_absent(&pool, &entry).await.unwrap();
    let second = WaitingListRepo::create_if_absent(&pool, &entry).await.unwrap();
    assert!(first.is_some());
    assert!(second.is_none());

    let counts = DashboardRepo::counts(&pool).await.unwrap();
    assert_eq!(counts.waiting_list, 1);
    assert_eq!(counts.contacts, 0);

    assert!(WaitingListRepo::delete(&pool, first.unwrap().id).await.unwrap());
    assert!(WaitingListRepo::list(&pool).await.unwrap().is_empty());
}
