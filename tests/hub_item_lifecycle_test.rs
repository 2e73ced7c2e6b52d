mod common;

use assert_matches::assert_matches;
use common::TestHub;
use hub_items::errors::ServiceError;
use hub_items::models::{ImageField, ImagePayload, Item};
use regex::Regex;

fn tea(seller: Option<&str>) -> Item {
    Item {
        item_name: Some("Organic Darjeeling Tea".into()),
        item_code: Some("ODT-500".into()),
        hub_category: Some("Beverages".into()),
        hub_seller: seller.map(str::to_string),
        ..Default::default()
    }
}

fn inline_image(file_name: &str, content: &str) -> ImageField {
    ImageField::PendingUpload(ImagePayload {
        file_name: file_name.into(),
        base64_content: content.into(),
    })
}

#[tokio::test]
async fn create_assigns_name_route_and_keywords() {
    let hub = TestHub::new().await;
    hub.insert_seller(
        "seller-1",
        Some("Acme Teas"),
        Some("India"),
        Some("Estate grown"),
    )
    .await;

    let created = hub.service().create_item(tea(Some("seller-1"))).await.unwrap();

    let name_shape = Regex::new(r"^[a-z0-9-]{16}-[0-9a-f]{12}$").unwrap();
    assert!(name_shape.is_match(&created.name), "{}", created.name);
    assert!(created.name.starts_with("organic-darjeeli-"));
    assert_eq!(created.route, Some(format!("items/{}", created.name)));
    assert_eq!(
        created.keywords,
        Some(format!(
            "{} Organic Darjeeling Tea ODT-500 Beverages Acme Teas India Estate grown",
            created.name
        ))
    );

    let stored = hub.raw_item(&created.name).await;
    assert_eq!(stored.route, created.route);
    assert_eq!(stored.keywords, created.keywords);
}

#[tokio::test]
async fn client_supplied_names_are_replaced() {
    let hub = TestHub::new().await;
    let mut item = tea(None);
    item.name = "my-own-name".into();

    let created = hub.service().create_item(item).await.unwrap();
    assert_ne!(created.name, "my-own-name");
    assert_eq!(created.name.len(), 29);
}

#[tokio::test]
async fn short_names_still_get_a_sixteen_character_prefix() {
    let hub = TestHub::new().await;
    let mut item = tea(None);
    item.item_name = Some("Tea".into());

    let created = hub.service().create_item(item).await.unwrap();
    let (prefix, hash) = created.name.split_at(16);
    assert!(prefix.starts_with("tea"));
    assert_eq!(hash.len(), 13);
    assert!(hash.starts_with('-'));
}

#[tokio::test]
async fn the_two_hundredth_item_is_accepted_and_the_next_rejected() {
    let hub = TestHub::new().await;
    hub.insert_seller("busy-seller", Some("Busy"), None, None).await;
    hub.seed_items("busy-seller", 199).await;

    let service = hub.service();
    service
        .create_item(tea(Some("busy-seller")))
        .await
        .expect("199 existing items leave room for one more");

    let err = service
        .create_item(tea(Some("busy-seller")))
        .await
        .unwrap_err();
    assert_matches!(&err, ServiceError::QuotaExceeded { seller } if seller == "busy-seller");
    assert_eq!(
        err.to_string(),
        "Max allowed items for seller busy-seller exceeded."
    );

    // other sellers are unaffected
    hub.insert_seller("quiet-seller", None, None, None).await;
    service.create_item(tea(Some("quiet-seller"))).await.unwrap();
}

#[tokio::test]
async fn quota_failures_leave_no_files_behind() {
    let hub = TestHub::with_config(|config| config.max_items_per_seller = 2).await;
    hub.insert_seller("small-seller", None, None, None).await;
    hub.seed_items("small-seller", 2).await;

    let mut item = tea(Some("small-seller"));
    item.image = inline_image("a.png", "aGVsbG8=");

    let result = hub.service().create_item(item).await;
    assert_matches!(result, Err(ServiceError::QuotaExceeded { .. }));
    assert_eq!(hub.file_count().await, 0);
}

#[tokio::test]
async fn explicit_routes_are_kept() {
    let hub = TestHub::new().await;
    let mut item = tea(None);
    item.route = Some("teas/darjeeling".into());

    let created = hub.service().create_item(item).await.unwrap();
    assert_eq!(created.route.as_deref(), Some("teas/darjeeling"));

    let found = hub.service().get_by_route("teas/darjeeling").await.unwrap();
    assert_eq!(found.name, created.name);
}

#[tokio::test]
async fn inline_images_are_stored_and_referenced() {
    let hub = TestHub::new().await;
    let mut item = tea(None);
    item.image = inline_image("a.png", "aGVsbG8=");

    let created = hub.service().create_item(item).await.unwrap();
    assert_eq!(created.image, ImageField::Reference("/files/a.png".into()));

    let files = hub.files_attached_to(&created.name).await;
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_url, "/files/a.png");
    assert_eq!(files[0].attached_to_doctype.as_deref(), Some("Hub Item"));
    assert_eq!(files[0].file_size, 5);

    let on_disk = std::fs::read(hub.files_dir.path().join("files").join("a.png")).unwrap();
    assert_eq!(on_disk, b"hello");

    let stored = hub.raw_item(&created.name).await;
    assert_eq!(stored.image.as_deref(), Some("/files/a.png"));
}

#[tokio::test]
async fn data_uri_images_are_decoded() {
    let hub = TestHub::new().await;
    let mut item = tea(None);
    item.image = inline_image("b.txt", "data:text/plain;base64,aGVsbG8=");

    let created = hub.service().create_item(item).await.unwrap();
    assert_eq!(created.image.as_reference(), Some("/files/b.txt"));
    let on_disk = std::fs::read(hub.files_dir.path().join("files").join("b.txt")).unwrap();
    assert_eq!(on_disk, b"hello");
}

#[tokio::test]
async fn payloads_pointing_at_stored_files_are_not_stored_again() {
    let hub = TestHub::new().await;
    let mut item = tea(None);
    item.image = inline_image("a.png", "/files/existing.png");

    let created = hub.service().create_item(item).await.unwrap();
    assert_eq!(hub.file_count().await, 0);
    assert_eq!(created.image, inline_image("a.png", "/files/existing.png"));

    let stored = hub.raw_item(&created.name).await;
    let column: serde_json::Value = serde_json::from_str(stored.image.as_deref().unwrap()).unwrap();
    assert_eq!(column["base64"], "/files/existing.png");
}

#[tokio::test]
async fn plain_references_are_untouched() {
    let hub = TestHub::new().await;
    let mut item = tea(None);
    item.image = ImageField::Reference("/files/plain.png".into());

    let created = hub.service().create_item(item).await.unwrap();
    assert_eq!(created.image, ImageField::Reference("/files/plain.png".into()));
    assert_eq!(hub.file_count().await, 0);
}

#[tokio::test]
async fn incomplete_payloads_pass_unless_strict() {
    let hub = TestHub::new().await;
    let mut item = tea(None);
    item.image = inline_image("", "aGVsbG8=");
    let created = hub.service().create_item(item).await.unwrap();
    assert!(created.image.is_pending());
    assert_eq!(hub.file_count().await, 0);

    let strict = TestHub::with_config(|config| config.strict_image_payloads = true).await;
    let mut item = tea(None);
    item.image = inline_image("a.png", "");
    assert_matches!(
        strict.service().create_item(item).await,
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn invalid_base64_is_rejected() {
    let hub = TestHub::new().await;
    let mut item = tea(None);
    item.image = inline_image("a.png", "%%% not base64 %%%");

    assert_matches!(
        hub.service().create_item(item).await,
        Err(ServiceError::InvalidInput(_))
    );
}

#[tokio::test]
async fn updates_keep_the_name_and_revalidate() {
    let hub = TestHub::new().await;
    hub.insert_seller("seller-1", Some("Acme"), Some("Kenya"), None)
        .await;
    let service = hub.service();
    let created = service.create_item(tea(None)).await.unwrap();

    let mut changes = tea(Some("seller-1"));
    changes.name = "renamed".into();
    changes.item_name = Some("Kenyan Black".into());
    changes.route = created.route.clone();

    let updated = service.update_item(&created.name, changes).await.unwrap();
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.item_name.as_deref(), Some("Kenyan Black"));
    assert_eq!(
        updated.keywords,
        Some(format!(
            "{} Kenyan Black ODT-500 Beverages Acme Kenya ",
            created.name
        ))
    );
}

#[tokio::test]
async fn updates_are_quota_checked_too() {
    let hub = TestHub::with_config(|config| config.max_items_per_seller = 3).await;
    hub.insert_seller("seller-1", None, None, None).await;
    let service = hub.service();

    let first = service.create_item(tea(Some("seller-1"))).await.unwrap();
    hub.seed_items("seller-1", 2).await;

    let err = service
        .update_item(&first.name, tea(Some("seller-1")))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::QuotaExceeded { .. });
}

#[tokio::test]
async fn missing_items_are_not_found() {
    let hub = TestHub::new().await;
    let service = hub.service();

    assert_matches!(
        service.get_item("nope").await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        service.update_item("nope", tea(None)).await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        service.delete_item("nope").await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn delete_removes_the_item() {
    let hub = TestHub::new().await;
    let service = hub.service();
    let created = service.create_item(tea(None)).await.unwrap();

    service.delete_item(&created.name).await.unwrap();
    assert_matches!(
        service.get_item(&created.name).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn list_is_newest_first_and_paginated() {
    let hub = TestHub::new().await;
    hub.insert_seller("seller-1", None, None, None).await;
    hub.seed_items("seller-1", 5).await;

    let service = hub.service();
    let newest = service.create_item(tea(None)).await.unwrap();

    let (first_page, total) = service.list_items(1, 4).await.unwrap();
    assert_eq!(total, 6);
    assert_eq!(first_page.len(), 4);
    assert_eq!(first_page[0].name, newest.name);
    assert_eq!(first_page[1].name, "seeded-seller-1-00004");

    let (second_page, _) = service.list_items(2, 4).await.unwrap();
    assert_eq!(second_page.len(), 2);
    assert_eq!(second_page[1].name, "seeded-seller-1-00000");
}

#[tokio::test]
async fn unknown_sellers_are_rejected_before_anything_is_stored() {
    let hub = TestHub::new().await;
    let mut item = tea(Some("ghost"));
    item.image = inline_image("a.png", "aGVsbG8=");

    let err = hub.service().create_item(item).await.unwrap_err();
    assert_matches!(&err, ServiceError::ValidationError(message) if message.contains("ghost"));
    assert_eq!(hub.file_count().await, 0);
}

#[tokio::test]
async fn routes_are_unique_across_items() {
    let hub = TestHub::new().await;
    let service = hub.service();

    let mut first = tea(None);
    first.route = Some("teas/green".into());
    let first = service.create_item(first).await.unwrap();

    let mut second = tea(None);
    second.route = Some("teas/green".into());
    let err = service.create_item(second).await.unwrap_err();
    assert_matches!(&err, ServiceError::ValidationError(message) if message.contains(&first.name));

    let other = service.create_item(tea(None)).await.unwrap();
    let mut moved = tea(None);
    moved.route = Some("teas/green".into());
    assert_matches!(
        service.update_item(&other.name, moved).await,
        Err(ServiceError::ValidationError(_))
    );

    // an item keeps its own route on update
    let mut same = tea(None);
    same.route = Some("teas/green".into());
    service.update_item(&first.name, same).await.unwrap();
}

#[tokio::test]
async fn updates_keep_fields_left_out() {
    let hub = TestHub::new().await;
    let service = hub.service();

    let mut item = tea(None);
    item.route = Some("teas/darjeeling".into());
    item.image = inline_image("leaf.png", "aGVsbG8=");
    let created = service.create_item(item).await.unwrap();
    assert_eq!(created.image, ImageField::Reference("/files/leaf.png".into()));

    let changes = Item {
        item_name: Some("First Flush Darjeeling".into()),
        ..Default::default()
    };
    let updated = service.update_item(&created.name, changes).await.unwrap();

    assert_eq!(updated.item_name.as_deref(), Some("First Flush Darjeeling"));
    assert_eq!(updated.item_code.as_deref(), Some("ODT-500"));
    assert_eq!(updated.route.as_deref(), Some("teas/darjeeling"));
    assert_eq!(updated.image, ImageField::Reference("/files/leaf.png".into()));
    assert_eq!(hub.file_count().await, 1);
}

#[tokio::test]
async fn pages_past_the_offset_range_are_invalid() {
    let hub = TestHub::new().await;
    assert_matches!(
        hub.service().list_items(u64::MAX, 20).await,
        Err(ServiceError::InvalidInput(_))
    );
}
