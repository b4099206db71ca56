//! Integration tests for the full listing workflow: sign-in, feed refresh,
//! publishing through the form, editing and deleting, all against a scripted
//! channel so no live transport is required.

use serde_json::json;
use stayboard::application::dashboard::Dashboard;
use stayboard::application::form::SubmitOutcome;
use stayboard::domain::listing::ImageUpload;
use stayboard::domain::{FilterCriteria, SortOrder, filter};
use stayboard::infra::channel::{Channel, ChannelError, FakeChannel};
use stayboard::infra::protocol;
use stayboard::infra::session::Session;
use std::sync::Arc;

fn dashboard(channel: &Arc<FakeChannel>) -> Dashboard {
    let _ = env_logger::builder().is_test(true).try_init();
    Dashboard::new(
        Arc::clone(channel) as Arc<dyn Channel>,
        Session::new("tok-1"),
    )
}

fn feed_card(id: &str, title: &str, price: f64, owner: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "description": "desc",
        "location": "Center",
        "phone": "+79991234567",
        "price": price,
        "persons": 2,
        "wifi": true,
        "image": format!("uploads/{id}.jpg"),
        "username": owner,
    })
}

fn fill_create_form(dash: &mut Dashboard) {
    let form = dash.visible_form_mut();
    form.set_title("Seaside loft");
    form.set_description("Bright loft near the water");
    form.set_location("Harbor district");
    form.set_price("3200");
    form.set_phone("+79991234567");
    form.set_persons("3");
    form.set_wifi(true);
    form.select_image(ImageUpload {
        content_type: "image/jpeg".to_string(),
        file_name: "loft.jpg".to_string(),
        bytes: vec![0xff, 0xd8, 0xff],
    });
}

#[tokio::test]
async fn test_sign_in_refresh_and_filtered_browse() {
    let channel = FakeChannel::new();
    let dash = dashboard(&channel);

    channel.script_ack(
        protocol::GET_PROFILE,
        json!({"success": true, "user": {"username": "dasha"}}),
    );
    assert_eq!(dash.profile().await.unwrap().username, "dasha");

    channel.script_ack(
        protocol::GET_ALL_CARDS,
        json!({"success": true, "cards": [
            feed_card("a", "Seaside loft", 250.0, "sasha"),
            feed_card("b", "Forest cabin", 999.0, "masha"),
            feed_card("c", "City loft", 400.0, "sasha"),
        ]}),
    );
    channel.script_ack(
        protocol::GET_USER_CARDS,
        json!({"success": true, "cards": []}),
    );
    dash.refresh().await.unwrap();

    // The slider ceiling follows the dearest listing, rounded up to hundreds.
    assert_eq!(dash.store().price_ceiling(), 1000.0);

    let feed = dash.store().feed();
    let criteria = FilterCriteria {
        query: "loft".to_string(),
        price_max: dash.store().price_ceiling(),
        sort: SortOrder::PriceDescending,
        ..FilterCriteria::default()
    };
    let shown = filter::visible(&feed, &criteria);
    let titles: Vec<&str> = shown.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["City loft", "Seaside loft"]);
    assert_eq!(shown[0].owner_username.as_deref(), Some("sasha"));
}

#[tokio::test]
async fn test_rejected_profile_signals_login_redirect() {
    let channel = FakeChannel::new();
    let dash = dashboard(&channel);
    channel.script_ack(protocol::GET_PROFILE, json!({"success": false}));
    let err = dash.profile().await.unwrap_err();
    assert!(matches!(err, ChannelError::SessionRejected));
}

#[tokio::test]
async fn test_publish_edit_delete_lifecycle() {
    let channel = FakeChannel::new();
    let mut dash = dashboard(&channel);
    channel.script_ack(
        protocol::GET_USER_CARDS,
        json!({"success": true, "cards": []}),
    );
    dash.store().load_mine().await.unwrap();

    // Publish.
    fill_create_form(&mut dash);
    assert!(dash.visible_form().is_ready());
    channel.script_ack(
        protocol::CREATE_CARD,
        json!({"success": true, "imagePath": "uploads/loft.jpg"}),
    );
    let outcome = dash.submit_visible().await.unwrap();
    let SubmitOutcome::Published(listing) = outcome else {
        panic!("expected a publish outcome");
    };
    assert_eq!(listing.image.as_path(), Some("uploads/loft.jpg"));
    assert_eq!(dash.store().mine().len(), 1);
    // The form is back to its empty state.
    assert!(!dash.visible_form().is_ready());

    // Edit with a replacement image.
    dash.begin_edit(&listing.id).unwrap();
    dash.visible_form_mut().set_price("3500");
    dash.visible_form_mut().select_image(ImageUpload {
        content_type: "image/webp".to_string(),
        file_name: "loft-v2.webp".to_string(),
        bytes: vec![1, 2, 3, 4],
    });
    channel.script_ack(
        protocol::UPDATE_CARD,
        json!({"success": true, "imageUrl": "uploads/loft-v2.webp"}),
    );
    let outcome = dash.submit_visible().await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Saved(_)));
    assert_eq!(dash.editing_id(), None);

    let saved = dash.store().find_mine(&listing.id).unwrap();
    assert_eq!(saved.price, 3500.0);
    let path = saved.image.as_path().unwrap();
    assert!(path.starts_with("uploads/loft-v2.webp?v="));

    let sent = channel.last_request(protocol::UPDATE_CARD).unwrap();
    assert_eq!(sent["image"]["extension"], "webp");

    // Delete.
    channel.script_ack(protocol::DELETE_CARD, json!({"success": true}));
    dash.delete(&listing.id).await.unwrap();
    assert!(dash.store().mine().is_empty());
}

#[tokio::test]
async fn test_failed_publish_re_offers_the_same_form_state() {
    let channel = FakeChannel::new();
    let mut dash = dashboard(&channel);
    channel.script_ack(
        protocol::GET_USER_CARDS,
        json!({"success": true, "cards": []}),
    );
    dash.store().load_mine().await.unwrap();

    fill_create_form(&mut dash);
    channel.script_ack(
        protocol::CREATE_CARD,
        json!({"success": false, "error": "image rejected"}),
    );
    dash.submit_visible().await.unwrap_err();

    // No phantom entry, and the draft is still there for correction.
    assert!(dash.store().mine().is_empty());
    assert_eq!(dash.visible_form().title(), "Seaside loft");
    assert!(dash.visible_form().is_ready());
}

#[tokio::test]
async fn test_edit_without_new_image_keeps_reference_byte_for_byte() {
    let channel = FakeChannel::new();
    let mut dash = dashboard(&channel);
    channel.script_ack(
        protocol::GET_USER_CARDS,
        json!({"success": true, "cards": [feed_card("a", "Loft", 250.0, "dasha")]}),
    );
    dash.store().load_mine().await.unwrap();
    let before = dash.store().find_mine("a").unwrap().image;

    dash.begin_edit("a").unwrap();
    dash.visible_form_mut().set_title("Loft, renamed");
    channel.script_ack(
        protocol::UPDATE_CARD,
        json!({"success": true, "imageUrl": "uploads/ignored.jpg"}),
    );
    dash.submit_visible().await.unwrap();

    let after = dash.store().find_mine("a").unwrap();
    assert_eq!(after.image, before);
    assert_eq!(after.title, "Loft, renamed");
    let sent = channel.last_request(protocol::UPDATE_CARD).unwrap();
    assert_eq!(sent["image"], serde_json::Value::Null);
}
