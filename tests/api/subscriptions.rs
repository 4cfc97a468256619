use crate::helpers::spawn_app;
use uuid::Uuid;
use wiremock::matchers::path;
use wiremock::{Mock, ResponseTemplate};

use ubch_gateway::domain::subscriptions::models::record::{
    PublicServiceCode, SubscriptionSource, SubscriptionType, UserIdentifier,
};
use ubch_gateway::domain::subscriptions::ports::SubscriptionStore;

const ITN: &str = "3334510482";

fn subscribe_body(user: &str) -> serde_json::Value {
    serde_json::json!({
        "code": "CreditHistory",
        "userIdentifier": user,
        "itn": ITN,
    })
}

fn unsubscribe_body(user: &str) -> serde_json::Value {
    serde_json::json!({
        "code": "CreditHistory",
        "userIdentifier": user,
        "itn": ITN,
    })
}

fn subscribe_response(sub_id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "subId": sub_id }))
}

#[tokio::test]
async fn subscribing_records_the_flag_and_the_bureau_subscription_id() {
    let app = spawn_app().await;
    let user = Uuid::new_v4().to_string();
    app.mount_bureau_auth().await;
    app.mount_bureau_operation("subscribe", subscribe_response("s1"))
        .await;

    let response = app.post_subscribe(&subscribe_body(&user)).await;

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    let record = app
        .store
        .find(&UserIdentifier::parse(user.clone()).unwrap())
        .await
        .unwrap()
        .expect("no record was created");
    assert!(record.push_flag(
        SubscriptionType::PublicServices,
        PublicServiceCode::CreditHistory,
        &user
    ));
    assert_eq!(
        record
            .subscription_id(SubscriptionSource::Ubch)
            .unwrap()
            .as_ref(),
        "s1"
    );
}

#[tokio::test]
async fn repeating_a_subscribe_calls_the_bureau_exactly_once() {
    let app = spawn_app().await;
    let user = Uuid::new_v4().to_string();
    app.mount_bureau_auth().await;
    Mock::given(path("/b2b/subscription"))
        .respond_with(subscribe_response("s1"))
        .expect(1)
        .mount(&app.bureau_server)
        .await;

    let first = app.post_subscribe(&subscribe_body(&user)).await;
    let second = app.post_subscribe(&subscribe_body(&user)).await;

    assert!(first.status().is_success());
    assert!(second.status().is_success());
}

#[tokio::test]
async fn a_stale_bureau_session_is_refreshed_and_the_call_replayed() {
    let app = spawn_app().await;
    let user = Uuid::new_v4().to_string();
    app.mount_bureau_auth().await;
    Mock::given(path("/b2b/subscription"))
        .respond_with(ResponseTemplate::new(410))
        .up_to_n_times(1)
        .mount(&app.bureau_server)
        .await;
    Mock::given(path("/b2b/subscription"))
        .respond_with(subscribe_response("s1"))
        .expect(1)
        .mount(&app.bureau_server)
        .await;

    let response = app.post_subscribe(&subscribe_body(&user)).await;

    assert!(response.status().is_success());
}

#[tokio::test]
async fn subscribed_user_lookup_round_trips_over_http() {
    let app = spawn_app().await;
    let user = Uuid::new_v4().to_string();
    app.mount_bureau_auth().await;
    app.mount_bureau_operation("subscribe", subscribe_response("s1"))
        .await;
    app.post_subscribe(&subscribe_body(&user)).await;

    let found = app
        .get_subscriber("PublicServices", "CreditHistory", &user)
        .await;
    assert!(found.status().is_success());
    let body: serde_json::Value = found.json().await.unwrap();
    assert_eq!(body["userIdentifier"], user.as_str());

    let missing = app
        .get_subscriber("PublicServices", "CreditHistory", "nobody")
        .await;
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn unsubscribing_clears_the_record() {
    let app = spawn_app().await;
    let user = Uuid::new_v4().to_string();
    app.mount_bureau_auth().await;
    app.mount_bureau_operation("subscribe", subscribe_response("s1"))
        .await;
    app.mount_bureau_operation(
        "unsubscribe",
        ResponseTemplate::new(200).set_body_json(serde_json::json!({})),
    )
    .await;

    app.post_subscribe(&subscribe_body(&user)).await;
    let response = app.post_unsubscribe(&unsubscribe_body(&user)).await;

    assert!(response.status().is_success());
    let record = app
        .store
        .find(&UserIdentifier::parse(user.clone()).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(!record.push_flag(
        SubscriptionType::PublicServices,
        PublicServiceCode::CreditHistory,
        &user
    ));
    assert!(record.subscription_id(SubscriptionSource::Ubch).is_none());

    let lookup = app
        .get_subscriber("PublicServices", "CreditHistory", &user)
        .await;
    assert_eq!(lookup.status().as_u16(), 404);
}

#[tokio::test]
async fn a_bureau_outage_surfaces_as_service_unavailable_with_a_process_code() {
    let app = spawn_app().await;
    let user = Uuid::new_v4().to_string();
    app.mount_bureau_auth().await;
    app.mount_bureau_operation(
        "subscribe",
        ResponseTemplate::new(500).set_body_string("internal error"),
    )
    .await;

    let response = app.post_subscribe(&subscribe_body(&user)).await;

    assert_eq!(response.status().as_u16(), 503);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "failedSubscribeCreditHistory");

    // A failed external call leaves only the bootstrap record behind.
    let record = app
        .store
        .find(&UserIdentifier::parse(user.clone()).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(!record.push_flag(
        SubscriptionType::PublicServices,
        PublicServiceCode::CreditHistory,
        &user
    ));
    assert!(record.subscription_id(SubscriptionSource::Ubch).is_none());
}

#[tokio::test]
async fn a_malformed_itn_is_rejected_before_any_bureau_call() {
    let app = spawn_app().await;
    let body = serde_json::json!({
        "code": "CreditHistory",
        "userIdentifier": "u1",
        "itn": "not-a-number",
    });

    let response = app.post_subscribe(&body).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "badRequest");
    assert!(app.bureau_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn a_debts_subscribe_request_is_rejected_as_unsupported() {
    let app = spawn_app().await;
    let body = serde_json::json!({
        "code": "Debts",
        "userIdentifier": "u1",
        "itn": ITN,
    });

    let response = app.post_subscribe(&body).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "subscriptionNotSupported");
}

#[tokio::test]
async fn publishing_fires_a_bureau_publish_call() {
    let app = spawn_app().await;
    let user = Uuid::new_v4().to_string();
    app.mount_bureau_auth().await;
    Mock::given(path("/b2b/subscription"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&app.bureau_server)
        .await;
    let body = serde_json::json!({
        "code": "CreditHistory",
        "userIdentifier": user,
        "itn": ITN,
    });

    let response = app.post_publish(&body).await;

    assert!(response.status().is_success());
}

#[tokio::test]
async fn public_service_segments_are_tracked_without_bureau_calls() {
    let app = spawn_app().await;
    let user = Uuid::new_v4().to_string();
    let body = serde_json::json!({
        "code": "PublicService",
        "userIdentifier": user,
        "itn": ITN,
        "segmentId": "seg-1",
        "serviceCode": "Debts",
    });

    let subscribe = app.post_subscribe(&body).await;
    assert!(subscribe.status().is_success());

    let record = app
        .store
        .find(&UserIdentifier::parse(user.clone()).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(record.has_segment(
        SubscriptionType::PublicServices,
        PublicServiceCode::Debts,
        "seg-1"
    ));

    let unsubscribe = app.post_unsubscribe(&body).await;
    assert!(unsubscribe.status().is_success());
    assert!(app.bureau_server.received_requests().await.unwrap().is_empty());
}
