mod common;

use common::{DeskTest, FakeApi};

const TOKEN: &str = "tok-123456";

fn listing(id: &str, name: &str, status: &str) -> String {
    serde_json::json!({
        "id": id,
        "name": name,
        "status": status,
        "is_active": true,
    })
    .to_string()
}

// ============================================================================
// create / update / delete
// ============================================================================

#[test]
fn test_create_posts_draft() {
    let api = FakeApi::start(|_| (201, listing("p7", "Beach Hut", "PENDING")));
    let desk = DeskTest::new();
    desk.configure(&api.base_url, Some(TOKEN));

    let output = desk.run(&[
        "create",
        "listings",
        "--data",
        r#"{"name": "Beach Hut", "city": "Faro"}"#,
    ]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("p7"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("created"));

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].target, "/admin/places/");
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["name"], "Beach Hut");
}

#[test]
fn test_create_with_empty_name_is_rejected_locally() {
    let api = FakeApi::start(|_| (201, listing("p7", "x", "PENDING")));
    let desk = DeskTest::new();
    desk.configure(&api.base_url, Some(TOKEN));

    let stderr = desk.run_failure(&["create", "listings", "--data", r#"{"name": "  "}"#]);
    assert!(stderr.contains("name required"));
    assert!(api.requests().is_empty());
}

#[test]
fn test_create_with_invalid_json() {
    let api = FakeApi::start(|_| (201, listing("p7", "x", "PENDING")));
    let desk = DeskTest::new();
    desk.configure(&api.base_url, Some(TOKEN));

    let stderr = desk.run_failure(&["create", "listings", "--data", "{name"]);
    assert!(stderr.contains("invalid JSON payload"));
    assert!(api.requests().is_empty());
}

#[test]
fn test_create_shows_server_message() {
    let api = FakeApi::start(|_| (400, r#"{"detail": "Slug already taken"}"#.to_string()));
    let desk = DeskTest::new();
    desk.configure(&api.base_url, Some(TOKEN));

    let stderr = desk.run_failure(&["create", "listings", "--data", r#"{"name": "Hut"}"#]);
    assert!(stderr.contains("Slug already taken"));
}

#[test]
fn test_reviews_cannot_be_created() {
    let api = FakeApi::start(|_| (201, "{}".to_string()));
    let desk = DeskTest::new();
    desk.configure(&api.base_url, Some(TOKEN));

    let stderr = desk.run_failure(&["create", "reviews", "--data", "{}"]);
    assert!(stderr.contains("cannot be created"));
    assert!(api.requests().is_empty());
}

#[test]
fn test_update_patches_item() {
    let api = FakeApi::start(|_| (200, listing("p1", "Beach Villa", "PENDING")));
    let desk = DeskTest::new();
    desk.configure(&api.base_url, Some(TOKEN));

    let output = desk.run_success(&[
        "update",
        "listings",
        "p1",
        "--data",
        r#"{"name": "Beach Villa"}"#,
        "--json",
    ]);
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["name"], "Beach Villa");

    let requests = api.requests();
    assert_eq!(requests[0].method, "PATCH");
    assert_eq!(requests[0].target, "/admin/places/p1/");
}

#[test]
fn test_delete_item() {
    let api = FakeApi::start(|_| (204, String::new()));
    let desk = DeskTest::new();
    desk.configure(&api.base_url, Some(TOKEN));

    let output = desk.run_success(&["delete", "listings", "p1"]);
    assert!(output.contains("Deleted p1"));

    let requests = api.requests();
    assert_eq!(requests[0].method, "DELETE");
    assert_eq!(requests[0].target, "/admin/places/p1/");
}

#[test]
fn test_delete_without_token() {
    let api = FakeApi::start(|_| (204, String::new()));
    let desk = DeskTest::new();
    desk.configure(&api.base_url, None);

    let stderr = desk.run_failure(&["delete", "listings", "p1"]);
    assert!(stderr.contains("not signed in"));
    assert!(api.requests().is_empty());
}

// ============================================================================
// transitions
// ============================================================================

#[test]
fn test_approve_listing() {
    let api = FakeApi::start(|_| (200, listing("p1", "Beach Hut", "APPROVED")));
    let desk = DeskTest::new();
    desk.configure(&api.base_url, Some(TOKEN));

    let output = desk.run(&["approve", "listings", "p1"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("APPROVED"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("approved"));

    let requests = api.requests();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].target, "/admin/places/p1/approve/");
}

#[test]
fn test_reject_sends_reason() {
    let api = FakeApi::start(|_| (200, listing("p1", "Beach Hut", "REJECTED")));
    let desk = DeskTest::new();
    desk.configure(&api.base_url, Some(TOKEN));

    desk.run_success(&["reject", "listings", "p1", "--reason", "low quality photos"]);

    let requests = api.requests();
    assert_eq!(requests[0].target, "/admin/places/p1/reject/");
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["reason"], "low quality photos");
}

#[test]
fn test_reject_without_reason_is_rejected_locally() {
    let api = FakeApi::start(|_| (200, listing("p1", "Beach Hut", "REJECTED")));
    let desk = DeskTest::new();
    desk.configure(&api.base_url, Some(TOKEN));

    let stderr = desk.run_failure(&["reject", "listings", "p1", "--reason", "   "]);
    assert!(stderr.contains("reason required"));
    assert!(api.requests().is_empty());
}

#[test]
fn test_unsupported_transition() {
    let api = FakeApi::start(|_| (200, "{}".to_string()));
    let desk = DeskTest::new();
    desk.configure(&api.base_url, Some(TOKEN));

    let stderr = desk.run_failure(&["approve", "packages", "k1"]);
    assert!(stderr.contains("does not support"));
    assert!(api.requests().is_empty());
}

#[test]
fn test_activate_package() {
    let api = FakeApi::start(|_| {
        (
            200,
            r#"{"id": "k1", "name": "Algarve Week", "price": 499.0, "is_active": true}"#
                .to_string(),
        )
    });
    let desk = DeskTest::new();
    desk.configure(&api.base_url, Some(TOKEN));

    desk.run_success(&["activate", "packages", "k1"]);
    assert_eq!(api.requests()[0].target, "/admin/packages/k1/activate/");
}
