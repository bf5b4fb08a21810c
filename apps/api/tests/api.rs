//! HTTP-level tests: every request goes through the real route table,
//! extractors, error mapping and an in-memory SQLite database.

use actix_web::http::StatusCode;
use actix_web::{middleware, test, web, App};
use serde_json::{json, Value};

use liquor_api::{configure, cors, request_span, AppState};
use liquor_core::StockPolicy;
use liquor_db::{Database, DbConfig};

macro_rules! test_app {
    ($policy:expr) => {{
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(db, $policy)))
                .wrap(cors())
                .wrap(middleware::from_fn(request_span))
                .configure(configure),
        )
        .await
    }};
    () => {
        test_app!(StockPolicy::AllowNegative)
    };
}

/// Sends a request and returns `(status, json body)`.
macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

macro_rules! create_liquor {
    ($app:expr, $name:expr, $category:expr, $stock:expr) => {{
        let (status, body) = send!(
            $app,
            test::TestRequest::post().uri("/liquors").set_json(liquor_body($name, $category, $stock))
        );
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }};
}

fn liquor_body(name: &str, category: &str, stock: i64) -> Value {
    json!({
        "name": name,
        "brand": "Casa Test",
        "description": "test bottle",
        "category": category,
        "price": 2500,
        "alcohol_content": 40.0,
        "volume_ml": 750,
        "stock": stock,
        "supplier": "Test Supply"
    })
}

fn sale_body(customer_id: &str, lines: &[(i64, i64)]) -> Value {
    let sale_lines: Vec<Value> = lines
        .iter()
        .map(|(liquor_id, quantity)| {
            json!({
                "liquor_id": liquor_id,
                "quantity": quantity,
                "unit_price": 2500,
                "subtotal": 2500 * quantity
            })
        })
        .collect();
    let total: i64 = lines.iter().map(|(_, q)| 2500 * q).sum();

    json!({
        "customer_name": "Lucia Gomez",
        "customer_id": customer_id,
        "payment_method": "cash",
        "total": total,
        "sale_lines": sale_lines
    })
}

// =============================================================================
// Health & middleware
// =============================================================================

#[actix_web::test]
async fn cross_origin_requests_are_allowed() {
    let app = test_app!();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/liquors")
            .insert_header(("origin", "http://shop.example"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "http://shop.example"
    );

    let preflight = test::call_service(
        &app,
        test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/sales")
            .insert_header(("origin", "http://shop.example"))
            .insert_header(("access-control-request-method", "POST"))
            .to_request(),
    )
    .await;
    assert!(preflight.status().is_success());
    assert!(preflight.headers().contains_key("access-control-allow-origin"));
}

#[actix_web::test]
async fn health_reports_database_and_request_id() {
    let app = test_app!();

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

// =============================================================================
// Liquors
// =============================================================================

#[actix_web::test]
async fn create_and_fetch_liquor() {
    let app = test_app!();

    let (status, created) = send!(
        app,
        test::TestRequest::post()
            .uri("/liquors")
            .set_json(liquor_body("Reposado", "tequila", 12))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Reposado");
    assert_eq!(created["category"], "tequila");
    assert_eq!(created["price"], 2500);
    assert_eq!(created["minimum_stock"], 5);
    assert_eq!(created["is_available"], true);
    assert!(created["created_at"].is_string());

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) = send!(app, test::TestRequest::get().uri(&format!("/liquors/{id}")));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[actix_web::test]
async fn missing_liquor_is_404() {
    let app = test_app!();

    let (status, body) = send!(app, test::TestRequest::get().uri("/liquors/4242"));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "Liquor not found: 4242");
}

#[actix_web::test]
async fn invalid_liquor_input_is_422() {
    let app = test_app!();

    let mut zero_price = liquor_body("Free", "rum", 1);
    zero_price["price"] = json!(0);
    let (status, body) = send!(app, test::TestRequest::post().uri("/liquors").set_json(zero_price));
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/liquors")
            .set_json(liquor_body("Negative", "rum", -3))
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/liquors")
            .set_json(liquor_body("Sake", "sake", 3))
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/liquors")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send!(app, test::TestRequest::get().uri("/liquors/abc"));
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn list_liquors_filters_and_paginates() {
    let app = test_app!();
    create_liquor!(app, "Islay", "whiskey", 4);
    create_liquor!(app, "Wheat", "vodka", 9);
    create_liquor!(app, "Bourbon", "whiskey", 20);

    let (status, all) = send!(app, test::TestRequest::get().uri("/liquors"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, whiskies) = send!(app, test::TestRequest::get().uri("/liquors?category=whiskey"));
    let names: Vec<_> = whiskies
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Islay", "Bourbon"]);

    let (_, page) = send!(app, test::TestRequest::get().uri("/liquors?skip=1&limit=1"));
    assert_eq!(page.as_array().unwrap().len(), 1);
    assert_eq!(page[0]["name"], "Wheat");

    let (status, _) = send!(app, test::TestRequest::get().uri("/liquors?limit=0"));
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send!(app, test::TestRequest::get().uri("/liquors?skip=-1"));
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send!(app, test::TestRequest::get().uri("/liquors?category=sake"));
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn partial_update_keeps_other_fields() {
    let app = test_app!();
    let id = create_liquor!(app, "Old Tom", "gin", 8);
    let (_, before) = send!(app, test::TestRequest::get().uri(&format!("/liquors/{id}")));

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let (status, updated) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/liquors/{id}"))
            .set_json(json!({ "price": 2999 }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 2999);
    assert_eq!(updated["stock"], before["stock"]);
    assert_eq!(updated["name"], before["name"]);
    assert_eq!(updated["created_at"], before["created_at"]);
    assert_ne!(updated["updated_at"], before["updated_at"]);

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri("/liquors/999")
            .set_json(json!({ "price": 2999 }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[actix_web::test]
async fn delete_liquor_echoes_and_then_404s() {
    let app = test_app!();
    let id = create_liquor!(app, "Pilsner", "beer", 24);

    let (status, deleted) = send!(app, test::TestRequest::delete().uri(&format!("/liquors/{id}")));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], id);
    assert_eq!(deleted["name"], "Pilsner");

    let (status, _) = send!(app, test::TestRequest::delete().uri(&format!("/liquors/{id}")));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn sold_liquor_can_be_deleted() {
    let app = test_app!();
    let id = create_liquor!(app, "Malbec", "wine", 6);

    let (status, sale) = send!(
        app,
        test::TestRequest::post().uri("/sales").set_json(sale_body("CC-77", &[(id, 1)]))
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, deleted) = send!(app, test::TestRequest::delete().uri(&format!("/liquors/{id}")));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], id);

    let (status, kept) = send!(
        app,
        test::TestRequest::get().uri(&format!("/sales/{}", sale["id"]))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(kept["sale_lines"][0]["liquor_id"], id);
}

// =============================================================================
// Sales
// =============================================================================

#[actix_web::test]
async fn sale_decrements_stock() {
    let app = test_app!();
    let id = create_liquor!(app, "Highland 12", "whiskey", 10);

    let (status, sale) = send!(
        app,
        test::TestRequest::post().uri("/sales").set_json(sale_body("CC-1", &[(id, 3)]))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sale["status"], "completed");
    assert_eq!(sale["total"], 7500);
    assert_eq!(sale["sale_lines"][0]["unit_price"], 2500);
    assert_eq!(sale["sale_lines"][0]["subtotal"], 7500);
    assert_eq!(sale["sale_lines"].as_array().unwrap().len(), 1);
    assert_eq!(sale["sale_lines"][0]["liquor_id"], id);
    assert_eq!(sale["sale_lines"][0]["sale_id"], sale["id"]);

    let (_, liquor) = send!(app, test::TestRequest::get().uri(&format!("/liquors/{id}")));
    assert_eq!(liquor["stock"], 7);
    assert_eq!(liquor["is_available"], true);

    let (status, fetched) = send!(
        app,
        test::TestRequest::get().uri(&format!("/sales/{}", sale["id"]))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, sale);
}

#[actix_web::test]
async fn selling_last_units_marks_unavailable() {
    let app = test_app!();
    let id = create_liquor!(app, "Limited", "rum", 2);

    send!(
        app,
        test::TestRequest::post().uri("/sales").set_json(sale_body("CC-1", &[(id, 2)]))
    );

    let (_, liquor) = send!(app, test::TestRequest::get().uri(&format!("/liquors/{id}")));
    assert_eq!(liquor["stock"], 0);
    assert_eq!(liquor["is_available"], false);
}

#[actix_web::test]
async fn failed_sale_leaves_no_trace() {
    let app = test_app!();
    let id = create_liquor!(app, "Rollback", "vodka", 10);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/sales")
            .set_json(sale_body("CC-9", &[(id, 3), (98765, 1)]))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (_, sales) = send!(app, test::TestRequest::get().uri("/sales"));
    assert!(sales.as_array().unwrap().is_empty());

    let (_, liquor) = send!(app, test::TestRequest::get().uri(&format!("/liquors/{id}")));
    assert_eq!(liquor["stock"], 10);
}

#[actix_web::test]
async fn oversell_is_rejected_under_strict_policy() {
    let app = test_app!(StockPolicy::RejectOversell);
    let id = create_liquor!(app, "Scarce", "gin", 1);

    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/sales").set_json(sale_body("CC-2", &[(id, 2)]))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");

    let (_, liquor) = send!(app, test::TestRequest::get().uri(&format!("/liquors/{id}")));
    assert_eq!(liquor["stock"], 1);
}

#[actix_web::test]
async fn oversell_goes_negative_by_default() {
    let app = test_app!();
    let id = create_liquor!(app, "Popular", "beer", 1);

    let (status, _) = send!(
        app,
        test::TestRequest::post().uri("/sales").set_json(sale_body("CC-2", &[(id, 3)]))
    );
    assert_eq!(status, StatusCode::CREATED);

    let (_, liquor) = send!(app, test::TestRequest::get().uri(&format!("/liquors/{id}")));
    assert_eq!(liquor["stock"], -2);
    assert_eq!(liquor["is_available"], false);
}

#[actix_web::test]
async fn overflowing_sale_amounts_are_422() {
    let app = test_app!();
    let id = create_liquor!(app, "Big Ticket", "whiskey", 10);

    let line = json!({
        "liquor_id": id,
        "quantity": 1,
        "unit_price": 2500,
        "subtotal": i64::MAX
    });
    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/sales").set_json(json!({
            "customer_name": "Lucia Gomez",
            "payment_method": "cash",
            "total": 0,
            "sale_lines": [line.clone(), line]
        }))
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, liquor) = send!(app, test::TestRequest::get().uri(&format!("/liquors/{id}")));
    assert_eq!(liquor["stock"], 10);
}

#[actix_web::test]
async fn sale_without_lines_is_422() {
    let app = test_app!();

    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/sales").set_json(sale_body("CC-3", &[]))
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn list_sales_by_customer() {
    let app = test_app!();
    let id = create_liquor!(app, "House Red", "wine", 50);

    for customer in ["CC-1", "CC-2", "CC-1"] {
        send!(
            app,
            test::TestRequest::post().uri("/sales").set_json(sale_body(customer, &[(id, 1)]))
        );
    }

    let (_, all) = send!(app, test::TestRequest::get().uri("/sales"));
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, first) = send!(app, test::TestRequest::get().uri("/sales?customer_id=CC-1"));
    let first = first.as_array().unwrap();
    assert_eq!(first.len(), 2);
    assert!(first.iter().all(|s| s["customer_id"] == "CC-1"));
    assert!(first.iter().all(|s| s["sale_lines"].as_array().unwrap().len() == 1));

    let (_, limited) = send!(app, test::TestRequest::get().uri("/sales?customer_id=CC-1&limit=1"));
    assert_eq!(limited.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn sale_status_updates() {
    let app = test_app!();
    let id = create_liquor!(app, "Status Check", "other", 10);
    let (_, sale) = send!(
        app,
        test::TestRequest::post().uri("/sales").set_json(sale_body("CC-5", &[(id, 1)]))
    );
    let sale_id = sale["id"].as_i64().unwrap();

    let (status, updated) = send!(
        app,
        test::TestRequest::put().uri(&format!("/sales/{sale_id}/status?status=cancelled"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "cancelled");

    let (status, updated) = send!(
        app,
        test::TestRequest::put().uri(&format!("/sales/{sale_id}/status?status=pending"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "pending");

    let (status, body) = send!(
        app,
        test::TestRequest::put().uri(&format!("/sales/{sale_id}/status?status=refunded"))
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send!(
        app,
        test::TestRequest::put().uri(&format!("/sales/{sale_id}/status"))
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send!(
        app,
        test::TestRequest::put().uri("/sales/31337/status?status=completed")
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn delete_sale_keeps_stock() {
    let app = test_app!();
    let id = create_liquor!(app, "Keeps Stock", "rum", 10);
    let (_, sale) = send!(
        app,
        test::TestRequest::post().uri("/sales").set_json(sale_body("CC-6", &[(id, 4)]))
    );
    let sale_id = sale["id"].as_i64().unwrap();

    let (status, deleted) = send!(app, test::TestRequest::delete().uri(&format!("/sales/{sale_id}")));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, sale);

    let (status, _) = send!(app, test::TestRequest::get().uri(&format!("/sales/{sale_id}")));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, liquor) = send!(app, test::TestRequest::get().uri(&format!("/liquors/{id}")));
    assert_eq!(liquor["stock"], 6);

    let (status, _) = send!(app, test::TestRequest::delete().uri(&format!("/sales/{sale_id}")));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Inventory
// =============================================================================

#[actix_web::test]
async fn low_stock_lists_exactly_the_threshold_breaches() {
    let app = test_app!();
    let at = create_liquor!(app, "At Threshold", "gin", 5);
    create_liquor!(app, "Healthy", "gin", 6);
    let empty = create_liquor!(app, "Empty", "gin", 0);

    let (status, low) = send!(app, test::TestRequest::get().uri("/inventory/low-stock"));
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = low
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, [empty, at]);
}

#[actix_web::test]
async fn stock_adjustment_by_delta() {
    let app = test_app!();
    let id = create_liquor!(app, "Adjustable", "vodka", 3);

    let (status, liquor) = send!(
        app,
        test::TestRequest::put().uri(&format!("/inventory/{id}/stock?quantity=-3"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(liquor["stock"], 0);
    assert_eq!(liquor["is_available"], false);

    let (status, liquor) = send!(
        app,
        test::TestRequest::put().uri(&format!("/inventory/{id}/stock?quantity=12"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(liquor["stock"], 12);
    assert_eq!(liquor["is_available"], true);

    let (status, _) = send!(
        app,
        test::TestRequest::put().uri("/inventory/555/stock?quantity=1")
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send!(
        app,
        test::TestRequest::put().uri(&format!("/inventory/{id}/stock?quantity=lots"))
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn extreme_stock_adjustments_are_422() {
    for policy in [StockPolicy::AllowNegative, StockPolicy::RejectOversell] {
        let app = test_app!(policy);
        let id = create_liquor!(app, "Bounded", "rum", 10);

        for quantity in [i64::MIN, i64::MAX] {
            let (status, body) = send!(
                app,
                test::TestRequest::put().uri(&format!("/inventory/{id}/stock?quantity={quantity}"))
            );
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{quantity} under {policy:?}");
            assert_eq!(body["code"], "VALIDATION_ERROR");
        }

        let (_, liquor) = send!(app, test::TestRequest::get().uri(&format!("/liquors/{id}")));
        assert_eq!(liquor["stock"], 10);
    }
}

#[actix_web::test]
async fn stock_adjustment_respects_strict_policy() {
    let app = test_app!(StockPolicy::RejectOversell);
    let id = create_liquor!(app, "Strict", "tequila", 2);

    let (status, body) = send!(
        app,
        test::TestRequest::put().uri(&format!("/inventory/{id}/stock?quantity=-5"))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
}
