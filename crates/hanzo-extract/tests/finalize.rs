//! Finalizing model output against a caller schema

#![cfg(feature = "schema")]

use hanzo_extract::{finalize_output, finalize_output_str, ExtractError};
use hanzo_schema::Schema;
use serde_json::json;

fn listing_schema() -> Schema {
    Schema::object([
        ("title", Schema::string().describe("Page title")),
        (
            "products",
            Schema::array(Schema::object([
                ("name", Schema::string().min_length(1)),
                ("url", Schema::string().url().describe("Product page")),
                ("price", Schema::number().min(0.0).nullable()),
                ("rating", Schema::number().min(0.0).max(5.0).optional()),
            ])),
        ),
    ])
}

#[test]
fn partial_data_is_recovered() {
    let raw = json!({
        "title": "Widgets",
        "products": [
            { "name": "Basic", "url": "https://shop.example/basic", "price": 10, "rating": 9 },
            { "name": "", "url": "https://shop.example/empty", "price": 1 },
            { "name": "Deluxe", "url": r"https://shop.example/deluxe-\(2024\)", "price": "call us" },
            "not a product"
        ]
    });

    let value = finalize_output(&listing_schema(), &raw).unwrap();
    assert_eq!(
        value,
        json!({
            "title": "Widgets",
            "products": [
                { "name": "Basic", "url": "https://shop.example/basic", "price": 10 },
                { "name": "Deluxe", "url": "https://shop.example/deluxe-(2024)", "price": null }
            ]
        })
    );
}

#[test]
fn malformed_url_surfaces_after_repair() {
    let raw = json!({
        "title": "Widgets",
        "products": [{ "name": "Basic", "url": "basic.html", "price": 10 }]
    });

    match finalize_output(&listing_schema(), &raw) {
        Err(ExtractError::UrlValidation(err)) => {
            assert!(err.touches("/products/0/url"));
        }
        other => panic!("expected a URL validation failure, got {:?}", other),
    }
}

#[test]
fn missing_required_field_recovers_nothing() {
    let raw = json!({ "products": [] });
    assert!(matches!(
        finalize_output(&listing_schema(), &raw),
        Err(ExtractError::NoRecoverableData)
    ));
}

#[test]
fn fenced_model_text() {
    let text = "```json\n{ \"title\": \"Empty\", \"products\": [] }\n```";
    assert_eq!(
        finalize_output_str(&listing_schema(), text).unwrap(),
        json!({ "title": "Empty", "products": [] })
    );

    assert!(matches!(
        finalize_output_str(&listing_schema(), "Sorry, I cannot help with that."),
        Err(ExtractError::MalformedOutput(_))
    ));
}
