mod common;

use std::time::Duration;

use cardsheet::{CardsClient, Error, IdsRequest, UpdateRequest, parse_cards};
use serde_json::json;

#[test]
fn parses_wrapped_and_bare_card_lists() {
    let wrapped = br#"{"cards": [{"_id": "65a1", "title": "Dragon", "tags": ["fire"], "image": "dragon.png", "rarity": "rare"}]}"#;
    let cards = parse_cards(wrapped).unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].id, "65a1");
    assert_eq!(cards[0].title, "Dragon");
    assert_eq!(cards[0].tags, ["fire"]);
    assert_eq!(cards[0].image.as_deref(), Some("dragon.png"));
    assert_eq!(cards[0].extra.get("rarity"), Some(&json!("rare")));

    let bare = br#"[{"id": "a"}, {"id": "b", "backimage": "back.png"}]"#;
    let cards = parse_cards(bare).unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[1].backimage.as_deref(), Some("back.png"));

    assert!(parse_cards(b"[]").unwrap().is_empty());
    assert!(matches!(parse_cards(b"{\"nope\": 1}"), Err(Error::Json(_))));
}

#[test]
fn unknown_fields_survive_a_round_trip() {
    let src = json!({"id": "x", "cardtype": "unit", "properties": {"atk": 3}, "cost": 2});
    let cards = parse_cards(src.to_string().as_bytes()).unwrap();
    let back = serde_json::to_value(&cards[0]).unwrap();
    assert_eq!(back["cost"], json!(2));
    assert_eq!(back["properties"]["atk"], json!(3));
    assert_eq!(back["cardtype"], json!("unit"));
}

#[test]
fn load_cards_reports_missing_file_path() {
    let err = cardsheet::load_cards(std::path::Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.json"), "{err}");
}

#[test]
fn request_bodies_match_backend_contract() {
    let ids = IdsRequest { ids: vec!["a".into(), "b".into()] };
    assert_eq!(serde_json::to_value(&ids).unwrap(), json!({"ids": ["a", "b"]}));

    let mut fields = serde_json::Map::new();
    fields.insert("cardtype".into(), json!("spell"));
    let update = UpdateRequest { ids: vec!["a".into()], fields };
    assert_eq!(
        serde_json::to_value(&update).unwrap(),
        json!({"ids": ["a"], "fields": {"cardtype": "spell"}})
    );
}

#[test]
fn endpoint_joins_base_url() {
    let client = CardsClient::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
    assert_eq!(client.endpoint("cards"), "http://localhost:5000/cards");
    assert_eq!(client.endpoint("/cards/find"), "http://localhost:5000/cards/find");
}

#[test]
fn get_cards_reads_cards_field() {
    let (base, server) = common::serve_once(200, r#"{"cards": [{"_id": "1"}, {"_id": "2"}]}"#);
    let client = CardsClient::new(&base, Duration::from_secs(5)).unwrap();
    let cards = client.get_cards().unwrap();
    let req = server.join().unwrap();
    assert_eq!(req.request_line, "GET /cards HTTP/1.1");
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[1].id, "2");
}

#[test]
fn find_cards_posts_ids() {
    let (base, server) = common::serve_once(200, r#"{"cards": [{"_id": "7"}]}"#);
    let client = CardsClient::new(&base, Duration::from_secs(5)).unwrap();
    let cards = client.find_cards(&["7".to_string()]).unwrap();
    let req = server.join().unwrap();
    assert_eq!(req.request_line, "POST /cards/find HTTP/1.1");
    assert_eq!(serde_json::from_str::<serde_json::Value>(&req.body).unwrap(), json!({"ids": ["7"]}));
    assert_eq!(cards[0].id, "7");
}

#[test]
fn delete_sends_ids_with_delete_method() {
    let (base, server) = common::serve_once(200, r#"{"message": "1 card(s) deleted"}"#);
    let client = CardsClient::new(&base, Duration::from_secs(5)).unwrap();
    client.delete_cards(&["9".to_string()]).unwrap();
    let req = server.join().unwrap();
    assert_eq!(req.request_line, "DELETE /cards HTTP/1.1");
    assert_eq!(serde_json::from_str::<serde_json::Value>(&req.body).unwrap(), json!({"ids": ["9"]}));
}

#[test]
fn error_status_is_a_network_error() {
    let (base, server) = common::serve_once(404, r#"{"message": "No cards found to update"}"#);
    let client = CardsClient::new(&base, Duration::from_secs(5)).unwrap();
    let err = client
        .update_cards(&["x".to_string()], serde_json::Map::new())
        .unwrap_err();
    let req = server.join().unwrap();
    assert_eq!(req.request_line, "PATCH /cards HTTP/1.1");
    assert!(matches!(err, Error::Network(_)), "{err}");
}

#[test]
fn add_cards_refuses_empty_batch() {
    let client = CardsClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
    assert!(matches!(client.add_cards(&[]), Err(Error::InvalidConfig(_))));
}

#[test]
fn unreachable_backend_is_a_network_error() {
    // Bind then drop to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = CardsClient::new(&format!("http://127.0.0.1:{port}"), Duration::from_secs(2)).unwrap();
    assert!(matches!(client.get_cards(), Err(Error::Network(_))));
}
