use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::model::Card;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct IdsRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UpdateRequest {
    pub ids: Vec<String>,
    pub fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct CardsResponse {
    #[serde(default)]
    cards: Vec<Card>,
}

/// Blocking client for the card backend. Every call is sent once; failures
/// are logged and returned, never retried.
pub struct CardsClient {
    base_url: String,
    client: Client,
}

impl CardsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(CardsClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn send(&self, what: &str, req: RequestBuilder) -> Result<reqwest::blocking::Response, Error> {
        req.send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                log::error!("{what} failed: {e}");
                Error::Network(format!("{what}: {e}"))
            })
    }

    pub fn get_cards(&self) -> Result<Vec<Card>, Error> {
        let resp = self.send("fetch cards", self.client.get(self.endpoint("cards")))?;
        let body: CardsResponse = resp.json()?;
        log::debug!("Fetched {} card(s)", body.cards.len());
        Ok(body.cards)
    }

    pub fn add_cards(&self, cards: &[Card]) -> Result<(), Error> {
        if cards.is_empty() {
            return Err(Error::InvalidConfig("no cards to add".into()));
        }
        self.send("add cards", self.client.post(self.endpoint("cards")).json(cards))?;
        Ok(())
    }

    pub fn update_cards(&self, ids: &[String], fields: Map<String, Value>) -> Result<(), Error> {
        let body = UpdateRequest { ids: ids.to_vec(), fields };
        self.send("update cards", self.client.patch(self.endpoint("cards")).json(&body))?;
        Ok(())
    }

    pub fn delete_cards(&self, ids: &[String]) -> Result<(), Error> {
        let body = IdsRequest { ids: ids.to_vec() };
        self.send("delete cards", self.client.delete(self.endpoint("cards")).json(&body))?;
        Ok(())
    }

    pub fn find_cards(&self, ids: &[String]) -> Result<Vec<Card>, Error> {
        let body = IdsRequest { ids: ids.to_vec() };
        let resp = self.send("find cards", self.client.post(self.endpoint("cards/find")).json(&body))?;
        let body: CardsResponse = resp.json()?;
        Ok(body.cards)
    }
}
