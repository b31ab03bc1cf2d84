//! HTTP client for the Hangar ship registry.

use crate::CliResult;
use hangar_core::{PageParams, Ship, ShipFilter, ShipPayload};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Error body returned by the server on 4xx and 5xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Thin async wrapper over the `/rest/ships` endpoints.
pub struct ShipClient {
    http: Client,
    base_url: String,
}

/// Normalize the server URL for consistent API requests.
fn normalize_server_url(server_url: &str) -> CliResult<String> {
    let trimmed = server_url.trim();
    if trimmed.is_empty() {
        return Err("server url is required".into());
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Decode a successful response, or surface the server's error message.
async fn decode<T: DeserializeOwned>(response: Response) -> CliResult<T> {
    let response = check_status(response).await?;
    Ok(response.json::<T>().await?)
}

async fn check_status(response: Response) -> CliResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_string(),
    };
    Err(format!("server returned {}: {message}", status.as_u16()).into())
}

impl ShipClient {
    /// Build a client for the server at `server_url`.
    pub fn new(server_url: &str) -> CliResult<Self> {
        Ok(Self {
            http: Client::builder().build()?,
            base_url: normalize_server_url(server_url)?,
        })
    }

    fn ships_url(&self) -> String {
        format!("{}/rest/ships", self.base_url)
    }

    fn ship_url(&self, id: i64) -> String {
        format!("{}/rest/ships/{id}", self.base_url)
    }

    /// Fetch one page of ships.
    pub async fn list(&self, filter: &ShipFilter, page: &PageParams) -> CliResult<Vec<Ship>> {
        let response = self
            .http
            .get(self.ships_url())
            .query(filter)
            .query(page)
            .send()
            .await?;
        decode(response).await
    }

    /// Count ships matching `filter`.
    pub async fn count(&self, filter: &ShipFilter) -> CliResult<i64> {
        let response = self
            .http
            .get(format!("{}/count", self.ships_url()))
            .query(filter)
            .send()
            .await?;
        decode(response).await
    }

    /// Fetch a ship by id.
    pub async fn get(&self, id: i64) -> CliResult<Ship> {
        let response = self.http.get(self.ship_url(id)).send().await?;
        decode(response).await
    }

    /// Create a ship.
    pub async fn create(&self, payload: &ShipPayload) -> CliResult<Ship> {
        let response = self
            .http
            .post(self.ships_url())
            .json(payload)
            .send()
            .await?;
        decode(response).await
    }

    /// Apply a partial update.
    pub async fn update(&self, id: i64, payload: &ShipPayload) -> CliResult<Ship> {
        let response = self
            .http
            .post(self.ship_url(id))
            .json(payload)
            .send()
            .await?;
        decode(response).await
    }

    /// Delete a ship.
    pub async fn delete(&self, id: i64) -> CliResult<()> {
        let response = self.http.delete(self.ship_url(id)).send().await?;
        check_status(response).await?;
        Ok(())
    }
}
