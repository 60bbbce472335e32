//! Async HTTP client wrapping the enrollment backend JSON API.

pub mod error;
pub mod query;

use std::time::Duration;

use guichet_core::enrollment::Enrollment;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{Map, Value, json};

pub use error::{Error, ErrorResponse, Result};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection settings for the enrollment API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  pub base_url: String,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async HTTP client for the enrollment JSON API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  // ── Enrollments ───────────────────────────────────────────────────────────

  /// `GET /api/enrollments/{id}`
  pub async fn get_user_enrollment(&self, id: u32) -> Result<Enrollment> {
    let response = self
      .client
      .get(self.url(&format!("/enrollments/{id}")))
      .send()
      .await?;
    Ok(check(response).await?.json().await?)
  }

  /// `GET /api/enrollments{?filters}` — filters encoded by
  /// [`query::to_query_string`].
  pub async fn list_user_enrollments(
    &self,
    filters: &Map<String, Value>,
  ) -> Result<Vec<Enrollment>> {
    let url =
      format!("{}{}", self.url("/enrollments"), query::to_query_string(filters));
    let response = self.client.get(url).send().await?;
    Ok(check(response).await?.json().await?)
  }

  /// `POST /api/enrollments` — returns the stored enrollment (with its
  /// backend-assigned id).
  pub async fn create_enrollment(
    &self,
    enrollment: &Enrollment,
  ) -> Result<Enrollment> {
    let response = self
      .client
      .post(self.url("/enrollments"))
      .json(&json!({ "enrollment": enrollment }))
      .send()
      .await?;
    Ok(check(response).await?.json().await?)
  }

  /// `PATCH /api/enrollments/{id}`
  pub async fn update_enrollment(
    &self,
    id: u32,
    enrollment: &Enrollment,
  ) -> Result<Enrollment> {
    let response = self
      .client
      .patch(self.url(&format!("/enrollments/{id}")))
      .json(&json!({ "enrollment": enrollment }))
      .send()
      .await?;
    Ok(check(response).await?.json().await?)
  }

  /// `PATCH /api/enrollments/{id}/trigger?event=<action>` — fire a workflow
  /// transition (`send_application`, `validate_application`, …).
  pub async fn trigger_action(
    &self,
    id: u32,
    action: &str,
    comment: Option<&str>,
  ) -> Result<Enrollment> {
    let response = self
      .client
      .patch(self.url(&format!("/enrollments/{id}/trigger")))
      .query(&[("event", action)])
      .json(&json!({ "comment": comment }))
      .send()
      .await?;
    Ok(check(response).await?.json().await?)
  }
}

// ─── Response checking ───────────────────────────────────────────────────────

/// Map a non-success response to [`Error::Api`], capturing the status text
/// and whatever body the backend sent (validation map or not).
async fn check(response: Response) -> Result<Response> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let status_text =
    status.canonical_reason().unwrap_or("Unknown Status").to_string();
  let data = response.json::<Value>().await.unwrap_or(Value::Null);

  Err(Error::Api(ErrorResponse {
    status: status.as_u16(),
    status_text,
    data,
  }))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn client(base_url: &str) -> ApiClient {
    ApiClient::new(ApiConfig { base_url: base_url.to_string() }).unwrap()
  }

  #[test]
  fn url_joins_without_doubled_slashes() {
    let c = client("http://localhost:3000/");
    assert_eq!(
      c.url("/enrollments/12"),
      "http://localhost:3000/api/enrollments/12"
    );
  }

  #[test]
  fn url_joins_without_trailing_slash_too() {
    let c = client("http://localhost:3000");
    assert_eq!(c.url("/enrollments"), "http://localhost:3000/api/enrollments");
  }
}
