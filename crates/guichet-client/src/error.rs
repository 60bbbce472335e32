//! Client error type and user-facing message extraction.

use serde_json::{Map, Value};
use thiserror::Error;

/// Suffix appended to every generic error message.
const RETRY_SUFFIX: &str =
  "Merci de réessayer ultérieurement. Vous pouvez également nous signaler \
   cette erreur par mail à contact@particulier.api.gouv.fr.";

// ─── Types ───────────────────────────────────────────────────────────────────

/// The HTTP response attached to a failed API call.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
  pub status:      u16,
  pub status_text: String,
  /// Raw response body; validation rejections carry a field → messages map.
  pub data:        Value,
}

/// An error returned by [`crate::ApiClient`].
#[derive(Debug, Error)]
pub enum Error {
  /// The backend answered with a non-success status.
  #[error("API error: {} {}", .0.status, .0.status_text)]
  Api(ErrorResponse),

  /// The request never produced a response (DNS, connect, timeout…).
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Message extraction ──────────────────────────────────────────────────────

impl Error {
  /// Human-readable messages for display next to the form.
  ///
  /// Validation rejections (a JSON object body) yield one message per field
  /// error; other responses yield a single status-line message; a missing
  /// response yields a single generic message and logs the cause.
  pub fn user_messages(&self) -> Vec<String> {
    match self {
      Self::Api(response) => match &response.data {
        Value::Object(fields) => flatten_validation_messages(fields),
        _ => vec![format!(
          "Une erreur est survenue. Le code de l'erreur est {} ({}). \
           {RETRY_SUFFIX}",
          response.status, response.status_text
        )],
      },
      Self::Transport(error) => {
        tracing::error!(
          %error,
          "enrollment API request failed without a response"
        );
        vec![format!("Une erreur inconnue est survenue. {RETRY_SUFFIX}")]
      }
    }
  }
}

/// One message per map value; array values contribute each element.
fn flatten_validation_messages(fields: &Map<String, Value>) -> Vec<String> {
  let mut messages = Vec::new();
  for value in fields.values() {
    match value {
      Value::Array(items) => {
        messages.extend(items.iter().map(display_message));
      }
      other => messages.push(display_message(other)),
    }
  }
  messages
}

fn display_message(value: &Value) -> String {
  match value {
    Value::String(text) => text.clone(),
    other => other.to_string(),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn api_error(status: u16, status_text: &str, data: Value) -> Error {
    Error::Api(ErrorResponse {
      status,
      status_text: status_text.to_string(),
      data,
    })
  }

  #[test]
  fn validation_body_flattens_field_messages() {
    let error = api_error(
      422,
      "Unprocessable Entity",
      json!({
        "intitule": ["doit être rempli"],
        "contacts": ["email du DPD invalide", "téléphone invalide"],
      }),
    );

    assert_eq!(
      error.user_messages(),
      vec![
        "doit être rempli",
        "email du DPD invalide",
        "téléphone invalide",
      ]
    );
  }

  #[test]
  fn bare_string_field_values_are_kept_as_is() {
    let error =
      api_error(400, "Bad Request", json!({ "base": "demande inconnue" }));
    assert_eq!(error.user_messages(), vec!["demande inconnue"]);
  }

  #[test]
  fn non_object_body_yields_the_status_line_message() {
    let error = api_error(502, "Bad Gateway", Value::Null);
    let messages = error.user_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("502"));
    assert!(messages[0].contains("Bad Gateway"));
    assert!(messages[0].contains("Merci de réessayer ultérieurement."));
  }

  #[test]
  fn transport_error_yields_the_generic_message() {
    // A builder error is the easiest reqwest::Error to produce offline.
    let cause =
      reqwest::Client::new().get("not a url").build().unwrap_err();
    let messages = Error::Transport(cause).user_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Une erreur inconnue est survenue."));
  }
}
