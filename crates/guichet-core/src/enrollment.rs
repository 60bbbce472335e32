//! The enrollment record — a data-access request application.
//!
//! Field inventory mirrors the backend wire format. A new enrollment seeds
//! the three standard contacts and pre-checks the scopes the target API
//! marks as mandatory or checked by default.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{changelog, merge::right_union_by};

// ─── Contacts ────────────────────────────────────────────────────────────────

/// A person attached to the request, keyed by a stable role id
/// (`dpo`, `responsable_traitement`, `technique`, …).
///
/// `heading`, `hint` and `link` are presentation metadata shown on the
/// contact card; they are not part of what the backend validates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
  pub id:           String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub heading:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hint:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub link:         Option<String>,
  #[serde(default)]
  pub nom:          String,
  #[serde(default)]
  pub email:        String,
  #[serde(default)]
  pub phone_number: String,
}

impl Contact {
  fn with_role(
    id: &str,
    heading: &str,
    hint: Option<&str>,
    link: Option<&str>,
  ) -> Self {
    Self {
      id:           id.to_string(),
      heading:      Some(heading.to_string()),
      hint:         hint.map(str::to_string),
      link:         link.map(str::to_string),
      nom:          String::new(),
      email:        String::new(),
      phone_number: String::new(),
    }
  }
}

/// The three contacts every request starts with. Their order is load-bearing:
/// changelog labels address contacts by index (`contacts.0` is the DPD).
pub fn default_contacts() -> Vec<Contact> {
  vec![
    Contact::with_role(
      "dpo",
      "Délégué à la protection des données",
      Some(
        "Seule une personne appartenant à l'organisme demandeur peut être \
         renseigné",
      ),
      Some("https://www.cnil.fr/fr/designation-dpo"),
    ),
    Contact::with_role(
      "responsable_traitement",
      "Responsable de traitement",
      Some(
        "Seule une personne appartenant à l'organisme demandeur peut être \
         renseigné",
      ),
      Some("https://www.cnil.fr/fr/definition/responsable-de-traitement"),
    ),
    Contact::with_role(
      "technique",
      "Responsable technique",
      Some(
        "Cette personne recevra les accès techniques. Le responsable \
         technique peut être le contact technique de votre prestataire.",
      ),
      None,
    ),
  ]
}

// ─── Acl ─────────────────────────────────────────────────────────────────────

/// What the current user may do with the enrollment, as granted by the
/// backend. A new (unsaved) enrollment is fully editable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acl {
  #[serde(default)]
  pub update:           bool,
  #[serde(default)]
  pub send_application: bool,
  #[serde(default)]
  pub update_contacts:  bool,
}

impl Default for Acl {
  fn default() -> Self {
    Self {
      update:           true,
      send_application: true,
      update_contacts:  false,
    }
  }
}

// ─── Scopes ──────────────────────────────────────────────────────────────────

/// A data scope offered by the target API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableScope {
  pub name:               String,
  pub human_name:         String,
  #[serde(default)]
  pub mandatory:          bool,
  #[serde(default)]
  pub checked_by_default: bool,
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// A workflow event recorded by the backend (submission, validation,
/// refusal, update…). Update events carry the raw field diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
  pub name:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub comment:    Option<String>,
  pub created_at: DateTime<Utc>,
  /// Top-level field diff attached to update events; the shape
  /// [`changelog::summarize`] consumes.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub diff:       Option<Value>,
}

impl Event {
  /// Human-readable change entries for this event; empty when the event
  /// carries no diff.
  pub fn changelog(&self) -> Vec<String> {
    self.diff.as_ref().map(changelog::summarize).unwrap_or_default()
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// An uploaded attachment (e.g. the legal-basis document). The upload flow
/// itself lives outside this crate; the record field survives round-trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
  pub id:             u32,
  #[serde(rename = "type")]
  pub document_type:  String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub attachment_url: Option<String>,
}

// ─── Enrollment ──────────────────────────────────────────────────────────────

/// A data-access request application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Enrollment {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<u32>,

  #[serde(default)]
  pub target_api: String,

  #[serde(default)]
  pub intitule:    String,
  #[serde(default)]
  pub description: String,

  #[serde(default)]
  pub fondement_juridique_title: String,
  #[serde(default)]
  pub fondement_juridique_url:   String,

  #[serde(default)]
  pub data_recipients: String,
  /// Retention period in months, counted from the end of the contractual
  /// relationship.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data_retention_period: Option<u32>,
  #[serde(default)]
  pub data_retention_comment: String,

  #[serde(default)]
  pub cgu_approved: bool,

  /// Requested scopes: scope name → checked.
  #[serde(default)]
  pub scopes: BTreeMap<String, bool>,

  #[serde(default)]
  pub contacts: Vec<Contact>,

  #[serde(default)]
  pub siret: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub organization_id: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub linked_franceconnect_enrollment_id: Option<u32>,

  #[serde(default)]
  pub events: Vec<Event>,
  #[serde(default)]
  pub documents: Vec<Document>,

  /// Free-form extra answers some target APIs ask for.
  #[serde(default)]
  pub additional_content: serde_json::Map<String, Value>,

  #[serde(default)]
  pub acl: Acl,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,
}

impl Enrollment {
  /// A fresh draft for `target_api`: default contacts (overridden per role
  /// id by `additional_contacts`), scopes pre-checked when mandatory or
  /// checked by default, everything else empty.
  pub fn new(
    target_api: &str,
    available_scopes: &[AvailableScope],
    additional_contacts: &[Contact],
  ) -> Self {
    let contacts = right_union_by(
      &default_contacts(),
      additional_contacts,
      |contact| contact.id.clone(),
    );
    let scopes = available_scopes
      .iter()
      .map(|scope| {
        (scope.name.clone(), scope.mandatory || scope.checked_by_default)
      })
      .collect();

    Self {
      target_api: target_api.to_string(),
      contacts,
      scopes,
      ..Self::default()
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn scope(name: &str, mandatory: bool, checked_by_default: bool) -> AvailableScope {
    AvailableScope {
      name: name.to_string(),
      human_name: name.to_uppercase(),
      mandatory,
      checked_by_default,
    }
  }

  #[test]
  fn new_enrollment_seeds_default_contacts_in_order() {
    let enrollment = Enrollment::new("api_particulier", &[], &[]);
    let ids: Vec<&str> =
      enrollment.contacts.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["dpo", "responsable_traitement", "technique"]);
  }

  #[test]
  fn additional_contact_overrides_by_role_id() {
    let support = Contact {
      id:           "technique".to_string(),
      heading:      Some("Contact technique prestataire".to_string()),
      hint:         None,
      link:         None,
      nom:          "Martin".to_string(),
      email:        "support@editeur.example".to_string(),
      phone_number: String::new(),
    };
    let enrollment = Enrollment::new("api_particulier", &[], &[support]);

    assert_eq!(enrollment.contacts.len(), 3);
    assert_eq!(enrollment.contacts[2].id, "technique");
    assert_eq!(enrollment.contacts[2].nom, "Martin");
  }

  #[test]
  fn extra_contact_is_appended() {
    let extra = Contact {
      id:           "metier".to_string(),
      heading:      Some("Contact métier".to_string()),
      hint:         None,
      link:         None,
      nom:          String::new(),
      email:        String::new(),
      phone_number: String::new(),
    };
    let enrollment = Enrollment::new("api_particulier", &[], &[extra]);
    assert_eq!(enrollment.contacts.len(), 4);
    assert_eq!(enrollment.contacts[3].id, "metier");
  }

  #[test]
  fn mandatory_and_default_scopes_are_prechecked() {
    let enrollment = Enrollment::new(
      "api_particulier",
      &[
        scope("dgfip_avis_imposition", true, false),
        scope("cnaf_quotient_familial", false, true),
        scope("cnaf_adresse", false, false),
      ],
      &[],
    );

    assert_eq!(enrollment.scopes["dgfip_avis_imposition"], true);
    assert_eq!(enrollment.scopes["cnaf_quotient_familial"], true);
    assert_eq!(enrollment.scopes["cnaf_adresse"], false);
  }

  #[test]
  fn new_enrollment_is_editable() {
    let enrollment = Enrollment::new("api_particulier", &[], &[]);
    assert!(enrollment.acl.update);
    assert!(enrollment.acl.send_application);
  }

  #[test]
  fn deserializes_a_sparse_backend_payload() {
    let enrollment: Enrollment = serde_json::from_value(json!({
      "id": 42,
      "target_api": "api_particulier",
      "intitule": "Portail famille",
      "contacts": [{ "id": "dpo", "nom": "Durand" }],
      "acl": { "update": true, "send_application": false },
    }))
    .unwrap();

    assert_eq!(enrollment.id, Some(42));
    assert_eq!(enrollment.contacts[0].email, "");
    assert!(!enrollment.acl.send_application);
    assert!(enrollment.updated_at.is_none());
  }

  #[test]
  fn event_changelog_renders_attached_diff() {
    let event: Event = serde_json::from_value(json!({
      "name": "updated",
      "created_at": "2024-03-01T10:00:00Z",
      "diff": { "intitule": ["a", "b"] },
    }))
    .unwrap();

    assert_eq!(
      event.changelog(),
      vec!["Changement de l'intitulé de \"a\" en \"b\"."]
    );
  }

  #[test]
  fn event_without_diff_has_empty_changelog() {
    let event = Event {
      name:       "submitted".to_string(),
      comment:    None,
      created_at: Utc::now(),
      diff:       None,
    };
    assert!(event.changelog().is_empty());
  }
}
