//! NAF (activity sector) code validation.
//!
//! Some target APIs are restricted to organizations whose NAF code falls in
//! an allowed set of divisions; target APIs without an entry accept any
//! code.

/// Allowed NAF divisions (first two digits) per target API.
const RESTRICTED_PROVIDERS: &[(&str, &[&str])] = &[
  // administration publique, enseignement, santé humaine, action sociale
  ("api_particulier", &["84", "85", "86", "88"]),
];

/// Whether an organization holding `code` may request access to `provider`.
///
/// `None` (no NAF code on the organization record) is always rejected;
/// providers without a restriction list accept every code.
pub fn is_valid_naf_code(provider: &str, code: Option<&str>) -> bool {
  let Some(code) = code else {
    return false;
  };
  let Some((_, prefixes)) =
    RESTRICTED_PROVIDERS.iter().find(|(name, _)| *name == provider)
  else {
    return true;
  };
  prefixes.iter().any(|prefix| code.starts_with(prefix))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
