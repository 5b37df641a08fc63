//! Trust anchor types and trust domain resolution.
//!
//! The metadata service publishes trust anchors as a JSON object keyed by trust
//! domain name. A workload's anchors are the entry whose key is exactly the
//! authority segment of its SPIFFE ID.

use crate::spiffe_id::{SpiffeId, TrustDomain};
use serde::Deserialize;
use std::collections::BTreeMap;

/// PEM-encoded root/intermediate certificates trusted for one trust domain.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct TrustAnchor {
    /// Concatenated PEM certificates, written verbatim.
    #[serde(rename = "trustAnchorsPem", alias = "anchorPem")]
    pub anchor_pem: String,
}

/// Trust anchors keyed by trust domain name.
///
/// Several peer domains may be listed at once; only the one matching the
/// workload identity is ever written.
#[derive(Debug, Clone, Default, Eq, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TrustAnchorSet {
    anchors: BTreeMap<String, TrustAnchor>,
}

/// An error resolving a workload identity against a [`TrustAnchorSet`].
#[derive(Debug, thiserror::Error, PartialEq, Clone)]
#[non_exhaustive]
pub enum TrustAnchorError {
    /// No key in the set equals the identity's trust domain.
    #[error("unknown trust domain: {0}")]
    UnknownTrustDomain(TrustDomain),
}

impl TrustAnchorSet {
    /// Creates an empty `TrustAnchorSet`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the anchors for `domain`, replacing any previous entry.
    pub fn insert(&mut self, domain: impl Into<String>, anchor: TrustAnchor) {
        self.anchors.insert(domain.into(), anchor);
    }

    /// Returns the anchors for the given [`TrustDomain`], if present.
    pub fn anchor_for(&self, trust_domain: &TrustDomain) -> Option<&TrustAnchor> {
        self.anchors.get(trust_domain.as_ref())
    }

    /// Returns the trust domain key and anchors matching `spiffe_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TrustAnchorError::UnknownTrustDomain`] if no key matches.
    pub fn resolve(&self, spiffe_id: &SpiffeId) -> Result<(&str, &TrustAnchor), TrustAnchorError> {
        let trust_domain = spiffe_id.trust_domain();
        self.anchors
            .get_key_value(trust_domain.as_ref())
            .map(|(domain, anchor)| (domain.as_str(), anchor))
            .ok_or_else(|| TrustAnchorError::UnknownTrustDomain(trust_domain.clone()))
    }

    /// Returns the number of trust domains in the set.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Returns `true` if the set lists no trust domain.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Iterates over the trust domain names in the set, in order.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.anchors.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, TrustAnchor)> for TrustAnchorSet {
    fn from_iter<I: IntoIterator<Item = (K, TrustAnchor)>>(iter: I) -> Self {
        Self {
            anchors: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Returns the key of `anchors` that is exactly the trust domain of `spiffe_id`.
///
/// The match is plain string equality: a name with the same labels in another
/// order is a different trust domain.
///
/// # Errors
///
/// Returns [`TrustAnchorError::UnknownTrustDomain`] if no key matches.
///
/// # Examples
///
/// ```
/// use gce_workload_cert_refresh::{find_domain, SpiffeId, TrustAnchor, TrustAnchorSet};
///
/// let mut anchors = TrustAnchorSet::new();
/// anchors.insert("example.org", TrustAnchor { anchor_pem: "pem".into() });
///
/// let id = SpiffeId::new("spiffe://example.org/ns/a/sa/b").unwrap();
/// assert_eq!(find_domain(&anchors, &id).unwrap(), "example.org");
/// ```
pub fn find_domain<'a>(
    anchors: &'a TrustAnchorSet,
    spiffe_id: &SpiffeId,
) -> Result<&'a str, TrustAnchorError> {
    anchors.resolve(spiffe_id).map(|(domain, _)| domain)
}
