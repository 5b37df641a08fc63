//! SPIFFE ID and trust domain types used to join workload identities with their trust anchors.

use std::convert::TryFrom;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

const SPIFFE_SCHEME: &str = "spiffe";
const SCHEME_PREFIX: &str = "spiffe://";

const VALID_TRUST_DOMAIN_CHARS: &str = "abcdefghijklmnopqrstuvwxyz0123456789-._";
const VALID_PATH_SEGMENT_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-._";

/// A workload identity of the form `spiffe://<trust-domain>/ns/<namespace>/sa/<name>`.
///
/// Only the general SPIFFE ID grammar is enforced; the `ns`/`sa` layout is a
/// convention of the issuer and is not validated here.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SpiffeId {
    trust_domain: TrustDomain,
    path: String,
}

/// The authority segment of a [`SpiffeId`].
///
/// Its name is the join key into a [`crate::TrustAnchorSet`].
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TrustDomain {
    name: String,
}

/// An error that can arise parsing a SPIFFE ID or a trust domain name.
#[derive(Debug, Error, PartialEq, Clone)]
#[non_exhaustive]
pub enum SpiffeIdError {
    /// An empty string cannot be parsed as a SPIFFE ID.
    #[error("cannot be empty")]
    Empty,

    /// The authority segment is empty.
    #[error("trust domain is missing")]
    MissingTrustDomain,

    /// The `spiffe://` prefix is missing.
    #[error("scheme is missing or invalid")]
    WrongScheme,

    /// A trust domain name can only contain chars in a limited char set.
    #[error(
        "trust domain characters are limited to lowercase letters, numbers, dots, dashes, and \
         underscores"
    )]
    BadTrustDomainChar,

    /// A path segment can only contain chars in a limited char set.
    #[error(
        "path segment characters are limited to letters, numbers, dots, dashes, and underscores"
    )]
    BadPathSegmentChar,

    /// Path cannot contain empty segments, e.g '//'
    #[error("path cannot contain empty segments")]
    EmptySegment,

    /// Path cannot contain dot segments, e.g '/.', '/..'
    #[error("path cannot contain dot segments")]
    DotSegment,

    /// Path cannot have a trailing slash.
    #[error("path cannot have a trailing slash")]
    TrailingSlash,
}

impl SpiffeId {
    /// Parses a SPIFFE ID.
    ///
    /// # Errors
    ///
    /// Returns a [`SpiffeIdError`] describing the first rule the input breaks.
    ///
    /// # Examples
    ///
    /// ```
    /// use gce_workload_cert_refresh::SpiffeId;
    ///
    /// let id = SpiffeId::new("spiffe://12345.global.67890.workload.id.goog/ns/NS/sa/SA").unwrap();
    /// assert_eq!("12345.global.67890.workload.id.goog", id.trust_domain().as_ref());
    /// assert_eq!("/ns/NS/sa/SA", id.path());
    /// ```
    pub fn new(id: &str) -> Result<Self, SpiffeIdError> {
        if id.is_empty() {
            return Err(SpiffeIdError::Empty);
        }

        let rest = id
            .strip_prefix(SCHEME_PREFIX)
            .ok_or(SpiffeIdError::WrongScheme)?;
        let authority_end = rest.find('/').unwrap_or(rest.len());

        let trust_domain = TrustDomain::from_name(&rest[..authority_end])?;

        let path = &rest[authority_end..];
        if !path.is_empty() {
            validate_path(path)?;
        }

        Ok(SpiffeId {
            trust_domain,
            path: path.to_string(),
        })
    }

    /// Returns the trust domain (authority segment) of the SPIFFE ID.
    pub fn trust_domain(&self) -> &TrustDomain {
        &self.trust_domain
    }

    /// Returns the path of the SPIFFE ID, including the leading slash.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Display for SpiffeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", SPIFFE_SCHEME, self.trust_domain, self.path)
    }
}

impl FromStr for SpiffeId {
    type Err = SpiffeIdError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        Self::new(id)
    }
}

impl TryFrom<&str> for SpiffeId {
    type Error = SpiffeIdError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<String> for SpiffeId {
    type Error = SpiffeIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

fn validate_path(path: &str) -> Result<(), SpiffeIdError> {
    let mut segment_start = 0;

    for (idx, c) in path.char_indices() {
        if c == '/' {
            check_segment(&path[segment_start..idx])?;
            segment_start = idx;
            continue;
        }

        if !VALID_PATH_SEGMENT_CHARS.contains(c) {
            return Err(SpiffeIdError::BadPathSegmentChar);
        }
    }

    match &path[segment_start..] {
        "/" => Err(SpiffeIdError::TrailingSlash),
        last => check_segment(last),
    }
}

// `segment` includes its leading slash; the very first call sees an empty string.
fn check_segment(segment: &str) -> Result<(), SpiffeIdError> {
    match segment {
        "/" => Err(SpiffeIdError::EmptySegment),
        "/." | "/.." => Err(SpiffeIdError::DotSegment),
        _ => Ok(()),
    }
}

impl TrustDomain {
    /// Parses a trust domain from a bare name or from a SPIFFE ID string.
    ///
    /// # Errors
    ///
    /// Returns a [`SpiffeIdError`] if the input is neither a valid name nor a valid SPIFFE ID.
    ///
    /// # Examples
    ///
    /// ```
    /// use gce_workload_cert_refresh::TrustDomain;
    ///
    /// let td = TrustDomain::new("spiffe://example.org/ns/a/sa/b").unwrap();
    /// assert_eq!("example.org", td.to_string());
    /// ```
    pub fn new(id_or_name: &str) -> Result<Self, SpiffeIdError> {
        if id_or_name.contains(":/") {
            return SpiffeId::new(id_or_name).map(|id| id.trust_domain);
        }
        Self::from_name(id_or_name)
    }

    fn from_name(name: &str) -> Result<Self, SpiffeIdError> {
        if name.is_empty() {
            return Err(SpiffeIdError::MissingTrustDomain);
        }
        if !name.chars().all(|c| VALID_TRUST_DOMAIN_CHARS.contains(c)) {
            return Err(SpiffeIdError::BadTrustDomainChar);
        }
        Ok(TrustDomain {
            name: name.to_string(),
        })
    }

    /// Returns the SPIFFE ID of the trust domain itself, e.g. `spiffe://example.org`.
    pub fn id_string(&self) -> String {
        format!("{}://{}", SPIFFE_SCHEME, self.name)
    }
}

impl Display for TrustDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl AsRef<str> for TrustDomain {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl FromStr for TrustDomain {
    type Err = SpiffeIdError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::new(name)
    }
}

impl TryFrom<&str> for TrustDomain {
    type Error = SpiffeIdError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}
