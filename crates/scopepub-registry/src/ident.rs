//! Identifier grammar for scopes, package names, versions and specifiers
//!
//! Every grammar is a standalone predicate so it can be checked in isolation.
//! The typed parsers ([`Scope::parse`], [`PackageName::parse`],
//! [`Version::parse`]) wrap those predicates and report which field failed
//! together with the grammar it was expected to follow.

use crate::error::IdentError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static SCOPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z-][a-z-]+$").unwrap());
static COMPONENT_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]+-[a-z]+$").unwrap());
static LIBRARY_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][a-z-]+$").unwrap());
static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d{1,2})\.(\d{1,3})\.(\d{1,2})|(\d{1,2})|latest)$").unwrap()
});

pub const SCOPE_GRAMMAR: &str = "two or more lowercase letters or dashes, without consecutive dashes";
pub const COMPONENT_NAME_GRAMMAR: &str = "two lowercase words joined by a single dash, e.g. foo-bar";
pub const LIBRARY_NAME_GRAMMAR: &str = "a lowercase letter followed by lowercase letters or dashes";
pub const VERSION_GRAMMAR: &str = "\"latest\", a major version like 3, or major.minor.patch like 1.2.3";

/// Literal token of the mutable alias version
pub const LATEST: &str = "latest";

/// `true` iff `s` is a well-formed scope
pub fn validate_scope(s: &str) -> bool {
    SCOPE_RE.is_match(s) && !s.contains("--")
}

/// `true` iff `name` follows the grammar of `kind`
pub fn validate_name(kind: PackageKind, name: &str) -> bool {
    match kind {
        PackageKind::Component => COMPONENT_NAME_RE.is_match(name),
        PackageKind::Library => LIBRARY_NAME_RE.is_match(name),
    }
}

/// Split `name@version` on the first `@`. A bare `name` means `latest`.
pub fn split_specifier(spec: &str) -> (&str, &str) {
    match spec.split_once('@') {
        Some((name, version)) => (name, version),
        None => (spec, LATEST),
    }
}

/// The two kinds of publishable packages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    Component,
    Library,
}

impl PackageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageKind::Component => "component",
            PackageKind::Library => "library",
        }
    }

    /// Directory grouping packages of this kind in storage
    pub fn collection(&self) -> &'static str {
        match self {
            PackageKind::Component => "components",
            PackageKind::Library => "libraries",
        }
    }

    pub fn name_grammar(&self) -> &'static str {
        match self {
            PackageKind::Component => COMPONENT_NAME_GRAMMAR,
            PackageKind::Library => LIBRARY_NAME_GRAMMAR,
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated publishing tenant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope(String);

impl Scope {
    pub fn parse(raw: &str) -> Result<Self, IdentError> {
        if !validate_scope(raw) {
            return Err(IdentError::InvalidScope {
                value: raw.to_string(),
                expected: SCOPE_GRAMMAR,
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Scope {
    type Err = IdentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A package name validated against its kind's grammar
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageName {
    kind: PackageKind,
    name: String,
}

impl PackageName {
    pub fn parse(kind: PackageKind, raw: &str) -> Result<Self, IdentError> {
        if !validate_name(kind, raw) {
            return Err(IdentError::InvalidName {
                kind,
                value: raw.to_string(),
                expected: kind.name_grammar(),
            });
        }
        Ok(Self {
            kind,
            name: raw.to_string(),
        })
    }

    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Fully qualified package: scope, kind and name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageId {
    pub scope: Scope,
    pub name: PackageName,
}

impl PackageId {
    pub fn new(scope: Scope, name: PackageName) -> Self {
        Self { scope, name }
    }

    pub fn kind(&self) -> PackageKind {
        self.name.kind()
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.scope, self.kind(), self.name)
    }
}

/// Immutable release number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinnedVersion {
    Major(u8),
    Triple { major: u8, minor: u16, patch: u8 },
}

impl fmt::Display for PinnedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinnedVersion::Major(major) => write!(f, "{}", major),
            PinnedVersion::Triple {
                major,
                minor,
                patch,
            } => write!(f, "{}.{}.{}", major, minor, patch),
        }
    }
}

/// A package version: the mutable `latest` alias or a pinned release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    Latest,
    Pinned(PinnedVersion),
}

impl Version {
    pub fn parse(raw: &str) -> Result<Self, IdentError> {
        let invalid = || IdentError::InvalidVersion {
            value: raw.to_string(),
            expected: VERSION_GRAMMAR,
        };

        let caps = VERSION_RE.captures(raw).ok_or_else(invalid)?;

        // The regex bounds digit counts, so these never overflow.
        let number = |i: usize| caps.get(i).map(|m| m.as_str());

        match (number(1), number(2), number(3), number(4)) {
            (Some(major), Some(minor), Some(patch), None) => {
                Ok(Version::Pinned(PinnedVersion::Triple {
                    major: major.parse().map_err(|_| invalid())?,
                    minor: minor.parse().map_err(|_| invalid())?,
                    patch: patch.parse().map_err(|_| invalid())?,
                }))
            }
            (None, None, None, Some(major)) => Ok(Version::Pinned(PinnedVersion::Major(
                major.parse().map_err(|_| invalid())?,
            ))),
            _ => Ok(Version::Latest),
        }
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, Version::Latest)
    }
}

impl FromStr for Version {
    type Err = IdentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Latest => f.write_str(LATEST),
            Version::Pinned(pinned) => fmt::Display::fmt(pinned, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_grammar() {
        assert!(validate_scope("acme"));
        assert!(validate_scope("acme-corp"));
        assert!(validate_scope("-a"));
        assert!(!validate_scope("ac--me"));
        assert!(!validate_scope("A"));
        assert!(!validate_scope("a"));
        assert!(!validate_scope("acme1"));
        assert!(!validate_scope("Acme"));
        assert!(!validate_scope(""));
    }

    #[test]
    fn test_component_name_grammar() {
        assert!(validate_name(PackageKind::Component, "foo-bar"));
        assert!(!validate_name(PackageKind::Component, "foo-bar-baz"));
        assert!(!validate_name(PackageKind::Component, "foobar"));
        assert!(!validate_name(PackageKind::Component, "Foo-Bar"));
        assert!(!validate_name(PackageKind::Component, "-bar"));
        assert!(!validate_name(PackageKind::Component, "foo-"));
    }

    #[test]
    fn test_library_name_grammar() {
        assert!(validate_name(PackageKind::Library, "lodash-utils"));
        assert!(validate_name(PackageKind::Library, "utils"));
        assert!(validate_name(PackageKind::Library, "a-b-c"));
        assert!(!validate_name(PackageKind::Library, "1abc"));
        assert!(!validate_name(PackageKind::Library, "-abc"));
        assert!(!validate_name(PackageKind::Library, "a"));
        assert!(!validate_name(PackageKind::Library, "abc_def"));
    }

    #[test]
    fn test_version_accepts() {
        assert_eq!(Version::parse("latest").unwrap(), Version::Latest);
        assert_eq!(
            Version::parse("3").unwrap(),
            Version::Pinned(PinnedVersion::Major(3))
        );
        assert_eq!(
            Version::parse("12").unwrap(),
            Version::Pinned(PinnedVersion::Major(12))
        );
        assert_eq!(
            Version::parse("1.2.3").unwrap(),
            Version::Pinned(PinnedVersion::Triple {
                major: 1,
                minor: 2,
                patch: 3
            })
        );
        assert_eq!(Version::parse("10.999.42").unwrap().to_string(), "10.999.42");
    }

    #[test]
    fn test_version_rejects() {
        for raw in ["v1.0.0", "1.2", "100", "1.2.345", "1.2.3.4", "Latest", "", "1.2.3-beta"] {
            assert!(
                matches!(Version::parse(raw), Err(IdentError::InvalidVersion { .. })),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_version_normalizes_leading_zeros() {
        assert_eq!(Version::parse("01").unwrap(), Version::parse("1").unwrap());
        assert_eq!(Version::parse("01.002.03").unwrap().to_string(), "1.2.3");
    }

    #[test]
    fn test_split_specifier() {
        assert_eq!(split_specifier("foo-bar@1.0.0"), ("foo-bar", "1.0.0"));
        assert_eq!(split_specifier("foo-bar"), ("foo-bar", "latest"));
        assert_eq!(split_specifier("foo-bar@1@2"), ("foo-bar", "1@2"));
        assert_eq!(split_specifier("foo-bar@"), ("foo-bar", ""));
    }

    #[test]
    fn test_typed_parsers_report_field() {
        let err = Scope::parse("ac--me").unwrap_err();
        assert!(matches!(err, IdentError::InvalidScope { ref value, .. } if value == "ac--me"));

        let err = PackageName::parse(PackageKind::Component, "foobar").unwrap_err();
        match err {
            IdentError::InvalidName {
                kind,
                value,
                expected,
            } => {
                assert_eq!(kind, PackageKind::Component);
                assert_eq!(value, "foobar");
                assert_eq!(expected, COMPONENT_NAME_GRAMMAR);
            }
            other => panic!("Expected InvalidName, got {:?}", other),
        }
    }

    #[test]
    fn test_package_id_display() {
        let id = PackageId::new(
            "acme".parse().unwrap(),
            PackageName::parse(PackageKind::Library, "lodash-utils").unwrap(),
        );
        assert_eq!(id.to_string(), "acme/library/lodash-utils");
        assert_eq!(id.kind().collection(), "libraries");
    }
}
