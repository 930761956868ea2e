//! Version string derivation
//!
//! Precedence: explicit value, then a CI tag ref (`GITHUB_REF=refs/tags/1.2.0`),
//! then an abbreviated CI commit hash (`GITHUB_SHA`), then a fixed placeholder.

use std::env;
use tracing::debug;

pub const SNAPSHOT_VERSION: &str = "0.0.0-SNAPSHOT";

const TAG_REF_PREFIX: &str = "refs/tags/";
const SHA_LENGTH: usize = 8;

/// Derives the version from `explicit` or the process environment
pub fn derive_version(explicit: Option<&str>) -> String {
    derive_version_with(explicit, |key| env::var(key).ok())
}

/// Same as [`derive_version`] with an injectable environment lookup
pub fn derive_version_with<F>(explicit: Option<&str>, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(version) = explicit.map(str::trim).filter(|v| !v.is_empty()) {
        debug!(version, "Using explicit version");
        return version.to_string();
    }
    if let Some(version) = parse_ref(&lookup) {
        debug!(version = %version, "Using version from tag ref");
        return version;
    }
    if let Some(version) = parse_sha(&lookup) {
        debug!(version = %version, "Using version from commit hash");
        return version;
    }
    SNAPSHOT_VERSION.to_string()
}

/// Tag name from `GITHUB_REF`, if it points at a tag
pub fn parse_ref<F>(lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup("GITHUB_REF")?
        .strip_prefix(TAG_REF_PREFIX)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
}

/// First characters of `GITHUB_SHA`
pub fn parse_sha<F>(lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let sha = lookup("GITHUB_SHA")?;
    let sha = sha.trim();
    if sha.is_empty() || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(sha.chars().take(SHA_LENGTH).collect())
}
