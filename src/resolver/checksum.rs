//! Optional verification against repository checksum sidecars

use crate::error::ResolveError;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// How downloaded artifacts are checked against the repository's published hash
///
/// Maven Central and Clojars publish `.md5` and `.sha1` for every artifact;
/// `.sha256` is often missing for older releases. Cache hits are never
/// re-verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    #[default]
    None,
    Md5,
    Sha1,
    Sha256,
}

/// Incremental digest state for one policy
pub enum ChecksumHasher {
    Md5(md5::Context),
    Sha1(Sha1),
    Sha256(Sha256),
}

impl ChecksumHasher {
    pub fn update(&mut self, bytes: &[u8]) {
        match self {
            ChecksumHasher::Md5(context) => context.consume(bytes),
            ChecksumHasher::Sha1(hasher) => hasher.update(bytes),
            ChecksumHasher::Sha256(hasher) => hasher.update(bytes),
        }
    }

    /// Lowercase hex digest of everything fed so far
    pub fn finish(self) -> String {
        match self {
            ChecksumHasher::Md5(context) => format!("{:x}", context.compute()),
            ChecksumHasher::Sha1(hasher) => hex::encode(hasher.finalize()),
            ChecksumHasher::Sha256(hasher) => hex::encode(hasher.finalize()),
        }
    }
}

impl ChecksumPolicy {
    /// Sidecar extension published next to the artifact (`.md5`, `.sha1`, `.sha256`)
    pub fn sidecar_extension(&self) -> Option<&'static str> {
        match self {
            ChecksumPolicy::None => None,
            ChecksumPolicy::Md5 => Some("md5"),
            ChecksumPolicy::Sha1 => Some("sha1"),
            ChecksumPolicy::Sha256 => Some("sha256"),
        }
    }

    pub fn sidecar_path(&self, relative_path: &str) -> Option<String> {
        self.sidecar_extension()
            .map(|ext| format!("{}.{}", relative_path, ext))
    }

    pub fn hasher(&self) -> Option<ChecksumHasher> {
        match self {
            ChecksumPolicy::None => None,
            ChecksumPolicy::Md5 => Some(ChecksumHasher::Md5(md5::Context::new())),
            ChecksumPolicy::Sha1 => Some(ChecksumHasher::Sha1(Sha1::new())),
            ChecksumPolicy::Sha256 => Some(ChecksumHasher::Sha256(Sha256::new())),
        }
    }

    /// Lowercase hex digest of `bytes`, or `None` when verification is off
    pub fn digest(&self, bytes: &[u8]) -> Option<String> {
        let mut hasher = self.hasher()?;
        hasher.update(bytes);
        Some(hasher.finish())
    }

    /// Compares `bytes` with the contents of a sidecar file
    pub fn verify(&self, relative_path: &str, bytes: &[u8], sidecar: &str) -> Result<(), ResolveError> {
        match self.digest(bytes) {
            Some(actual) => self.check(relative_path, actual, sidecar),
            None => Ok(()),
        }
    }

    /// Compares an already computed digest with the contents of a sidecar file
    pub fn check(&self, relative_path: &str, actual: String, sidecar: &str) -> Result<(), ResolveError> {
        let expected = parse_sidecar(sidecar).ok_or_else(|| {
            ResolveError::network(relative_path, "checksum sidecar is empty")
        })?;

        if expected != actual {
            return Err(ResolveError::ChecksumMismatch {
                path: relative_path.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }
}

/// Sidecars hold the hex digest, sometimes followed by a file name
fn parse_sidecar(contents: &str) -> Option<String> {
    contents
        .split_whitespace()
        .next()
        .map(|token| token.to_ascii_lowercase())
}

impl FromStr for ChecksumPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Ok(ChecksumPolicy::None),
            "md5" => Ok(ChecksumPolicy::Md5),
            "sha1" => Ok(ChecksumPolicy::Sha1),
            "sha256" => Ok(ChecksumPolicy::Sha256),
            other => Err(format!(
                "Invalid checksum policy: {}. Valid options: none, md5, sha1, sha256",
                other
            )),
        }
    }
}

impl fmt::Display for ChecksumPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChecksumPolicy::None => "none",
            ChecksumPolicy::Md5 => "md5",
            ChecksumPolicy::Sha1 => "sha1",
            ChecksumPolicy::Sha256 => "sha256",
        };
        write!(f, "{}", s)
    }
}
