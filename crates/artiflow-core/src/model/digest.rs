//! Digest `<algorithm>:<checksum>` de un artifact.
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest as _, Sha256};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DigestError {
    #[error("digest '{0}' is missing the ':' separator")]
    MissingSeparator(String),
    #[error("invalid digest algorithm '{0}'")]
    InvalidAlgorithm(String),
    #[error("invalid digest checksum '{0}'")]
    InvalidChecksum(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: String,
    checksum: String,
}

impl Digest {
    /// Digest sha256 (hex) del contenido.
    pub fn sha256(content: &[u8]) -> Self {
        Self { algorithm: "sha256".to_string(),
               checksum: format!("{:x}", Sha256::digest(content)) }
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }
}

static ALGORITHM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:[.+_-][a-z0-9]+)*$").expect("digest algorithm pattern"));

static CHECKSUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9=_-]+$").expect("digest checksum pattern"));

impl FromStr for Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (algorithm, checksum) = s.split_once(':')
                                     .ok_or_else(|| DigestError::MissingSeparator(s.to_string()))?;
        if !ALGORITHM.is_match(algorithm) {
            return Err(DigestError::InvalidAlgorithm(algorithm.to_string()));
        }
        if !CHECKSUM.is_match(checksum) {
            return Err(DigestError::InvalidChecksum(checksum.to_string()));
        }
        Ok(Self { algorithm: algorithm.to_string(),
                  checksum: checksum.to_string() })
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.checksum)
    }
}
