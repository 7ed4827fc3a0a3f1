use std::fmt::{self, Display};
use std::str::FromStr;

use md5::Md5;
use pbkdf2::pbkdf2_hmac;
use proptest_derive::Arbitrary;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use thiserror::Error;

/// The HMAC used as the pseudorandom function inside PBKDF2. The choice
/// determines the native output size, which bounds the derivable hash length
/// under the security policy.
#[derive(Arbitrary, Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Prf {
    Sha1,
    Sha256,
    Sha384,
    #[default]
    Sha512,
    Md5,
}

impl Prf {
    pub fn output_length_in_bytes(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
            Self::Md5 => 16,
        }
    }

    /// Stretches `secret` and `salt` into `output.len()` bytes of key material.
    pub fn derive(&self, secret: &[u8], salt: &[u8], iterations: u32, output: &mut [u8]) {
        match self {
            Self::Sha1 => pbkdf2_hmac::<Sha1>(secret, salt, iterations, output),
            Self::Sha256 => pbkdf2_hmac::<Sha256>(secret, salt, iterations, output),
            Self::Sha384 => pbkdf2_hmac::<Sha384>(secret, salt, iterations, output),
            Self::Sha512 => pbkdf2_hmac::<Sha512>(secret, salt, iterations, output),
            Self::Md5 => pbkdf2_hmac::<Md5>(secret, salt, iterations, output),
        }
    }
}

impl Display for Prf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha1 => write!(f, "SHA1"),
            Self::Sha256 => write!(f, "SHA256"),
            Self::Sha384 => write!(f, "SHA384"),
            Self::Sha512 => write!(f, "SHA512"),
            Self::Md5 => write!(f, "MD5"),
        }
    }
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("unrecognized HMAC name: {0:?}")]
pub struct UnrecognizedPrfError(pub String);

impl FromStr for Prf {
    type Err = UnrecognizedPrfError;

    // Unsupported names are rejected rather than mapped to a default.
    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        match name {
            "SHA1" => Ok(Self::Sha1),
            "SHA256" => Ok(Self::Sha256),
            "SHA384" => Ok(Self::Sha384),
            "SHA512" => Ok(Self::Sha512),
            "MD5" => Ok(Self::Md5),
            _ => Err(UnrecognizedPrfError(name.to_owned())),
        }
    }
}
