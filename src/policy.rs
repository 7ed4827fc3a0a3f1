//! Minimum-security bounds checked before a hash is computed. A violated
//! bound is a hard stop rather than a warning, so an insecure configuration
//! can never silently produce a weak credential.

use std::fmt::{self, Display};

use proptest_derive::Arbitrary;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prf::Prf;

pub const MIN_SALT_LENGTH_IN_BYTES: usize = 8;
pub const MIN_ITERATIONS: u32 = 10_000;
pub const RECOMMENDED_ITERATIONS: u32 = 100_000;

/// Whether [`check`] runs before key derivation. Disabling the policy is for
/// interoperating with credentials hashed under parameters that predate it;
/// new deployments keep it enforced.
#[derive(Arbitrary, Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SecurityPolicy {
    #[default]
    Enforced,
    Disabled,
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("{0} is not an acceptable HMAC for key derivation")]
    InsecurePrf(Prf),
    #[error("the salt should be at least {MIN_SALT_LENGTH_IN_BYTES} bytes, got {0}")]
    SaltTooShort(usize),
    #[error(
        "the hash should not be smaller than the salt ({salt_length_in_bytes} bytes), got {hash_length_in_bytes}"
    )]
    HashTooSmall {
        hash_length_in_bytes: usize,
        salt_length_in_bytes: usize,
    },
    #[error(
        "the hash should not be greater than the native {prf} output of {max_length_in_bytes} bytes, got {hash_length_in_bytes}"
    )]
    HashTooBig {
        hash_length_in_bytes: usize,
        prf: Prf,
        max_length_in_bytes: usize,
    },
    #[error("the iteration count should be at least {MIN_ITERATIONS}, got {0}")]
    TooFewIterations(u32),
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub struct PolicyError {
    pub violations: Vec<PolicyViolation>,
}

impl Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "insecure hashing configuration: ")?;

        for (index, violation) in self.violations.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }

            write!(f, "{violation}")?;
        }

        Ok(())
    }
}

/// Evaluates every condition against the effective parameters of a
/// computation and reports all violated ones. Evaluation order is fixed: PRF
/// choice, salt length, hash lower bound, hash upper bound, iteration count.
pub fn check(
    prf: Prf,
    iterations: u32,
    salt_length_in_bytes: usize,
    hash_length_in_bytes: usize,
) -> std::result::Result<(), PolicyError> {
    let mut violations = Vec::new();

    if let Prf::Md5 = prf {
        violations.push(PolicyViolation::InsecurePrf(prf));
    }

    if salt_length_in_bytes < MIN_SALT_LENGTH_IN_BYTES {
        violations.push(PolicyViolation::SaltTooShort(salt_length_in_bytes));
    }

    if hash_length_in_bytes < salt_length_in_bytes {
        violations.push(PolicyViolation::HashTooSmall {
            hash_length_in_bytes,
            salt_length_in_bytes,
        });
    }

    let max_length_in_bytes = prf.output_length_in_bytes();

    if hash_length_in_bytes > max_length_in_bytes {
        violations.push(PolicyViolation::HashTooBig {
            hash_length_in_bytes,
            prf,
            max_length_in_bytes,
        });
    }

    if iterations < MIN_ITERATIONS {
        violations.push(PolicyViolation::TooFewIterations(iterations));
    } else if iterations < RECOMMENDED_ITERATIONS {
        tracing::warn!(
            "the iteration count {iterations} is below the recommended {RECOMMENDED_ITERATIONS}"
        );
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(PolicyError { violations })
    }
}
