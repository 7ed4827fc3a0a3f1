//! Deriving and verifying salted PBKDF2 password hashes.
//!
//! The caller persists the `(salt, hash)` pair of a [`HashOutput`] per
//! credential. Verifying a later attempt recomputes the hash under the stored
//! descriptor and compares the results in constant time:
//!
//! ```
//! use keystretch::hasher::{HashRequest, Pbkdf2Hasher};
//!
//! # fn main() -> keystretch::error::Result<()> {
//! let hasher = Pbkdf2Hasher::default();
//! let stored = hasher.compute_blocking(&HashRequest::new("correct horse battery staple"))?;
//!
//! assert!(hasher.verify_blocking("correct horse battery staple", &stored)?);
//! assert!(!hasher.verify_blocking("Tr0ub4dor&3", &stored)?);
//! # Ok(())
//! # }
//! ```

use std::time::{Duration, Instant};

use base64::Engine;
use proptest::arbitrary::{Arbitrary, any};
use proptest::strategy::{BoxedStrategy, Just, Strategy};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::instrument;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{InvalidParameterError, Result};
use crate::policy::{
    self, MIN_ITERATIONS, MIN_SALT_LENGTH_IN_BYTES, RECOMMENDED_ITERATIONS, SecurityPolicy,
};
use crate::prf::Prf;
use crate::salt::{BASE64, SaltDescriptor};
use crate::secret::Secret;

pub const DEFAULT_SALT_LENGTH_IN_BYTES: usize = 64;
pub const DEFAULT_HASH_LENGTH_IN_BYTES: usize = 64;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pbkdf2Params {
    pub prf: Prf,
    pub iterations: u32,
    /// Length of freshly generated salts. A salt reused from a stored
    /// descriptor keeps whatever length it was generated with.
    pub salt_length_in_bytes: usize,
    pub hash_length_in_bytes: usize,
    pub policy: SecurityPolicy,
}

impl Default for Pbkdf2Params {
    fn default() -> Self {
        Self {
            prf: Prf::default(),
            iterations: RECOMMENDED_ITERATIONS,
            salt_length_in_bytes: DEFAULT_SALT_LENGTH_IN_BYTES,
            hash_length_in_bytes: DEFAULT_HASH_LENGTH_IN_BYTES,
            policy: SecurityPolicy::default(),
        }
    }
}

/// Where the salt of a computation comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaltSource {
    /// Reuse a stored descriptor. Its iteration count, and its HMAC choice if
    /// it carries one, take precedence over the hasher's configuration.
    Descriptor(SaltDescriptor),
    /// Draw fresh random bytes per the hasher's configuration.
    Generate,
}

/// The immutable input of one computation, zeroized on drop.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct HashRequest {
    pub secret: Secret<String>,
    #[zeroize(skip)]
    pub salt: SaltSource,
}

impl HashRequest {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Secret(secret.into()),
            salt: SaltSource::Generate,
        }
    }

    pub fn with_salt(secret: impl Into<String>, descriptor: SaltDescriptor) -> Self {
        Self {
            secret: Secret(secret.into()),
            salt: SaltSource::Descriptor(descriptor),
        }
    }
}

/// The result of a successful computation. `salt` is the descriptor that was
/// actually used, whether reused or freshly generated; `hash` is the base64
/// encoding of the derived key.
///
/// When checking an untrusted attempt against a stored output, use
/// [`Pbkdf2Hasher::verify`] or [`compare`], never plain equality.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashOutput {
    pub salt: SaltDescriptor,
    pub hash: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pbkdf2Hasher {
    pub params: Pbkdf2Params,
}

impl Pbkdf2Hasher {
    pub fn new(params: Pbkdf2Params) -> Self {
        Self { params }
    }

    /// Derives the hash for `request` on the calling thread.
    ///
    /// The effective iteration count and HMAC come from the salt descriptor
    /// where it specifies them; the hash length always comes from the
    /// hasher. The security policy, unless disabled, validates those
    /// effective values before the secret is touched.
    #[instrument(skip_all)]
    pub fn compute_blocking(&self, request: &HashRequest) -> Result<HashOutput> {
        if request.secret.is_empty() {
            return Err(
                InvalidParameterError::new("secret", "the secret to be hashed must not be empty")
                    .into(),
            );
        }

        let descriptor = match &request.salt {
            SaltSource::Descriptor(descriptor) => descriptor.clone(),
            SaltSource::Generate => self.generate_salt()?,
        };
        let prf = descriptor.prf.unwrap_or(self.params.prf);
        let iterations = descriptor.iterations;
        let hash_length_in_bytes = self.params.hash_length_in_bytes;

        if iterations < 1 {
            return Err(InvalidParameterError::new(
                "iterations",
                "at least one iteration is required",
            )
            .into());
        }

        if hash_length_in_bytes < 1 {
            return Err(InvalidParameterError::new(
                "hash_length_in_bytes",
                "the hash must be at least one byte long",
            )
            .into());
        }

        if let SecurityPolicy::Enforced = self.params.policy {
            policy::check(
                prf,
                iterations,
                descriptor.salt_length_in_bytes(),
                hash_length_in_bytes,
            )?;
        }

        let mut derived = vec![0_u8; hash_length_in_bytes];
        prf.derive(
            request.secret.as_bytes(),
            &descriptor.salt,
            iterations,
            &mut derived,
        );

        Ok(HashOutput {
            salt: descriptor,
            hash: BASE64.encode(&derived),
        })
    }

    /// Like [`Self::compute_blocking`], offloaded to a blocking thread so the
    /// intentionally expensive derivation does not stall the executor.
    pub async fn compute(&self, request: &HashRequest) -> Result<HashOutput> {
        let hasher = self.clone();
        let request = request.clone();

        tokio::task::spawn_blocking(move || hasher.compute_blocking(&request)).await?
    }

    /// Composes a fresh three-field descriptor from the configured HMAC,
    /// iteration count, and salt length.
    pub fn generate_salt(&self) -> Result<SaltDescriptor> {
        SaltDescriptor::generate(
            OsRng,
            self.params.prf,
            self.params.iterations,
            self.params.salt_length_in_bytes,
        )
    }

    /// Recomputes the hash of `secret` under the stored descriptor and
    /// compares it against the stored hash in constant time.
    pub fn verify_blocking(&self, secret: impl Into<String>, stored: &HashOutput) -> Result<bool> {
        let request = HashRequest::with_salt(secret, stored.salt.clone());
        let recomputed = self.compute_blocking(&request)?;

        Ok(compare(&recomputed.hash, &stored.hash))
    }

    /// Like [`Self::verify_blocking`], offloaded to a blocking thread.
    pub async fn verify(&self, secret: impl Into<String>, stored: &HashOutput) -> Result<bool> {
        let hasher = self.clone();
        let secret = secret.into();
        let stored = stored.clone();

        tokio::task::spawn_blocking(move || hasher.verify_blocking(secret, &stored)).await?
    }

    /// Times one full computation over a canned sample secret at the given
    /// iteration count, for calibrating the count against a latency target.
    #[deprecated(note = "calibrate iteration counts with a benchmark harness instead")]
    pub fn measure_iterations(&self, iterations: u32) -> Result<Duration> {
        let hasher = Self {
            params: Pbkdf2Params {
                iterations,
                ..self.params.clone()
            },
        };
        let request = HashRequest::new("calibration sample secret");
        let start = Instant::now();

        hasher.compute_blocking(&request)?;

        Ok(start.elapsed())
    }
}

/// Constant-time string equality for hash verification.
///
/// Inputs of differing lengths compare unequal immediately; the length of a
/// stored hash is a public fact. Equal-length inputs are combined into a
/// single accumulator with no early exit, so the run time does not depend on
/// the position of the first mismatch.
pub fn compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

pub fn arb_secure_params() -> impl Strategy<Value = Pbkdf2Params> {
    any::<Prf>()
        .prop_filter("MD5 is rejected by the policy", |prf| {
            !matches!(prf, Prf::Md5)
        })
        .prop_flat_map(|prf| {
            (
                Just(prf),
                MIN_SALT_LENGTH_IN_BYTES..=prf.output_length_in_bytes(),
            )
        })
        .prop_flat_map(|(prf, salt_length_in_bytes)| {
            (
                Just(prf),
                Just(salt_length_in_bytes),
                salt_length_in_bytes..=prf.output_length_in_bytes(),
                MIN_ITERATIONS..=2 * RECOMMENDED_ITERATIONS,
            )
        })
        .prop_map(
            |(prf, salt_length_in_bytes, hash_length_in_bytes, iterations)| Pbkdf2Params {
                prf,
                iterations,
                salt_length_in_bytes,
                hash_length_in_bytes,
                policy: SecurityPolicy::Enforced,
            },
        )
}

impl Arbitrary for Pbkdf2Params {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        arb_secure_params().boxed()
    }
}

impl Arbitrary for Pbkdf2Hasher {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        arb_secure_params().prop_map(Pbkdf2Hasher::new).boxed()
    }
}
