use std::fmt::{self, Display};
use std::str::FromStr;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use proptest::arbitrary::{Arbitrary, any};
use proptest::prop_compose;
use proptest::strategy::{BoxedStrategy, Strategy};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{Error, InvalidParameterError, Result};
use crate::prf::Prf;

/// Base64 for descriptor fields and the encoded hash. Descriptors stored by
/// older deployments may omit padding or carry non-canonical trailing bits,
/// so decoding accepts both.
pub(crate) const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// The salt descriptor persisted alongside a hash: the parameters needed to
/// reproduce a computation, plus the raw random salt bytes.
///
/// The wire form is dot-separated. Two fields
/// (`<iterations>.<salt:base64>`) is the legacy format and leaves the HMAC
/// choice to the hasher's configuration; three fields
/// (`<hmac>.<iterations>.<salt:base64>`) also pin the HMAC.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(into = "String", try_from = "String")]
pub struct SaltDescriptor {
    pub prf: Option<Prf>,
    pub iterations: u32,
    pub salt: Vec<u8>,
}

impl SaltDescriptor {
    /// Draws `salt_length_in_bytes` random bytes and stamps the given PRF and
    /// iteration count into a fresh three-field descriptor.
    pub fn generate(
        mut rng: impl CryptoRng + RngCore,
        prf: Prf,
        iterations: u32,
        salt_length_in_bytes: usize,
    ) -> Result<Self> {
        if salt_length_in_bytes < 1 {
            return Err(InvalidParameterError::new(
                "salt_length_in_bytes",
                "the salt must be at least one byte long",
            )
            .into());
        }

        let mut salt = vec![0_u8; salt_length_in_bytes];
        rng.fill_bytes(&mut salt);

        Ok(Self {
            prf: Some(prf),
            iterations,
            salt,
        })
    }

    pub fn salt_length_in_bytes(&self) -> usize {
        self.salt.len()
    }
}

impl Display for SaltDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prf) = self.prf {
            write!(f, "{prf}.")?;
        }

        write!(f, "{}.{}", self.iterations, BASE64.encode(&self.salt))
    }
}

impl FromStr for SaltDescriptor {
    type Err = Error;

    fn from_str(descriptor: &str) -> Result<Self> {
        let fields = descriptor.split('.').collect::<Vec<_>>();
        let (prf, iterations, salt) = match fields.as_slice() {
            [iterations, salt] => (None, *iterations, *salt),
            [prf, iterations, salt] => {
                let prf = prf
                    .parse::<Prf>()
                    .map_err(|err| Error::malformed_salt(err.to_string()))?;

                (Some(prf), *iterations, *salt)
            }
            _ => {
                return Err(Error::malformed_salt(
                    "expected two or three dot-separated fields",
                ));
            }
        };
        let iterations = iterations.parse::<u32>().map_err(|_| {
            Error::malformed_salt(format!(
                "iteration count {iterations:?} is not a decimal number"
            ))
        })?;
        let salt = BASE64.decode(salt).map_err(|err| {
            Error::malformed_salt(format!("salt bytes are not valid base64: {err}"))
        })?;

        Ok(Self {
            prf,
            iterations,
            salt,
        })
    }
}

impl From<SaltDescriptor> for String {
    fn from(descriptor: SaltDescriptor) -> Self {
        descriptor.to_string()
    }
}

impl TryFrom<String> for SaltDescriptor {
    type Error = Error;

    fn try_from(descriptor: String) -> Result<Self> {
        descriptor.parse()
    }
}

prop_compose! {
    fn arb_salt_descriptor()(
        prf in proptest::option::of(any::<Prf>()),
        iterations in any::<u32>(),
        salt in proptest::collection::vec(any::<u8>(), 0..=128),
    ) -> SaltDescriptor {
        SaltDescriptor { prf, iterations, salt }
    }
}

impl Arbitrary for SaltDescriptor {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        arb_salt_descriptor().boxed()
    }
}
