use std::fmt::{self, Debug, Display};

use derive_more::{Deref, DerefMut};
use proptest_derive::Arbitrary;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A wrapper with a custom [`Display`] and [`Debug`] implementation to hide
/// the underlying data.
#[derive(
    Arbitrary,
    Clone,
    Default,
    Deref,
    DerefMut,
    Deserialize,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Zeroize,
    ZeroizeOnDrop,
)]
#[serde(transparent)]
pub struct Secret<T: Zeroize>(pub T);

impl<T> From<T> for Secret<T>
where
    T: Zeroize,
{
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> Display for Secret<T>
where
    T: Zeroize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret")
    }
}

impl<T> Debug for Secret<T>
where
    T: Zeroize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn test_formatting_hides_the_value() {
        let secret = Secret("hunter2".to_owned());

        assert_eq!(format!("{secret}"), "Secret");
        assert_eq!(format!("{secret:?}"), "Secret");
    }
}
