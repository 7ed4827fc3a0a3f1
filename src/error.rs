use std::borrow::Cow;

use derive_more::From;
use thiserror::Error;

use crate::policy::PolicyError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameterError),
    #[error("malformed salt descriptor: {reason}")]
    MalformedSalt { reason: Cow<'static, str> },
    #[error(transparent)]
    InsecurePolicy(#[from] PolicyError),
    #[error("Tokio Join: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn malformed_salt(reason: impl Into<Cow<'static, str>>) -> Self {
        Error::MalformedSalt {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
#[error("invalid parameter `{label}`: {source}")]
pub struct InvalidParameterError {
    pub label: &'static str,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl InvalidParameterError {
    pub(crate) fn new(label: &'static str, reason: impl Into<GenericError>) -> Self {
        InvalidParameterError {
            label,
            source: Box::new(reason.into()),
        }
    }
}

#[derive(Error, Debug, From)]
#[error("{0}")]
pub struct GenericError(pub Cow<'static, str>);

impl From<&'static str> for GenericError {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for GenericError {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}
