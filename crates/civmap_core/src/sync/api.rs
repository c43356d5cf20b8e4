//! Remote civilization service contract.
//!
//! # Responsibility
//! - Describe the REST operations the gateway depends on.
//! - Keep transport details behind one trait seam so tests can swap it.
//!
//! # Invariants
//! - Implementations never touch the store; reconciliation is the
//!   gateway's job.
//! - Write calls report success only for a 2xx acknowledgement.

use crate::model::civilization::{CivilizationForm, CivilizationId, CivilizationRecord};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure talking to the remote service.
#[derive(Debug)]
pub enum ApiError {
    /// Transport, TLS, or response decoding failure.
    Request(reqwest::Error),
    /// Service answered with a non-success status.
    Status {
        method: &'static str,
        path: String,
        status: u16,
    },
    /// Endpoint URL or multipart payload could not be built.
    InvalidRequest(String),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Request(err) => write!(f, "request failed: {err}"),
            Self::Status {
                method,
                path,
                status,
            } => write!(f, "{method} {path} returned status {status}"),
            Self::InvalidRequest(message) => write!(f, "invalid request: {message}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Request(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Request(value)
    }
}

/// REST operations of the civilization service.
///
/// Futures are not required to be `Send`: the client runs on a single
/// cooperative event thread.
#[async_trait(?Send)]
pub trait CivilizationApi {
    /// `GET /civilizations`
    async fn list(&self) -> ApiResult<Vec<CivilizationRecord>>;
    /// `POST /civilizations` as multipart.
    async fn create(&self, form: &CivilizationForm) -> ApiResult<()>;
    /// `PUT /civilizations/{id}` as multipart.
    async fn update(&self, id: CivilizationId, form: &CivilizationForm) -> ApiResult<()>;
    /// `DELETE /civilizations/{id}`
    async fn delete(&self, id: CivilizationId) -> ApiResult<()>;
}
