//! Error taxonomy for the ingestion pipeline.
//!
//! Each variant maps to one recoverable failure class; the command layer
//! renders `user_message()` verbatim and never leaks internal detail.

use thiserror::Error;

use crate::ingest::extractor::ExtractError;
use crate::ingest::resolver::ResolveError;
use crate::store::StoreError;

/// Failure classes surfaced by the ingestion pipeline to its caller.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The supplied link is not a recognizable product URL.
    #[error(transparent)]
    InvalidUrl(#[from] ResolveError),
    /// The product page could not be fetched or parsed after all attempts.
    #[error("extraction failed: {0}")]
    ExtractionFailed(#[from] ExtractError),
    /// The store write did not apply; no cache update happens on this path.
    #[error("persistence failed: {0}")]
    PersistenceFailed(#[from] StoreError),
}

impl IngestError {
    /// Human-readable reason for the admin, with actionable guidance.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => {
                "Invalid Amazon URL. Please provide a valid Amazon product URL."
            }
            Self::ExtractionFailed(_) => {
                "Failed to fetch product details. This could be because:\n\
                 1. The product page is not accessible\n\
                 2. The product is out of stock\n\
                 3. The marketplace anti-bot protection is active\n\
                 Please try again in a few minutes."
            }
            Self::PersistenceFailed(_) => "Failed to save the product. Please try again.",
        }
    }
}
