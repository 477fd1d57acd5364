//! Caller-facing error taxonomy.
//!
//! Partner-originated failures are classified into a fixed set of kinds
//! and surfaced exactly once through the relevant completion; they are
//! never thrown past the adapter boundary.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use validator::ValidationErrors;

/// A failure reported by the partner SDK, carried for diagnostics.
#[derive(Debug, Clone, Error, Serialize)]
#[error("partner error {code}: {message}")]
pub struct PartnerError {
    /// Partner-defined numeric code.
    pub code: i32,
    /// Partner-supplied description.
    pub message: String,
}

impl PartnerError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        PartnerError {
            code,
            message: message.into(),
        }
    }
}

/// Classified load-time failure causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailureReason {
    InvalidRequest,
    NoFill,
    NetworkError,
    ServerError,
    UnsupportedOsVersion,
    Timeout,
    InvalidBidResponse,
    MalformedResponse,
    AdAlreadyConsumed,
    MissingCredentials,
    /// Partner code with no mapping; the caller applies its generic
    /// default.
    Unmapped,
}

impl LoadFailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadFailureReason::InvalidRequest => "invalid_request",
            LoadFailureReason::NoFill => "no_fill",
            LoadFailureReason::NetworkError => "network_error",
            LoadFailureReason::ServerError => "server_error",
            LoadFailureReason::UnsupportedOsVersion => "unsupported_os_version",
            LoadFailureReason::Timeout => "timeout",
            LoadFailureReason::InvalidBidResponse => "invalid_bid_response",
            LoadFailureReason::MalformedResponse => "malformed_response",
            LoadFailureReason::AdAlreadyConsumed => "ad_already_consumed",
            LoadFailureReason::MissingCredentials => "missing_credentials",
            LoadFailureReason::Unmapped => "unmapped",
        }
    }
}

impl fmt::Display for LoadFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified show-time failure causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowFailureReason {
    AdNotReady,
    OversizedAd,
    InternalError,
    AdAlreadyConsumed,
    WrongThread,
    MediationError,
    /// Partner code with no mapping; the caller applies its generic
    /// default.
    Unmapped,
}

impl ShowFailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ShowFailureReason::AdNotReady => "ad_not_ready",
            ShowFailureReason::OversizedAd => "oversized_ad",
            ShowFailureReason::InternalError => "internal_error",
            ShowFailureReason::AdAlreadyConsumed => "ad_already_consumed",
            ShowFailureReason::WrongThread => "wrong_thread",
            ShowFailureReason::MediationError => "mediation_error",
            ShowFailureReason::Unmapped => "unmapped",
        }
    }
}

impl fmt::Display for ShowFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced to the mediation side.
///
/// Precondition violations are detected synchronously, before any partner
/// call is issued, and reported through the same completion contract an
/// asynchronous failure would use.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Banner operations need a host surface to render into.
    #[error("no presentation context was provided")]
    MissingPresentationContext,

    /// Bidding-only adapter: every load must carry bid markup.
    #[error("bid markup is missing or empty")]
    InvalidAdMarkup,

    #[error("requested banner size is not supported by the partner")]
    InvalidBannerSize,

    #[error("no ad is ready to show")]
    AdNotReady,

    #[error("unsupported ad format: {0}")]
    UnsupportedAdFormat(String),

    #[error("invalid load request: {0}")]
    InvalidRequest(#[from] ValidationErrors),

    #[error("partner SDK failed to initialize")]
    InitializationFailure {
        #[source]
        source: Option<PartnerError>,
    },

    #[error("ad load failed: {reason}")]
    LoadFailure {
        reason: LoadFailureReason,
        #[source]
        source: Option<PartnerError>,
    },

    #[error("ad show failed: {reason}")]
    ShowFailure {
        reason: ShowFailureReason,
        #[source]
        source: Option<PartnerError>,
    },
}
