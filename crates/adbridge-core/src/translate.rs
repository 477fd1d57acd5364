//! Partner error-code translation.
//!
//! Table-driven and total: every known partner code maps to exactly one
//! caller-facing reason, and anything unrecognized maps to `Unmapped`.
//! Translation never fails.

use phf::phf_map;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::{AdapterError, LoadFailureReason, PartnerError, ShowFailureReason};

/// Load-phase error codes defined by the partner SDK.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
pub enum PartnerLoadCode {
    InvalidRequest = 0,
    NoFill = 1,
    NetworkError = 2,
    ServerError = 3,
    OsVersionTooLow = 4,
    Timeout = 5,
    InvalidBidPayload = 7,
    InvalidResponse = 13,
    AdAlreadyUsed = 19,
    AppIdentifierMissing = 20,
}

/// Show-phase error codes defined by the partner SDK.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
pub enum PartnerShowCode {
    MediationNoFill = 9,
    AdNotReady = 15,
    AdTooLarge = 16,
    InternalError = 17,
    AdAlreadyUsed = 18,
    NotMainThread = 21,
}

static LOAD_REASONS: phf::Map<i32, LoadFailureReason> = phf_map! {
    0i32 => LoadFailureReason::InvalidRequest,
    1i32 => LoadFailureReason::NoFill,
    2i32 => LoadFailureReason::NetworkError,
    3i32 => LoadFailureReason::ServerError,
    4i32 => LoadFailureReason::UnsupportedOsVersion,
    5i32 => LoadFailureReason::Timeout,
    7i32 => LoadFailureReason::InvalidBidResponse,
    13i32 => LoadFailureReason::MalformedResponse,
    19i32 => LoadFailureReason::AdAlreadyConsumed,
    20i32 => LoadFailureReason::MissingCredentials,
};

static SHOW_REASONS: phf::Map<i32, ShowFailureReason> = phf_map! {
    9i32 => ShowFailureReason::MediationError,
    15i32 => ShowFailureReason::AdNotReady,
    16i32 => ShowFailureReason::OversizedAd,
    17i32 => ShowFailureReason::InternalError,
    18i32 => ShowFailureReason::AdAlreadyConsumed,
    21i32 => ShowFailureReason::WrongThread,
};

/// Classify a partner load-phase code.
pub fn load_failure_reason(code: i32) -> LoadFailureReason {
    LOAD_REASONS
        .get(&code)
        .copied()
        .unwrap_or(LoadFailureReason::Unmapped)
}

/// Classify a partner show-phase code.
pub fn show_failure_reason(code: i32) -> ShowFailureReason {
    SHOW_REASONS
        .get(&code)
        .copied()
        .unwrap_or(ShowFailureReason::Unmapped)
}

/// Wrap a partner load failure into the caller-facing error.
pub fn load_error(partner: PartnerError) -> AdapterError {
    AdapterError::LoadFailure {
        reason: load_failure_reason(partner.code),
        source: Some(partner),
    }
}

/// Wrap a partner show failure into the caller-facing error.
pub fn show_error(partner: PartnerError) -> AdapterError {
    AdapterError::ShowFailure {
        reason: show_failure_reason(partner.code),
        source: Some(partner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN_LOAD_CODES: [PartnerLoadCode; 10] = [
        PartnerLoadCode::InvalidRequest,
        PartnerLoadCode::NoFill,
        PartnerLoadCode::NetworkError,
        PartnerLoadCode::ServerError,
        PartnerLoadCode::OsVersionTooLow,
        PartnerLoadCode::Timeout,
        PartnerLoadCode::InvalidBidPayload,
        PartnerLoadCode::InvalidResponse,
        PartnerLoadCode::AdAlreadyUsed,
        PartnerLoadCode::AppIdentifierMissing,
    ];

    const KNOWN_SHOW_CODES: [PartnerShowCode; 6] = [
        PartnerShowCode::MediationNoFill,
        PartnerShowCode::AdNotReady,
        PartnerShowCode::AdTooLarge,
        PartnerShowCode::InternalError,
        PartnerShowCode::AdAlreadyUsed,
        PartnerShowCode::NotMainThread,
    ];

    #[test]
    fn test_every_known_load_code_has_a_mapping() {
        for code in KNOWN_LOAD_CODES {
            assert_ne!(
                load_failure_reason(code as i32),
                LoadFailureReason::Unmapped,
                "load code {:?} should be mapped",
                code
            );
        }
    }

    #[test]
    fn test_every_known_show_code_has_a_mapping() {
        for code in KNOWN_SHOW_CODES {
            assert_ne!(
                show_failure_reason(code as i32),
                ShowFailureReason::Unmapped,
                "show code {:?} should be mapped",
                code
            );
        }
    }

    #[test]
    fn test_load_table_spot_checks() {
        assert_eq!(load_failure_reason(1), LoadFailureReason::NoFill);
        assert_eq!(load_failure_reason(5), LoadFailureReason::Timeout);
        assert_eq!(
            load_failure_reason(20),
            LoadFailureReason::MissingCredentials
        );
    }

    #[test]
    fn test_show_table_spot_checks() {
        assert_eq!(show_failure_reason(15), ShowFailureReason::AdNotReady);
        assert_eq!(show_failure_reason(16), ShowFailureReason::OversizedAd);
        assert_eq!(show_failure_reason(21), ShowFailureReason::WrongThread);
    }

    #[test]
    fn test_unrecognized_codes_map_to_unmapped() {
        assert_eq!(load_failure_reason(-1), LoadFailureReason::Unmapped);
        assert_eq!(load_failure_reason(9999), LoadFailureReason::Unmapped);
        assert_eq!(show_failure_reason(-1), ShowFailureReason::Unmapped);
        assert_eq!(show_failure_reason(9999), ShowFailureReason::Unmapped);
    }

    #[test]
    fn test_load_error_carries_partner_source() {
        let err = load_error(PartnerError::new(1, "no ads returned"));
        match err {
            AdapterError::LoadFailure { reason, source } => {
                assert_eq!(reason, LoadFailureReason::NoFill);
                assert_eq!(source.unwrap().code, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_show_error_unmapped_code_still_wraps() {
        let err = show_error(PartnerError::new(42, "mystery"));
        match err {
            AdapterError::ShowFailure { reason, source } => {
                assert_eq!(reason, ShowFailureReason::Unmapped);
                assert_eq!(source.unwrap().code, 42);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
