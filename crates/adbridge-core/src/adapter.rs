//! Adapter-level surface: partner SDK set-up, bidder information, privacy
//! signals, and the session factory.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use validator::Validate;

use crate::bridge::{AdLifecycleDelegate, DelegateHandle};
use crate::error::AdapterError;
use crate::extras::{keys, PrivacyStore, SharedExtras};
use crate::partner::{InitializationState, PartnerRequest, PartnerSdk};
use crate::request::{AdLoadRequest, PreBidRequest, REQUEST_AGENT};
use crate::session::AdSession;

/// Major version of the mediation contract this adapter targets; first
/// component of the adapter version string.
const MEDIATION_MAJOR_VERSION: u32 = 4;
/// Adapter build number, the last component of the version string.
const ADAPTER_BUILD_VERSION: u32 = 0;

/// GDPR consent status reported by the mediation side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentStatus {
    Unknown,
    Denied,
    Granted,
}

/// The adapter instance binding the mediation contract to the partner SDK.
pub struct MediationAdapter {
    sdk: Arc<dyn PartnerSdk>,
    privacy: Arc<dyn PrivacyStore>,
    shared_extras: SharedExtras,
}

impl MediationAdapter {
    pub fn new(sdk: Arc<dyn PartnerSdk>, privacy: Arc<dyn PrivacyStore>) -> Self {
        MediationAdapter {
            sdk,
            privacy,
            shared_extras: SharedExtras::new(),
        }
    }

    /// Partner SDK version, as the SDK reports it.
    pub fn partner_sdk_version(&self) -> String {
        self.sdk.sdk_version()
    }

    /// Adapter version string:
    /// `<mediation major>.<partner SDK version>.<adapter build>`.
    pub fn adapter_version(&self) -> String {
        format!(
            "{}.{}.{}",
            MEDIATION_MAJOR_VERSION,
            self.sdk.sdk_version(),
            ADAPTER_BUILD_VERSION
        )
    }

    /// Extras included in every partner request. Exposed so the privacy
    /// propagation layer can mutate them between requests.
    pub fn shared_extras(&self) -> &SharedExtras {
        &self.shared_extras
    }

    /// Set up the partner SDK before ads are loaded.
    ///
    /// Seeds the shared extras every request must carry, then drives the
    /// partner's asynchronous initialization. When the SDK already reports
    /// ready the call short-circuits successfully; a redundant set-up is
    /// harmless.
    pub async fn set_up(&self) -> Result<(), AdapterError> {
        log::info!("partner SDK set-up started");
        self.shared_extras
            .set(keys::QUERY_TYPE, Value::from(keys::QUERY_TYPE_BIDDING));

        if self.sdk.initialization_state() == InitializationState::Ready {
            log::info!("redundant partner SDK initialization was ignored");
            return Ok(());
        }

        match self.sdk.initialize().await {
            Ok(()) => {
                log::info!("partner SDK set-up succeeded");
                Ok(())
            }
            Err(err) => {
                log::error!("partner SDK set-up failed: {}", err);
                Err(AdapterError::InitializationFailure { source: Some(err) })
            }
        }
    }

    /// Fetch the bidding token needed for the partner to participate in an
    /// auction. Returns `None` on failure; the mediation side treats a
    /// missing token as a skipped bidder rather than an error.
    pub async fn fetch_bidder_information(
        &self,
        request: &PreBidRequest,
    ) -> Option<BTreeMap<String, String>> {
        log::info!("bidder info fetch started placement={}", request.placement);
        let partner_request = PartnerRequest {
            request_agent: REQUEST_AGENT.to_string(),
            ad_string: String::new(),
            extras: self.shared_extras.snapshot(),
        };

        match self.sdk.query_token(request.format, partner_request).await {
            Ok(token) => {
                log::info!(
                    "bidder info fetch succeeded placement={}",
                    request.placement
                );
                Some(BTreeMap::from([("token".to_string(), token)]))
            }
            Err(err) => {
                log::error!(
                    "bidder info fetch failed placement={}: {}",
                    request.placement,
                    err
                );
                None
            }
        }
    }

    /// Apply the GDPR signal. Withheld consent switches the partner to
    /// non-personalized ads; granted or inapplicable removes the flag.
    pub fn set_gdpr(&self, applies: Option<bool>, status: ConsentStatus) {
        if applies == Some(true) && status != ConsentStatus::Granted {
            self.shared_extras
                .set(keys::NON_PERSONALIZED_ADS, Value::from("1"));
            log::info!("privacy updated: {}=1", keys::NON_PERSONALIZED_ADS);
        } else {
            self.shared_extras.remove(keys::NON_PERSONALIZED_ADS);
            log::info!("privacy updated: {} cleared", keys::NON_PERSONALIZED_ADS);
        }
    }

    /// Apply the CCPA signal. "Has given consent" is the opposite of
    /// "needs restricted data processing", so the persisted flag is the
    /// inverted boolean; the partner reads it from the store.
    pub fn set_ccpa(&self, has_given_consent: bool, privacy_string: &str) {
        let restrict = !has_given_consent;
        log::info!(
            "privacy updated: {}={} (us_privacy={})",
            keys::RESTRICTED_DATA_PROCESSING,
            restrict,
            privacy_string
        );
        self.privacy
            .set_flag(keys::RESTRICTED_DATA_PROCESSING, restrict);
    }

    /// Apply the COPPA child-directed signal directly to the partner SDK.
    pub fn set_coppa(&self, is_child_directed: bool) {
        log::info!("privacy updated: child_directed={}", is_child_directed);
        self.sdk.set_child_directed(is_child_directed);
    }

    /// Create the session for one load request.
    ///
    /// One session per load call; sessions are never reused across loads.
    /// The delegate is held weakly — the caller owns its lifetime — and the
    /// caller invalidates the session before disposing of it.
    pub fn make_session(
        &self,
        request: AdLoadRequest,
        delegate: &Arc<dyn AdLifecycleDelegate>,
    ) -> Result<Arc<AdSession>, AdapterError> {
        request.validate()?;
        Ok(AdSession::new(
            request,
            Arc::clone(&self.sdk),
            self.shared_extras.clone(),
            DelegateHandle::new(delegate),
        ))
    }
}
