//! Load requests and the outbound request builder.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::extras::{keys, SharedExtras};
use crate::format::{AdFormat, BannerSize};
use crate::partner::PartnerRequest;

/// Attribution tag stamped on every outbound partner request.
pub const REQUEST_AGENT: &str = "AdBridge";

fn new_request_id() -> String {
    Uuid::now_v7().simple().to_string()
}

/// A single ad load request. Immutable once constructed; owned by its
/// session for the session's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdLoadRequest {
    /// Unique identifier for this load, echoed to the partner on hybrid
    /// setups.
    pub identifier: String,
    /// Partner placement the ad is served against.
    pub placement: String,
    /// Requested ad format.
    pub format: AdFormat,
    /// Opaque bid markup won at auction. This adapter is bidding-only;
    /// loads without markup are rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adm: Option<String>,
    /// Requested banner dimensions; required for banner formats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<BannerSize>,
    /// Free-form per-placement settings from the mediation config.
    #[serde(default)]
    pub partner_settings: Map<String, Value>,
}

impl AdLoadRequest {
    /// Build a request with a generated identifier.
    pub fn new(placement: impl Into<String>, format: AdFormat) -> Self {
        AdLoadRequest {
            identifier: new_request_id(),
            placement: placement.into(),
            format,
            adm: None,
            size: None,
            partner_settings: Map::new(),
        }
    }

    pub fn with_adm(mut self, adm: impl Into<String>) -> Self {
        self.adm = Some(adm.into());
        self
    }

    pub fn with_size(mut self, size: BannerSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_setting(mut self, key: &str, value: Value) -> Self {
        self.partner_settings.insert(key.to_string(), value);
        self
    }

    /// Whether the per-placement settings carry the hybrid flag as a
    /// strict boolean true.
    fn is_hybrid_setup(&self) -> bool {
        self.partner_settings
            .get(keys::IS_HYBRID_SETUP)
            .and_then(Value::as_bool)
            == Some(true)
    }

    /// Assemble the outbound partner request.
    ///
    /// Recomputed on every call: the shared extras change between requests
    /// as privacy signals propagate. On hybrid setups the hybrid flag and
    /// the echoed request identifier are added, overriding shared keys on
    /// collision.
    pub fn build_partner_request(&self, shared: &SharedExtras) -> PartnerRequest {
        let mut extras = shared.snapshot();
        if self.is_hybrid_setup() {
            extras.insert(keys::IS_HYBRID_SETUP.to_string(), Value::Bool(true));
            extras.insert(
                keys::PLACEMENT_REQUEST_ID.to_string(),
                Value::String(self.identifier.clone()),
            );
        }
        PartnerRequest {
            request_agent: REQUEST_AGENT.to_string(),
            ad_string: self.adm.clone().unwrap_or_default(),
            extras,
        }
    }
}

impl Validate for AdLoadRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.identifier.trim().is_empty() {
            let mut error = ValidationError::new("required");
            error.message = Some("identifier must be non-empty".into());
            errors.add("identifier", error);
        }

        if self.placement.trim().is_empty() {
            let mut error = ValidationError::new("required");
            error.message = Some("placement must be non-empty".into());
            errors.add("placement", error);
        }

        if self.format == AdFormat::Banner && self.size.is_none() {
            let mut error = ValidationError::new("missing_size");
            error.message = Some("banner requests require a size".into());
            errors.add("size", error);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Pre-auction bidder-information request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PreBidRequest {
    /// Placement the auction is for.
    #[validate(length(min = 1))]
    pub placement: String,
    /// Format that will be requested if the bid wins.
    pub format: AdFormat,
}
