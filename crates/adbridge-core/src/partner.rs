//! Partner SDK trait surface.
//!
//! The adapter consumes the partner's native API through these traits. A
//! production integration backs them with the vendor SDK binding; the test
//! suite uses scripted fakes. Lifecycle signals are delivered on whatever
//! thread or queue the partner SDK controls and are forwarded as-is.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::PartnerError;
use crate::format::{AdFormat, PartnerBannerSize, PartnerReportedSize};

/// Outbound request handed to the partner SDK.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerRequest {
    /// Mediator attribution tag, fixed per adapter.
    pub request_agent: String,
    /// Bid markup to render; empty for non-ad requests such as query-token
    /// fetches.
    pub ad_string: String,
    /// Merged extra parameters (see the request builder).
    pub extras: Map<String, Value>,
}

/// SDK-wide initialization state reported by the partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializationState {
    NotReady,
    Ready,
}

/// Reward payload reported by the partner for rewarded formats.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerReward {
    pub amount: i64,
    pub kind: String,
}

/// Host surface an ad is rendered or presented on, plus the execution
/// context the partner's view work must run on.
pub trait PresentationContext: Send + Sync {
    /// Run `task` on the platform's required execution context for view
    /// construction and presentation.
    fn dispatch(&self, task: Box<dyn FnOnce() + Send>);
}

/// Callbacks from a loading or displayed partner banner.
pub trait BannerAdObserver: Send + Sync {
    fn did_receive(&self, size: PartnerReportedSize);
    fn did_fail(&self, error: PartnerError);
    fn did_record_impression(&self);
    fn did_record_click(&self);
}

/// Callbacks from a presented full-screen partner ad.
pub trait FullScreenAdObserver: Send + Sync {
    fn will_present(&self);
    fn did_fail_to_present(&self, error: PartnerError);
    fn did_record_impression(&self);
    fn did_record_click(&self);
    fn did_earn_reward(&self, reward: PartnerReward);
    fn did_dismiss(&self);
}

/// Live partner banner. Holding the handle keeps the underlying view
/// alive; dropping it releases the view.
pub trait PartnerBannerAd: Send + Sync {}

/// A loaded full-screen partner ad.
pub trait PartnerFullScreenAd: Send + Sync {
    /// Present against `context`; lifecycle signals arrive on `observer`.
    fn present(
        &self,
        context: Arc<dyn PresentationContext>,
        observer: Arc<dyn FullScreenAdObserver>,
    );
}

/// Completion for a full-screen load issued to the partner.
pub type FullScreenLoadCompletion =
    Box<dyn FnOnce(Result<Arc<dyn PartnerFullScreenAd>, PartnerError>) + Send>;

/// The partner ad-serving SDK surface this adapter consumes.
#[async_trait]
pub trait PartnerSdk: Send + Sync {
    /// Partner SDK semantic version string.
    fn sdk_version(&self) -> String;

    /// Current SDK-wide initialization state.
    fn initialization_state(&self) -> InitializationState;

    /// Drive SDK-wide initialization to completion.
    async fn initialize(&self) -> Result<(), PartnerError>;

    /// Fetch the bidding query token for an upcoming auction.
    async fn query_token(
        &self,
        format: AdFormat,
        request: PartnerRequest,
    ) -> Result<String, PartnerError>;

    /// COPPA child-directed tagging, applied SDK-wide.
    fn set_child_directed(&self, child_directed: bool);

    /// Construct a banner for `placement` and start loading it. Must be
    /// invoked on the platform execution context; the view is constructed
    /// there. Signals arrive on `observer`.
    fn load_banner(
        &self,
        placement: &str,
        size: PartnerBannerSize,
        request: PartnerRequest,
        observer: Arc<dyn BannerAdObserver>,
    ) -> Arc<dyn PartnerBannerAd>;

    /// Asynchronously load a full-screen ad for `placement`. The partner
    /// invokes `completion` once from its own queue.
    fn load_full_screen(
        &self,
        format: AdFormat,
        placement: &str,
        request: PartnerRequest,
        completion: FullScreenLoadCompletion,
    );
}
