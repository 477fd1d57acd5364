//! Single-ad lifecycle sessions.
//!
//! One session is created per load call and never reused. A session drives
//! one ad through load and, for full-screen formats, show, converting the
//! partner SDK's callbacks into the mediation contract's single-fire
//! completions and delegate events.

use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::bridge::{AdDetails, CompletionSlot, Completion, DelegateHandle};
use crate::error::{AdapterError, PartnerError};
use crate::extras::SharedExtras;
use crate::format::{self, AdFormat, PartnerReportedSize, ResolvedAdSize};
use crate::partner::{
    BannerAdObserver, FullScreenAdObserver, PartnerBannerAd, PartnerFullScreenAd, PartnerReward,
    PartnerSdk, PresentationContext,
};
use crate::request::AdLoadRequest;
use crate::translate;

/// Lifecycle states of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Loading,
    Loaded,
    LoadFailed,
    Showing,
    Shown,
    ShowFailed,
    Dismissed,
    Invalidated,
}

/// The live partner object backing a loaded session.
enum PartnerHandle {
    /// Held to keep the partner's view alive; banners render on load.
    Banner { _view: Arc<dyn PartnerBannerAd> },
    FullScreen(Arc<dyn PartnerFullScreenAd>),
}

/// A single ad request/response cycle.
///
/// The caller disposes of a session by calling [`AdSession::invalidate`],
/// which is safe in any state.
pub struct AdSession {
    this: Weak<AdSession>,
    request: AdLoadRequest,
    sdk: Arc<dyn PartnerSdk>,
    shared_extras: SharedExtras,
    delegate: DelegateHandle,
    state: Mutex<SessionState>,
    load_completion: CompletionSlot,
    show_completion: CompletionSlot,
    partner_ad: Mutex<Option<PartnerHandle>>,
    resolved_size: Mutex<Option<ResolvedAdSize>>,
}

impl AdSession {
    pub(crate) fn new(
        request: AdLoadRequest,
        sdk: Arc<dyn PartnerSdk>,
        shared_extras: SharedExtras,
        delegate: DelegateHandle,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| AdSession {
            this: this.clone(),
            request,
            sdk,
            shared_extras,
            delegate,
            state: Mutex::new(SessionState::Created),
            load_completion: CompletionSlot::new(),
            show_completion: CompletionSlot::new(),
            partner_ad: Mutex::new(None),
            resolved_size: Mutex::new(None),
        })
    }

    /// The request this session was created for.
    pub fn request(&self) -> &AdLoadRequest {
        &self.request
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Size the partner resolved for a loaded banner, if any.
    pub fn resolved_size(&self) -> Option<ResolvedAdSize> {
        *self.resolved_size.lock()
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.lock();
        log::debug!(
            "session {}: {:?} -> {:?}",
            self.request.identifier,
            *state,
            next
        );
        *state = next;
    }

    /// Start loading the ad. The result is reported through `completion`
    /// exactly once, no matter how often the partner signals.
    ///
    /// Banner formats require a presentation context and are marshaled onto
    /// its execution context, since the partner constructs the view there.
    /// Full-screen formats issue the partner call on the caller's thread;
    /// the partner SDK enforces its own threading internally.
    pub fn load(&self, context: Option<Arc<dyn PresentationContext>>, completion: Completion) {
        log::info!(
            "load started placement={} format={}",
            self.request.placement,
            self.request.format
        );
        self.set_state(SessionState::Loading);
        self.load_completion.store(completion);

        match self.request.format {
            AdFormat::Banner => self.load_banner(context),
            AdFormat::Interstitial | AdFormat::Rewarded | AdFormat::RewardedInterstitial => {
                self.load_full_screen()
            }
        }
    }

    fn load_banner(&self, context: Option<Arc<dyn PresentationContext>>) {
        // Banners render as a side effect of loading, so the host surface
        // must exist up front.
        let Some(context) = context else {
            self.fail_load(AdapterError::MissingPresentationContext);
            return;
        };
        if self.request.adm.as_deref().map_or(true, str::is_empty) {
            self.fail_load(AdapterError::InvalidAdMarkup);
            return;
        }
        let size = match self.request.size {
            Some(size) => match format::partner_banner_size(size) {
                Ok(size) => size,
                Err(err) => {
                    self.fail_load(err);
                    return;
                }
            },
            None => {
                self.fail_load(AdapterError::InvalidBannerSize);
                return;
            }
        };

        let partner_request = self.request.build_partner_request(&self.shared_extras);
        let placement = self.request.placement.clone();
        let this = self.this.clone();
        context.dispatch(Box::new(move || {
            let Some(session) = this.upgrade() else {
                return;
            };
            let observer: Arc<dyn BannerAdObserver> = session.clone();
            let view = session
                .sdk
                .load_banner(&placement, size, partner_request, observer);
            *session.partner_ad.lock() = Some(PartnerHandle::Banner { _view: view });
        }));
    }

    fn load_full_screen(&self) {
        if self.request.adm.as_deref().map_or(true, str::is_empty) {
            self.fail_load(AdapterError::InvalidAdMarkup);
            return;
        }

        let partner_request = self.request.build_partner_request(&self.shared_extras);
        let this = self.this.clone();
        self.sdk.load_full_screen(
            self.request.format,
            &self.request.placement,
            partner_request,
            Box::new(move |result| {
                let Some(session) = this.upgrade() else {
                    log::debug!("partner load signal after session release was dropped");
                    return;
                };
                match result {
                    Ok(ad) => session.finish_full_screen_load(ad),
                    Err(err) => session.fail_load(translate::load_error(err)),
                }
            }),
        );
    }

    /// Present a loaded full-screen ad. The result is reported through
    /// `completion` exactly once. Banners render on load; calling `show` on
    /// a banner session does nothing.
    pub fn show(&self, context: Arc<dyn PresentationContext>, completion: Completion) {
        if self.request.format == AdFormat::Banner {
            log::warn!(
                "show is a no-op for banner sessions (placement={})",
                self.request.placement
            );
            return;
        }
        log::info!("show started placement={}", self.request.placement);
        self.show_completion.store(completion);

        let ad = if self.state() == SessionState::Loaded {
            match &*self.partner_ad.lock() {
                Some(PartnerHandle::FullScreen(ad)) => Some(Arc::clone(ad)),
                _ => None,
            }
        } else {
            None
        };
        let Some(ad) = ad else {
            log::error!(
                "show failed placement={}: no loaded ad",
                self.request.placement
            );
            self.show_completion.fire(Err(AdapterError::AdNotReady));
            return;
        };

        self.set_state(SessionState::Showing);
        let this = self.this.clone();
        let present_context = Arc::clone(&context);
        context.dispatch(Box::new(move || {
            let Some(session) = this.upgrade() else {
                return;
            };
            let observer: Arc<dyn FullScreenAdObserver> = session;
            ad.present(present_context, observer);
        }));
    }

    /// Release the partner ad and drop any pending completions without
    /// firing them. Safe to call from any state; idempotent.
    pub fn invalidate(&self) {
        self.set_state(SessionState::Invalidated);
        *self.partner_ad.lock() = None;
        if self.load_completion.clear() {
            log::debug!(
                "pending load completion dropped on invalidate (placement={})",
                self.request.placement
            );
        }
        if self.show_completion.clear() {
            log::debug!(
                "pending show completion dropped on invalidate (placement={})",
                self.request.placement
            );
        }
    }

    fn finish_load(&self, details: AdDetails) {
        log::info!("load succeeded placement={}", self.request.placement);
        self.set_state(SessionState::Loaded);
        if !self.load_completion.fire(Ok(details)) {
            log::warn!(
                "load result ignored placement={}: completion already consumed",
                self.request.placement
            );
        }
    }

    fn fail_load(&self, error: AdapterError) {
        log::error!("load failed placement={}: {}", self.request.placement, error);
        self.set_state(SessionState::LoadFailed);
        if !self.load_completion.fire(Err(error)) {
            log::warn!(
                "load result ignored placement={}: completion already consumed",
                self.request.placement
            );
        }
    }

    fn finish_full_screen_load(&self, ad: Arc<dyn PartnerFullScreenAd>) {
        if self.state() == SessionState::Invalidated {
            log::debug!("partner load signal after invalidate was dropped");
            return;
        }
        *self.partner_ad.lock() = Some(PartnerHandle::FullScreen(ad));
        self.finish_load(AdDetails::new());
    }

    fn fail_show(&self, error: AdapterError) {
        log::error!("show failed placement={}: {}", self.request.placement, error);
        self.set_state(SessionState::ShowFailed);
        if !self.show_completion.fire(Err(error)) {
            log::warn!(
                "show result ignored placement={}: completion already consumed",
                self.request.placement
            );
        }
    }
}

impl fmt::Debug for AdSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdSession")
            .field("identifier", &self.request.identifier)
            .field("placement", &self.request.placement)
            .field("format", &self.request.format)
            .field("state", &self.state())
            .finish()
    }
}

impl BannerAdObserver for AdSession {
    fn did_receive(&self, size: PartnerReportedSize) {
        if self.state() == SessionState::Invalidated {
            log::debug!("banner receipt after invalidate was dropped");
            return;
        }
        let resolved = ResolvedAdSize::from(size);
        *self.resolved_size.lock() = Some(resolved);

        let mut details = AdDetails::new();
        details.insert("banner_width".to_string(), Value::from(resolved.width));
        details.insert("banner_height".to_string(), Value::from(resolved.height));
        details.insert(
            "banner_size_type".to_string(),
            Value::from(resolved.kind.as_str()),
        );
        self.finish_load(details);
    }

    fn did_fail(&self, error: PartnerError) {
        self.fail_load(translate::load_error(error));
    }

    fn did_record_impression(&self) {
        self.delegate
            .notify("impression", |d| d.did_track_impression(&AdDetails::new()));
    }

    fn did_record_click(&self) {
        self.delegate
            .notify("click", |d| d.did_click(&AdDetails::new()));
    }
}

impl FullScreenAdObserver for AdSession {
    fn will_present(&self) {
        log::info!("show succeeded placement={}", self.request.placement);
        self.set_state(SessionState::Shown);
        if !self.show_completion.fire(Ok(AdDetails::new())) {
            log::warn!(
                "show result ignored placement={}: completion already consumed",
                self.request.placement
            );
        }
    }

    fn did_fail_to_present(&self, error: PartnerError) {
        self.fail_show(translate::show_error(error));
    }

    fn did_record_impression(&self) {
        self.delegate
            .notify("impression", |d| d.did_track_impression(&AdDetails::new()));
    }

    fn did_record_click(&self) {
        self.delegate
            .notify("click", |d| d.did_click(&AdDetails::new()));
    }

    fn did_earn_reward(&self, reward: PartnerReward) {
        log::info!("reward earned placement={}", self.request.placement);
        let mut details = AdDetails::new();
        details.insert("reward_amount".to_string(), Value::from(reward.amount));
        details.insert("reward_type".to_string(), Value::from(reward.kind));
        self.delegate.notify("reward", |d| d.did_reward(&details));
    }

    fn did_dismiss(&self) {
        log::info!("ad dismissed placement={}", self.request.placement);
        // Dismissal is terminal: the partner ad is spent, so the handle is
        // released and any further show fails as not ready.
        self.set_state(SessionState::Dismissed);
        *self.partner_ad.lock() = None;
        self.delegate
            .notify("dismiss", |d| d.did_dismiss(&AdDetails::new(), None));
    }
}
