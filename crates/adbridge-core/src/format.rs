//! Ad formats and banner sizing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AdapterError;

/// Ad formats served by this adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdFormat {
    Banner,
    Interstitial,
    Rewarded,
    RewardedInterstitial,
}

impl AdFormat {
    /// Mediation-config identifier for this format.
    pub fn identifier(self) -> &'static str {
        match self {
            AdFormat::Banner => "banner",
            AdFormat::Interstitial => "interstitial",
            AdFormat::Rewarded => "rewarded",
            AdFormat::RewardedInterstitial => "rewarded_interstitial",
        }
    }

    /// Whether the format presents full screen via an explicit show step.
    /// Banners render as a side effect of loading.
    pub fn is_full_screen(self) -> bool {
        !matches!(self, AdFormat::Banner)
    }
}

impl fmt::Display for AdFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for AdFormat {
    type Err = AdapterError;

    /// Parse a mediation-config format identifier. Placements are
    /// configured server-side, so an identifier outside the closed set is
    /// a runtime condition, not a programming error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "banner" => Ok(AdFormat::Banner),
            "interstitial" => Ok(AdFormat::Interstitial),
            "rewarded" => Ok(AdFormat::Rewarded),
            "rewarded_interstitial" => Ok(AdFormat::RewardedInterstitial),
            other => Err(AdapterError::UnsupportedAdFormat(other.to_string())),
        }
    }
}

/// Requested banner dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BannerSize {
    /// A fixed slot from the partner's supported size set.
    Fixed { width: u32, height: u32 },
    /// Full available width with a capped height; the partner resolves the
    /// final dimensions at load time.
    Adaptive { width: u32, max_height: u32 },
}

/// Banner size expressed in the partner SDK's terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnerBannerSize {
    Standard { width: u32, height: u32 },
    Adaptive { width: u32, max_height: u32 },
}

/// Fixed banner slots the partner accepts.
pub fn is_supported_fixed_size(width: u32, height: u32) -> bool {
    matches!((width, height), (320, 50) | (300, 250) | (728, 90))
}

/// Map a requested banner size onto the partner's size set.
pub fn partner_banner_size(size: BannerSize) -> Result<PartnerBannerSize, AdapterError> {
    match size {
        BannerSize::Fixed { width, height } if is_supported_fixed_size(width, height) => {
            Ok(PartnerBannerSize::Standard { width, height })
        }
        BannerSize::Fixed { .. } => Err(AdapterError::InvalidBannerSize),
        BannerSize::Adaptive { width, max_height } => {
            Ok(PartnerBannerSize::Adaptive { width, max_height })
        }
    }
}

/// Size reported back by the partner for a loaded banner.
///
/// Fluid rendering means the partner sized the view itself; the dimensions
/// are the view's intrinsic content size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartnerReportedSize {
    pub width: f64,
    pub height: f64,
    pub fluid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeKind {
    Fixed,
    Adaptive,
}

impl SizeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SizeKind::Fixed => "fixed",
            SizeKind::Adaptive => "adaptive",
        }
    }
}

/// The size the partner actually resolved for a loaded banner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedAdSize {
    pub kind: SizeKind,
    pub width: f64,
    pub height: f64,
}

impl From<PartnerReportedSize> for ResolvedAdSize {
    fn from(reported: PartnerReportedSize) -> Self {
        ResolvedAdSize {
            kind: if reported.fluid {
                SizeKind::Adaptive
            } else {
                SizeKind::Fixed
            },
            width: reported.width,
            height: reported.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_identifier_round_trip() {
        for format in [
            AdFormat::Banner,
            AdFormat::Interstitial,
            AdFormat::Rewarded,
            AdFormat::RewardedInterstitial,
        ] {
            assert_eq!(format.identifier().parse::<AdFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_unknown_format_identifier_is_unsupported() {
        let err = "native".parse::<AdFormat>().unwrap_err();
        assert!(matches!(err, AdapterError::UnsupportedAdFormat(name) if name == "native"));
    }

    #[test]
    fn test_only_banner_is_not_full_screen() {
        assert!(!AdFormat::Banner.is_full_screen());
        assert!(AdFormat::Interstitial.is_full_screen());
        assert!(AdFormat::Rewarded.is_full_screen());
        assert!(AdFormat::RewardedInterstitial.is_full_screen());
    }

    #[test]
    fn test_supported_fixed_sizes() {
        assert!(is_supported_fixed_size(320, 50));
        assert!(is_supported_fixed_size(300, 250));
        assert!(is_supported_fixed_size(728, 90));
        assert!(!is_supported_fixed_size(300, 251));
        assert!(!is_supported_fixed_size(0, 0));
    }

    #[test]
    fn test_partner_banner_size_rejects_nonstandard_fixed() {
        let size = BannerSize::Fixed {
            width: 333,
            height: 222,
        };
        assert!(matches!(
            partner_banner_size(size),
            Err(AdapterError::InvalidBannerSize)
        ));
    }

    #[test]
    fn test_partner_banner_size_passes_adaptive_through() {
        let size = BannerSize::Adaptive {
            width: 360,
            max_height: 100,
        };
        assert_eq!(
            partner_banner_size(size).unwrap(),
            PartnerBannerSize::Adaptive {
                width: 360,
                max_height: 100
            }
        );
    }

    #[test]
    fn test_fluid_reported_size_resolves_adaptive() {
        let resolved = ResolvedAdSize::from(PartnerReportedSize {
            width: 360.0,
            height: 212.5,
            fluid: true,
        });
        assert_eq!(resolved.kind, SizeKind::Adaptive);
        assert_eq!(resolved.width, 360.0);
        assert_eq!(resolved.height, 212.5);
    }
}
