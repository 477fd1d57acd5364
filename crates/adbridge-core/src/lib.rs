//! Mediation adapter core.
//!
//! Binds the mediation SDK's plugin contract to a partner ad-serving SDK:
//! single-use ad sessions are driven through load and show, and the
//! partner's asynchronous callbacks are converted into a uniform,
//! single-fire result contract.

pub mod adapter;
pub mod bridge;
pub mod error;
pub mod extras;
pub mod format;
pub mod partner;
pub mod request;
pub mod session;
pub mod translate;
