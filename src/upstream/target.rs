//! Upstream base address with one-shot correction.
//!
//! # Responsibilities
//! - Hold the process-wide base URL forwarding starts from
//! - Hold the immutable fallback URL correction switches to
//! - Apply the correction at most once, atomically
//!
//! # Design Decisions
//! - The corrected value is computed as a pure decision (current base vs.
//!   fallback) and installed via ArcSwap; racing readers observe either the
//!   old or the new base, never a torn value
//! - Once the base equals the fallback there is nothing left to correct, so
//!   the swap can happen at most once per process

use std::sync::Arc;

use arc_swap::ArcSwap;
use url::Url;

use crate::config::UpstreamConfig;

pub struct UpstreamTarget {
    base: ArcSwap<Url>,
    fallback: Arc<Url>,
}

impl UpstreamTarget {
    pub fn new(base: Url, fallback: Url) -> Self {
        Self {
            base: ArcSwap::from_pointee(base),
            fallback: Arc::new(fallback),
        }
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, url::ParseError> {
        Ok(Self::new(
            Url::parse(&config.base_url)?,
            Url::parse(&config.fallback_url)?,
        ))
    }

    /// The base URL forwarding should start from right now.
    pub fn base(&self) -> Arc<Url> {
        self.base.load_full()
    }

    /// Decide the corrected base for an attempt that used `attempted`.
    ///
    /// Pure: returns the fallback when `attempted` was something else, and
    /// `None` when the fallback itself just failed (nothing left to try).
    pub fn correction_for(attempted: &Url, fallback: &Url) -> Option<Url> {
        if attempted == fallback {
            None
        } else {
            Some(fallback.clone())
        }
    }

    /// Permanently install the correction for a failed attempt against
    /// `attempted`. Returns the base to retry with, or `None` when the
    /// failure is final.
    pub fn correct(&self, attempted: &Url) -> Option<Arc<Url>> {
        Self::correction_for(attempted, &self.fallback)?;
        self.base.store(self.fallback.clone());
        Some(self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> UpstreamTarget {
        UpstreamTarget::new(
            Url::parse("http://10.1.2.3:9999/api").unwrap(),
            Url::parse("http://127.0.0.1:5000/api").unwrap(),
        )
    }

    #[test]
    fn correction_switches_to_fallback_once() {
        let target = target();
        let first_base = target.base();

        let corrected = target.correct(&first_base).expect("first failure corrects");
        assert_eq!(corrected.as_str(), "http://127.0.0.1:5000/api");
        assert_eq!(target.base().as_str(), "http://127.0.0.1:5000/api");

        // The corrected base failing again is final.
        assert!(target.correct(&target.base()).is_none());
    }

    #[test]
    fn no_correction_when_already_on_fallback() {
        let fallback = Url::parse("http://127.0.0.1:5000/api").unwrap();
        let target = UpstreamTarget::new(fallback.clone(), fallback.clone());
        assert!(target.correct(&target.base()).is_none());
    }

    #[test]
    fn correction_decision_is_pure() {
        let fallback = Url::parse("http://127.0.0.1:5000/api").unwrap();
        let other = Url::parse("http://10.0.0.1:5000/api").unwrap();

        assert_eq!(
            UpstreamTarget::correction_for(&other, &fallback),
            Some(fallback.clone())
        );
        assert_eq!(UpstreamTarget::correction_for(&fallback, &fallback), None);
    }

    #[test]
    fn stale_reader_correction_is_idempotent() {
        // Two requests that both started on the old base may both report
        // failure; the second correction is a no-op swap to the same value.
        let target = target();
        let old = target.base();

        assert!(target.correct(&old).is_some());
        assert!(target.correct(&old).is_some());
        assert_eq!(target.base().as_str(), "http://127.0.0.1:5000/api");
    }
}
