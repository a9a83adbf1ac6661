//! Asset readiness gating
//!
//! The host loads images and sounds itself and reports each result here.
//! Gameplay may start once every registered asset has settled, or once the
//! wait exceeds [`ASSET_TIMEOUT_MS`]; anything still missing at that point is
//! replaced by a generated placeholder.

use std::collections::BTreeMap;

use crate::consts::ASSET_TIMEOUT_MS;

/// Load status of one asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStatus {
    Pending,
    Loaded,
    /// Failed or timed out; a generated stand-in is used
    Placeholder,
}

/// Tracks host-side asset loading
#[derive(Debug, Clone, Default)]
pub struct AssetTracker {
    assets: BTreeMap<String, AssetStatus>,
    /// Host timestamp of the first readiness query
    waiting_since: Option<f64>,
}

impl AssetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset the host has started loading
    pub fn register(&mut self, name: &str) {
        if self.pending() == 0 {
            // A fresh batch gets the full timeout
            self.waiting_since = None;
        }
        self.assets
            .entry(name.to_string())
            .or_insert(AssetStatus::Pending);
    }

    pub fn mark_loaded(&mut self, name: &str) {
        self.assets.insert(name.to_string(), AssetStatus::Loaded);
        log::debug!("Asset loaded: {}", name);
    }

    pub fn mark_failed(&mut self, name: &str) {
        log::warn!("Asset failed to load, using placeholder: {}", name);
        self.assets.insert(name.to_string(), AssetStatus::Placeholder);
    }

    pub fn status(&self, name: &str) -> Option<AssetStatus> {
        self.assets.get(name).copied()
    }

    pub fn pending(&self) -> usize {
        self.assets
            .values()
            .filter(|s| **s == AssetStatus::Pending)
            .count()
    }

    pub fn placeholders(&self) -> Vec<&str> {
        self.assets
            .iter()
            .filter(|(_, s)| **s == AssetStatus::Placeholder)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Whether gameplay may start at host time `now`.
    ///
    /// The timeout clock starts at the first call. When it runs out, every
    /// pending asset is downgraded to a placeholder and the answer is yes.
    pub fn poll(&mut self, now: f64) -> bool {
        if self.pending() == 0 {
            self.waiting_since = None;
            return true;
        }
        let since = *self.waiting_since.get_or_insert(now);
        if now - since < ASSET_TIMEOUT_MS {
            return false;
        }

        for (name, status) in self.assets.iter_mut() {
            if *status == AssetStatus::Pending {
                log::warn!("Asset timed out, using placeholder: {}", name);
                *status = AssetStatus::Placeholder;
            }
        }
        true
    }
}
