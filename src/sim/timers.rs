//! Expiring modifier table and delayed effect schedule
//!
//! Both are keyed on the session clock, which only advances while the session
//! runs. Pausing therefore freezes every pending expiry and restarting drops
//! the whole table with the session.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Timed gameplay modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Modifier {
    TimeFrozen,
    ShieldActive,
    SlowdownActive,
    PointsMultiplierActive,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::TimeFrozen => "timeFrozen",
            Modifier::ShieldActive => "shieldActive",
            Modifier::SlowdownActive => "slowdownActive",
            Modifier::PointsMultiplierActive => "pointsMultiplierActive",
        }
    }
}

/// Modifier name -> expiry timestamp (session ms)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Modifiers {
    expiries: BTreeMap<Modifier, f64>,
}

impl Modifiers {
    /// Activate (or refresh) a modifier until `now + duration_ms`
    pub fn activate(&mut self, modifier: Modifier, now: f64, duration_ms: f64) -> f64 {
        let expiry = now + duration_ms;
        self.expiries.insert(modifier, expiry);
        expiry
    }

    pub fn is_active(&self, modifier: Modifier, now: f64) -> bool {
        self.expiries
            .get(&modifier)
            .is_some_and(|&expiry| now < expiry)
    }

    pub fn expires_at(&self, modifier: Modifier) -> Option<f64> {
        self.expiries.get(&modifier).copied()
    }

    /// Remove and return every modifier whose expiry has passed
    pub fn expire_due(&mut self, now: f64) -> Vec<Modifier> {
        let due: Vec<Modifier> = self
            .expiries
            .iter()
            .filter(|&(_, &expiry)| expiry <= now)
            .map(|(&m, _)| m)
            .collect();
        for m in &due {
            self.expiries.remove(m);
        }
        due
    }

    /// Currently active modifiers in stable order
    pub fn active(&self, now: f64) -> Vec<Modifier> {
        self.expiries
            .iter()
            .filter(|&(_, &expiry)| now < expiry)
            .map(|(&m, _)| m)
            .collect()
    }

    pub fn clear(&mut self) {
        self.expiries.clear();
    }
}

/// Effects that fire some time after the event that caused them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DelayedEffect {
    /// One burst of a boss defeat explosion sequence
    DefeatBurst {
        pos: Vec2,
        color: u32,
        count: u32,
        enhanced: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEffect {
    pub due_at: f64,
    pub effect: DelayedEffect,
}

/// Pending delayed effects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    entries: Vec<ScheduledEffect>,
}

impl Schedule {
    pub fn schedule(&mut self, due_at: f64, effect: DelayedEffect) {
        self.entries.push(ScheduledEffect { due_at, effect });
    }

    /// Remove and return all effects due at `now`, earliest first
    pub fn take_due(&mut self, now: f64) -> Vec<DelayedEffect> {
        let mut due: Vec<ScheduledEffect> = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].due_at <= now {
                due.push(self.entries.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due_at.total_cmp(&b.due_at));
        due.into_iter().map(|s| s.effect).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
