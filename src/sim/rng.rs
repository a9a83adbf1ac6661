//! Injectable random source
//!
//! Every random branch in the simulation (monster kind, spawn position,
//! attack pattern, bonus drop) draws from a `RandomSource`, so tests can force
//! exact outcomes and a seeded run is reproducible.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Uniform `[0, 1)` generator
pub trait RandomSource {
    fn next_f32(&mut self) -> f32;

    /// Uniform integer in `0..n` (0 when `n == 0`)
    fn next_index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ((self.next_f32() * n as f32) as usize).min(n - 1)
    }

    /// `min + floor(r * spread)`
    fn next_spread(&mut self, min: u32, spread: u32) -> u32 {
        min + (self.next_f32() * spread as f32).floor() as u32
    }
}

/// Seeded PCG generator used for real sessions
#[derive(Debug, Clone)]
pub struct PcgRandom {
    rng: Pcg32,
}

impl PcgRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl RandomSource for PcgRandom {
    fn next_f32(&mut self) -> f32 {
        self.rng.random::<f32>()
    }
}

/// Replays a fixed list of values, then repeats `fallback` forever
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: VecDeque<f32>,
    fallback: f32,
}

impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = f32>) -> Self {
        Self {
            values: values.into_iter().collect(),
            fallback: 0.5,
        }
    }

    /// Value returned once the script runs out
    pub fn with_fallback(mut self, fallback: f32) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f32(&mut self) -> f32 {
        self.values.pop_front().unwrap_or(self.fallback)
    }
}
