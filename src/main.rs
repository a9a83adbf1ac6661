//! Tap Siege headless runner
//!
//! Plays an autoplay session against the real engine and prints the final
//! session snapshot as JSON.
//!
//! Usage: `tap-siege [seed] [seconds] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::collections::BTreeMap;

    use tap_siege::audio::AudioCues;
    use tap_siege::consts::TICK_MS;
    use tap_siege::sim::BossKind;
    use tap_siege::{Engine, EngineError, GameCallbacks, Tuning};

    /// Counts cues so the report shows what the audio layer would have played
    #[derive(Default)]
    struct CueCounter {
        counts: std::rc::Rc<std::cell::RefCell<BTreeMap<String, u32>>>,
    }

    impl AudioCues for CueCounter {
        fn play(&mut self, cue: &str) {
            log::trace!("cue {}", cue);
            *self.counts.borrow_mut().entry(cue.to_string()).or_default() += 1;
        }
        fn start_music(&mut self) {
            log::debug!("music on");
        }
        fn stop_music(&mut self) {
            log::debug!("music off");
        }
        fn set_mute(&mut self, _muted: bool) {}
        fn set_volume(&mut self, _volume: f32) {}
        fn set_music_volume(&mut self, _volume: f32) {}
    }

    /// Logs host notifications
    struct ConsoleHost;

    impl GameCallbacks for ConsoleHost {
        fn on_game_over(&mut self) {
            log::info!("GAME OVER");
        }
        fn on_boss_appear(&mut self, kind: BossKind) {
            log::info!("Boss incoming: {}", kind.as_str());
        }
        fn on_difficulty_increase(&mut self, level: u32, monsters_per_wave: u32) {
            log::info!("Level {} ({} per wave)", level, monsters_per_wave);
        }
        fn on_special_ability_activated(&mut self, name: &str, duration_secs: f32) {
            log::info!("{} for {:.1}s", name, duration_secs);
        }
    }

    pub fn run() -> Result<(), EngineError> {
        let args: Vec<String> = std::env::args().collect();
        let seed = args
            .get(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0x5eed_u64);
        let seconds: f64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(120.0);
        let tuning = match args.get(3) {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(json) => Tuning::from_json(&json)?,
                Err(e) => {
                    log::warn!("Could not read {}: {}, using default tuning", path, e);
                    Tuning::default()
                }
            },
            None => Tuning::default(),
        };

        log::info!("Tap Siege (headless) seed={} duration={}s", seed, seconds);

        let counter = CueCounter::default();
        let counts = counter.counts.clone();
        let mut engine = Engine::new(tap_siege::Field::default(), tuning, seed);
        engine.set_audio(Box::new(counter));
        engine.set_callbacks(Box::new(ConsoleHost));
        engine.set_autoplay(true);
        engine.start();

        let frames = (seconds * 1000.0 / TICK_MS) as u64;
        for i in 0..=frames {
            if let Err(e) = engine.frame(i as f64 * TICK_MS) {
                log::warn!("Frame skipped: {}", e);
            }
            if engine.phase() == tap_siege::sim::SessionPhase::GameOver {
                break;
            }
        }

        let snapshot = engine.snapshot();
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).unwrap_or_default()
        );
        println!("best score: {}", engine.high_score().best.max(snapshot.score));
        for (cue, count) in counts.borrow().iter() {
            println!("  {:<14} {}", cue, count);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = headless::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by a web host; there is no native entry point here
}
