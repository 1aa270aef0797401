//! Dish Dash headless runner
//!
//! Plays a seeded session at the fixed timestep with a built-in autoplay bot
//! and logs the event stream. Useful for balance checks without a renderer.
//!
//! Usage: `dish-dash [seed] [seconds] [tuning.json|-] [ignore|reset]`

use dish_dash::consts::*;
use dish_dash::sim::{GameEvent, GameSession};
use dish_dash::tuning::{MistakePolicy, Tuning};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Autoplay bot: presses the next correct direction after a reaction delay,
/// with an occasional fumble
struct Bot {
    rng: Pcg32,
    cooldown: f32,
    /// Seconds between presses
    reaction: f32,
    /// Chance of a wrong press (0-1)
    fumble_rate: f32,
}

impl Bot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
            cooldown: 0.0,
            reaction: 0.3,
            fumble_rate: 0.08,
        }
    }

    fn update(&mut self, session: &mut GameSession, dt: f32) -> Vec<GameEvent> {
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return Vec::new();
        }

        let next = session
            .stack()
            .dishes()
            .first()
            .filter(|d| d.is_active())
            .and_then(|d| d.sequence().get(d.progress()).copied());
        let Some(dir) = next else {
            return Vec::new();
        };

        self.cooldown = self.reaction * self.rng.random_range(0.7f32..1.3);
        if self.rng.random_bool(self.fumble_rate as f64) {
            // Any other code is a fumble
            let wrong = (dir.code() + self.rng.random_range(1..4)) % 4;
            session.handle_code(wrong)
        } else {
            session.handle_input(dir)
        }
    }
}

/// Game instance holding all state
struct Game {
    session: GameSession,
    bot: Bot,
    accumulator: f32,
    // Track level for HUD logging
    last_level: u32,
}

impl Game {
    fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            session: GameSession::new(tuning, seed),
            bot: Bot::new(seed),
            accumulator: 0.0,
            last_level: 0,
        }
    }

    /// Run simulation ticks for one frame
    fn update(&mut self, frame_dt: f32) {
        let dt = frame_dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let mut events = self.session.tick(SIM_DT);
            events.extend(self.bot.update(&mut self.session, SIM_DT));
            for event in &events {
                self.log_event(event);
            }
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        let level = self.session.difficulty().level();
        if level != self.last_level {
            self.last_level = level;
            self.update_hud();
        }
    }

    fn log_event(&self, event: &GameEvent) {
        match event {
            GameEvent::Washed { .. } | GameEvent::Lost { .. } => self.update_hud(),
            GameEvent::Mistake { id, progress_reset } => {
                log::debug!("Fumble on {:?} (progress reset: {})", id, progress_reset)
            }
            other => log::trace!("{:?}", other),
        }
    }

    fn update_hud(&self) {
        let snap = self.session.snapshot();
        log::info!(
            "{} | {} | {}",
            snap.washed_label(),
            snap.dishes_label(),
            snap.difficulty_label(self.session.tuning().max_display_difficulty)
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(120.0);
    let mut tuning = match args.next() {
        Some(path) if path != "-" => Tuning::load(path),
        _ => Tuning::default(),
    };
    if let Some(arg) = args.next() {
        match MistakePolicy::from_str(&arg) {
            Some(policy) => tuning.mistake_policy = policy,
            None => log::warn!(
                "Unknown mistake policy '{}', keeping {}",
                arg,
                tuning.mistake_policy.as_str()
            ),
        }
    }
    log::info!("Mistake policy: {}", tuning.mistake_policy.as_str());
    match tuning.to_json() {
        Ok(json) => log::debug!("Tuning:\n{}", json),
        Err(e) => log::warn!("Could not serialize tuning: {}", e),
    }

    log::info!("Dish Dash (headless) starting, seed {}, {}s", seed, seconds);
    let mut game = Game::new(tuning, seed);

    // Frames at 60 Hz
    let frames = (seconds / SIM_DT) as u32;
    for _ in 0..frames {
        game.update(SIM_DT);
        if game.session.is_over() {
            break;
        }
    }

    let snap = game.session.snapshot();
    match serde_json::to_string_pretty(&snap) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Could not serialize snapshot: {}", e),
    }
    println!(
        "\nDishes washed: {} in {:.1}s{}",
        snap.washed_count,
        game.session.elapsed(),
        if snap.is_over { " (game over)" } else { "" }
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web
}
