//! Rockets climbing from the bottom edge and bursting into fading sparks.

mod fragment;
mod projectile;

pub use fragment::{Fragment, opacity_at};
pub use projectile::Projectile;

use super::{Effect, Stage};
use crate::config::FireworksConfig;
use crate::random::{rand_int, rand_range};
use crate::schedule::Interval;
use crossterm::event::{Event, KeyCode, MouseButton, MouseEvent, MouseEventKind};
use fastrand::Rng;

const AUTO_LAUNCH_MARGIN: f32 = 60.0; // Side margin for automatic launches
const KEY_LAUNCH_MARGIN: f32 = 100.0; // Side margin for SPACE launches
const CLICK_SPREAD: f32 = 30.0; // Spread of the extra rockets fired on a click

pub struct FireworksEffect {
    config: FireworksConfig,
    projectiles: Vec<Projectile>,
    fragments: Vec<Fragment>,
    frame_clock: Interval,
    launched: u64,
    exploded: u64,
}

impl FireworksEffect {
    pub fn new(config: FireworksConfig) -> Self {
        let frame_clock = Interval::new(1.0 / config.frames_per_second);
        Self {
            projectiles: Vec::with_capacity(config.max_projectiles),
            fragments: Vec::with_capacity(config.max_fragments),
            config,
            frame_clock,
            launched: 0,
            exploded: 0,
        }
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Total rockets launched and exploded since start.
    pub fn totals(&self) -> (u64, u64) {
        (self.launched, self.exploded)
    }

    /// Adds a rocket unless the live cap is reached.
    pub fn spawn_projectile(&mut self, x: Option<f32>, stage: &mut Stage) -> bool {
        if self.projectiles.len() >= self.config.max_projectiles {
            return false;
        }
        let rocket = Projectile::launch(x, &stage.viewport, &self.config, &mut stage.rng);
        self.projectiles.push(rocket);
        self.launched += 1;
        true
    }

    #[cfg(test)]
    pub(crate) fn push_projectile(&mut self, rocket: Projectile) -> bool {
        if self.projectiles.len() >= self.config.max_projectiles {
            return false;
        }
        self.projectiles.push(rocket);
        self.launched += 1;
        true
    }

    /// One animation frame: fade, maybe launch, then move, draw and cull
    /// rockets before sparks.
    pub fn step(&mut self, stage: &mut Stage) {
        // Translucent wash instead of a clear leaves motion trails
        stage.canvas.fade(self.config.trail_alpha);

        // Launch new rockets
        if stage.rng.f32() < self.config.spawn_probability {
            let w = stage.viewport.width;
            let x = rand_range(&mut stage.rng, AUTO_LAUNCH_MARGIN, w - AUTO_LAUNCH_MARGIN);
            self.spawn_projectile(Some(x), stage);
        }

        let Self {
            config,
            projectiles,
            fragments,
            exploded,
            ..
        } = self;
        let Stage {
            viewport,
            canvas,
            rng,
        } = stage;

        // Update rockets; bursting ones turn into sparks and are removed
        projectiles.retain_mut(|rocket| {
            rocket.advance(config.gravity);
            rocket.draw(canvas);

            if rocket.is_explosion_due(rng, config.premature_detonation) || rocket.has_left_viewport(viewport) {
                let count = explode(rocket, fragments, config, rng);
                *exploded += 1;
                log::debug!(
                    "Rocket burst at ({:.0}, {:.0}) after {} frames into {} sparks",
                    rocket.x,
                    rocket.y,
                    rocket.age,
                    count
                );
                false // Remove rocket
            } else {
                true // Keep rocket
            }
        });

        // Update sparks after every rocket has moved
        fragments.retain_mut(|spark| {
            spark.advance(config.fragment_friction, config.fragment_gravity);
            spark.draw(canvas);
            !(spark.is_expired() || spark.has_left_viewport(viewport))
        });
    }
}

/// Throws a batch of sparks from the rocket's position, stopping early at
/// the global spark cap. Returns how many were created.
fn explode(rocket: &Projectile, fragments: &mut Vec<Fragment>, config: &FireworksConfig, rng: &mut Rng) -> usize {
    let count = rand_int(rng, config.fragment_count_min as i32, config.fragment_count_max as i32).max(0) as usize;
    let mut created = 0;
    for _ in 0..count {
        // Global cap can cut a batch short
        if fragments.len() >= config.max_fragments {
            break;
        }
        fragments.push(Fragment::burst(rocket.x, rocket.y, rocket.hue, rng));
        created += 1;
    }
    created
}

impl Effect for FireworksEffect {
    fn update(&mut self, dt: f32, stage: &mut Stage) {
        for _ in 0..self.frame_clock.poll(dt) {
            self.step(stage);
        }
    }

    fn handle_event(&mut self, event: &Event, stage: &mut Stage) {
        match event {
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                ..
            }) => {
                let x = stage.viewport.column_to_x(*column);
                self.spawn_projectile(Some(x), stage);
                for _ in 0..2 {
                    let offset = rand_range(&mut stage.rng, -CLICK_SPREAD, CLICK_SPREAD);
                    self.spawn_projectile(Some(x + offset), stage);
                }
            }
            Event::Key(key) if key.code == KeyCode::Char(' ') => {
                let w = stage.viewport.width;
                let x = rand_range(&mut stage.rng, KEY_LAUNCH_MARGIN, w - KEY_LAUNCH_MARGIN);
                self.spawn_projectile(Some(x), stage);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Viewport;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use proptest::prelude::*;

    fn stage(seed: u64) -> Stage {
        Stage::new(Viewport::from_terminal(200, 50, 6.0), (0, 0, 0), Rng::with_seed(seed))
    }

    fn quiet_config() -> FireworksConfig {
        FireworksConfig {
            spawn_probability: 0.0,
            premature_detonation: 0.0,
            ..FireworksConfig::default()
        }
    }

    fn click(column: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row: 10,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_spawn_respects_cap() {
        let mut stage = stage(1);
        let mut fw = FireworksEffect::new(FireworksConfig {
            max_projectiles: 2,
            ..quiet_config()
        });
        assert!(fw.spawn_projectile(None, &mut stage));
        assert!(fw.spawn_projectile(None, &mut stage));
        assert!(!fw.spawn_projectile(None, &mut stage));
        assert_eq!(fw.projectiles().len(), 2);
        assert_eq!(fw.totals().0, 2);
    }

    #[test]
    fn test_burst_batch_within_bounds() {
        let mut stage = stage(5);
        let config = quiet_config();
        let mut fw = FireworksEffect::new(config.clone());
        // already at its burst altitude
        fw.push_projectile(Projectile::at(600.0, 300.0, 0.0, -2.0, 30.0, 400.0));
        fw.step(&mut stage);

        assert!(fw.projectiles().is_empty());
        let n = fw.fragments().len() as u32;
        assert!(n >= config.fragment_count_min && n <= config.fragment_count_max);
        assert_eq!(fw.totals(), (1, 1));
    }

    #[test]
    fn test_burst_stops_at_fragment_cap() {
        let mut stage = stage(9);
        let mut fw = FireworksEffect::new(FireworksConfig {
            max_fragments: 10,
            ..quiet_config()
        });
        fw.push_projectile(Projectile::at(600.0, 300.0, 0.0, 1.0, 30.0, 0.0));
        fw.push_projectile(Projectile::at(300.0, 300.0, 0.0, 1.0, 90.0, 0.0));
        fw.step(&mut stage);
        assert!(fw.projectiles().is_empty());
        assert_eq!(fw.fragments().len(), 10);
    }

    #[test]
    fn test_rocket_above_ceiling_bursts() {
        let mut stage = stage(2);
        let mut fw = FireworksEffect::new(quiet_config());
        fw.push_projectile(Projectile::at(600.0, 31.0, 0.0, -5.0, 0.0, -1000.0));
        fw.step(&mut stage);
        assert!(fw.projectiles().is_empty());
        assert!(!fw.fragments().is_empty());
    }

    #[test]
    fn test_click_launches_three() {
        let mut stage = stage(3);
        let mut fw = FireworksEffect::new(quiet_config());
        fw.handle_event(&click(100), &mut stage);
        let xs: Vec<f32> = fw.projectiles().iter().map(|p| p.x).collect();
        assert_eq!(xs.len(), 3);
        let center = stage.viewport.column_to_x(100);
        assert_eq!(xs[0], center);
        assert!(xs[1..].iter().all(|x| (x - center).abs() <= 30.0));
    }

    #[test]
    fn test_click_honours_cap() {
        let mut stage = stage(3);
        let mut fw = FireworksEffect::new(FireworksConfig {
            max_projectiles: 4,
            ..quiet_config()
        });
        fw.handle_event(&click(10), &mut stage);
        fw.handle_event(&click(20), &mut stage);
        assert_eq!(fw.projectiles().len(), 4);
    }

    #[test]
    fn test_space_launches_one() {
        let mut stage = stage(4);
        let mut fw = FireworksEffect::new(quiet_config());
        let space = Event::Key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        fw.handle_event(&space, &mut stage);
        assert_eq!(fw.projectiles().len(), 1);
        let x = fw.projectiles()[0].x;
        assert!(x >= 100.0 && x <= stage.viewport.width - 100.0);

        let other = Event::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        fw.handle_event(&other, &mut stage);
        assert_eq!(fw.projectiles().len(), 1);
    }

    #[test]
    fn test_update_steps_once_per_frame() {
        let mut stage = stage(6);
        let mut fw = FireworksEffect::new(quiet_config());
        fw.push_projectile(Projectile::at(600.0, 590.0, 0.0, -6.0, 0.0, 10.0));
        fw.update(1.0 / 60.0, &mut stage);
        assert_eq!(fw.projectiles()[0].age, 1);
        fw.update(0.001, &mut stage);
        assert_eq!(fw.projectiles()[0].age, 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn burst_size_within_bounds_or_cap(
            seed in any::<u64>(),
            count_min in 0u32..120,
            span in 0u32..80,
            max_fragments in 0usize..300,
            before in 0usize..300,
        ) {
            let config = FireworksConfig {
                fragment_count_min: count_min,
                fragment_count_max: count_min + span,
                max_fragments,
                ..quiet_config()
            };
            let mut rng = Rng::with_seed(seed);
            let mut fragments: Vec<Fragment> = (0..before)
                .map(|_| Fragment::burst(0.0, 0.0, 0.0, &mut rng))
                .collect();
            let rocket = Projectile::at(600.0, 300.0, 0.0, 1.0, 200.0, 0.0);

            let n = explode(&rocket, &mut fragments, &config, &mut rng);
            prop_assert_eq!(fragments.len(), before + n);
            prop_assert!(n as u32 <= config.fragment_count_max);
            if fragments.len() < max_fragments {
                prop_assert!(n as u32 >= config.fragment_count_min);
            } else {
                prop_assert!(n <= max_fragments.saturating_sub(before));
            }
        }

        #[test]
        fn every_removed_rocket_bursts_within_bounds(seed in any::<u64>(), exit in 0usize..4, max_fragments in 50usize..400) {
            let mut stage = stage(seed);
            let config = FireworksConfig {
                max_fragments,
                ..quiet_config()
            };
            let (min, max) = (config.fragment_count_min as usize, config.fragment_count_max as usize);
            let w = stage.viewport.width;
            let mut fw = FireworksEffect::new(config);

            // one rocket per removal reason: altitude, apex, ceiling, each side
            let rocket = match exit {
                0 => Projectile::at(600.0, 300.0, 0.0, -2.0, 200.0, 400.0),
                1 => Projectile::at(600.0, 300.0, 0.0, 1.0, 200.0, -1.0e6),
                2 => Projectile::at(600.0, 31.0, 0.0, -5.0, 200.0, -1.0e6),
                _ if seed % 2 == 0 => Projectile::at(-60.0, 300.0, 0.0, -5.0, 200.0, -1.0e6),
                _ => Projectile::at(w + 60.0, 300.0, 0.0, -5.0, 200.0, -1.0e6),
            };
            fw.push_projectile(rocket);
            fw.step(&mut stage);

            prop_assert!(fw.projectiles().is_empty());
            let n = fw.fragments().len();
            if n < max_fragments {
                prop_assert!(n >= min && n <= max);
            } else {
                prop_assert_eq!(n, max_fragments);
            }
        }

        #[test]
        fn live_counts_never_exceed_caps(seed in any::<u64>(), max_projectiles in 1usize..12, max_fragments in 0usize..400) {
            let mut stage = stage(seed);
            let mut fw = FireworksEffect::new(FireworksConfig {
                spawn_probability: 1.0,
                max_projectiles,
                max_fragments,
                ..FireworksConfig::default()
            });
            for frame in 0..300 {
                if frame % 7 == 0 {
                    fw.handle_event(&click((frame % 200) as u16), &mut stage);
                }
                fw.step(&mut stage);
                prop_assert!(fw.projectiles().len() <= max_projectiles);
                prop_assert!(fw.fragments().len() <= max_fragments);
            }
        }
    }
}
