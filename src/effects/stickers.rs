//! Decorations drifting down over the show: lucky envelopes, banknotes and
//! apricot blossoms.

use super::{Effect, Stage};
use crate::canvas::{Color, Frame, Viewport};
use crate::config::StickerConfig;
use crate::random::rand_range;
use crate::schedule::Interval;
use fastrand::Rng;

/// Logical y where new stickers appear, just above the top edge.
const SPAWN_Y: f32 = -50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickerKind {
    LuckyEnvelope,
    Banknote,
    ApricotBlossom,
}

impl StickerKind {
    pub const ALL: [StickerKind; 3] = [
        StickerKind::LuckyEnvelope,
        StickerKind::Banknote,
        StickerKind::ApricotBlossom,
    ];

    pub fn random(rng: &mut Rng) -> Self {
        Self::ALL[rng.usize(0..Self::ALL.len())]
    }

    /// Asset name
    pub fn name(&self) -> &'static str {
        match self {
            StickerKind::LuckyEnvelope => "lixi",
            StickerKind::Banknote => "tien",
            StickerKind::ApricotBlossom => "hoamai",
        }
    }

    fn sprite(&self) -> &'static [&'static str] {
        match self {
            StickerKind::LuckyEnvelope => &[
                "RRRR",
                "RGGR",
                "RRRR",
                "RRGR",
                "RRRR",
                "RRRR",
            ],
            StickerKind::Banknote => &[
                "NNNNNNN",
                "NnnYnnN",
                "NnYYYnN",
                "NNNNNNN",
            ],
            StickerKind::ApricotBlossom => &[
                ".P.P.",
                "PPPPP",
                ".PCP.",
                "PPPPP",
                ".P.P.",
            ],
        }
    }
}

fn sprite_color(ch: char) -> Option<Color> {
    match ch {
        'R' => Some((200, 24, 32)),
        'G' => Some((255, 200, 40)),
        'N' => Some((40, 140, 70)),
        'n' => Some((90, 190, 110)),
        'Y' => Some((240, 230, 150)),
        'P' => Some((255, 214, 0)),
        'C' => Some((230, 120, 20)),
        _ => None,
    }
}

/// One falling sticker with its own movement timer.
#[derive(Debug, Clone)]
pub struct Sticker {
    pub kind: StickerKind,
    pub x: f32,
    pub y: f32,
    tick: Interval,
}

impl Sticker {
    pub fn new(kind: StickerKind, x: f32, tick_ms: f32) -> Self {
        Self {
            kind,
            x,
            y: SPAWN_Y,
            tick: Interval::from_millis(tick_ms),
        }
    }

    /// Moves down once per elapsed tick. Returns `false` once the sticker
    /// has dropped past the bottom edge; its timer is cancelled then.
    pub fn advance(&mut self, dt: f32, viewport: &Viewport, config: &StickerConfig, rng: &mut Rng) -> bool {
        for _ in 0..self.tick.poll(dt) {
            self.y += rand_range(rng, config.speed_min, config.speed_max);
            if self.y > viewport.height {
                self.tick.cancel();
                break;
            }
        }
        !self.tick.is_cancelled()
    }
}

pub struct StickerOverlay {
    config: StickerConfig,
    spawner: Interval,
    stickers: Vec<Sticker>,
}

impl StickerOverlay {
    /// The spawn period is drawn once and then kept for the whole run.
    pub fn new(config: StickerConfig, rng: &mut Rng) -> Self {
        let period_ms = rand_range(rng, config.spawn_period_min_ms, config.spawn_period_max_ms);
        log::debug!("Spawning a sticker every {period_ms:.0} ms");
        Self {
            config,
            spawner: Interval::from_millis(period_ms),
            stickers: Vec::new(),
        }
    }

    pub fn spawn_period(&self) -> f32 {
        self.spawner.period()
    }

    pub fn stickers(&self) -> &[Sticker] {
        &self.stickers
    }

    pub fn spawn(&mut self, stage: &mut Stage) {
        let kind = StickerKind::random(&mut stage.rng);
        let x = stage.rng.f32() * stage.viewport.width;
        log::trace!("Sticker {} dropped at x={x:.0}", kind.name());
        self.stickers.push(Sticker::new(kind, x, self.config.tick_ms));
    }
}

impl Effect for StickerOverlay {
    fn update(&mut self, dt: f32, stage: &mut Stage) {
        for _ in 0..self.spawner.poll(dt) {
            self.spawn(stage);
        }

        let Stage { viewport, rng, .. } = stage;
        let config = &self.config;
        self.stickers.retain_mut(|sticker| {
            let alive = sticker.advance(dt, viewport, config, rng);
            if !alive {
                log::trace!("Sticker {} left the screen", sticker.kind.name());
            }
            alive
        });
    }

    fn overlay(&self, frame: &mut Frame, _viewport: &Viewport) {
        for sticker in &self.stickers {
            frame.blit_sprite(sticker.x, sticker.y, sticker.kind.sprite(), sprite_color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::from_terminal(80, 25, 6.0)
    }

    #[test]
    fn test_sticker_falls_out_and_cancels() {
        let vp = viewport();
        let config = StickerConfig::default();
        let mut rng = Rng::with_seed(8);
        let mut sticker = Sticker::new(StickerKind::Banknote, 100.0, config.tick_ms);
        assert_eq!(sticker.y, -50.0);

        let mut ticks = 0;
        let mut last_y = sticker.y;
        while sticker.advance(0.016, &vp, &config, &mut rng) {
            assert!(sticker.y > last_y);
            let step = sticker.y - last_y;
            assert!(step >= 2.0 - 1e-3 && step < 5.0 + 1e-3);
            last_y = sticker.y;
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert!(sticker.y > vp.height);
        // (300 + 50) / 5 at the fastest
        assert!(ticks >= 69);

        let y = sticker.y;
        assert!(!sticker.advance(1.0, &vp, &config, &mut rng));
        assert_eq!(sticker.y, y);
    }

    #[test]
    fn test_spawn_period_is_drawn_once() {
        let mut rng = Rng::with_seed(2);
        let overlay = StickerOverlay::new(StickerConfig::default(), &mut rng);
        let period = overlay.spawn_period();
        assert!((0.5..1.0).contains(&period));
    }

    #[test]
    fn test_overlay_spawns_and_removes() {
        let mut stage = Stage::new(viewport(), (0, 0, 0), Rng::with_seed(4));
        let mut overlay = StickerOverlay::new(StickerConfig::default(), &mut stage.rng);
        let period = overlay.spawn_period();

        overlay.update(period, &mut stage);
        assert_eq!(overlay.stickers().len(), 1);
        let s = &overlay.stickers()[0];
        assert!(s.x >= 0.0 && s.x < stage.viewport.width);

        // a long quiet stretch: every sticker falls out and more keep coming
        let mut seen_many = false;
        for _ in 0..600 {
            overlay.update(1.0 / 60.0, &mut stage);
            seen_many |= overlay.stickers().len() > 1;
            assert!(overlay.stickers().iter().all(|s| s.y <= stage.viewport.height));
        }
        assert!(seen_many);
    }

    #[test]
    fn test_sprites_use_known_colors() {
        for kind in StickerKind::ALL {
            for row in kind.sprite() {
                for ch in row.chars() {
                    assert!(ch == '.' || sprite_color(ch).is_some(), "{} has stray '{ch}'", kind.name());
                }
            }
        }
    }
}
