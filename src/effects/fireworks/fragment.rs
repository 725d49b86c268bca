use crate::canvas::{Blend, Canvas, Viewport};
use crate::random::{hue_to_color, rand_int, rand_range, wrap_hue};
use fastrand::Rng;
use std::f32::consts::TAU;

const STREAK_CHANCE: f32 = 0.15; // Share of sparks that fly out as long streaks
const HUE_JITTER: i32 = 40; // Max hue offset from the rocket's colour

/// A spark thrown out by an exploding rocket.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub hue: f32,
    pub opacity: f32,
    pub age: u32,
    pub lifetime: u32,
}

impl Fragment {
    pub fn burst(x: f32, y: f32, base_hue: f32, rng: &mut Rng) -> Self {
        // Random cap first so slow sparks outnumber fast ones
        let speed_cap = rand_range(rng, 2.0, 8.0);
        let mut speed = rand_range(rng, 1.0, speed_cap);
        let angle = rand_range(rng, 0.0, TAU);
        if rng.f32() < STREAK_CHANCE {
            // Streak: same heading, more speed
            speed *= rand_range(rng, 1.5, 3.0);
        }

        let hue = wrap_hue(base_hue + rand_int(rng, -HUE_JITTER, HUE_JITTER) as f32);

        Self {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            size: rand_range(rng, 1.0, 2.8),
            hue,
            opacity: 1.0,
            age: 0,
            lifetime: rand_int(rng, 50, 140) as u32,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_lifetime(x: f32, y: f32, hue: f32, lifetime: u32) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            size: 2.0,
            hue,
            opacity: 1.0,
            age: 0,
            lifetime,
        }
    }

    pub fn advance(&mut self, friction: f32, gravity: f32) {
        self.vx *= friction; // Air resistance
        self.vy *= friction;
        self.vy += gravity; // Gravity
        self.x += self.vx;
        self.y += self.vy;
        self.age += 1;
        self.opacity = opacity_at(self.age, self.lifetime); // Fade out over the lifetime
    }

    pub fn is_expired(&self) -> bool {
        self.age > self.lifetime || self.opacity <= 0.0
    }

    pub fn has_left_viewport(&self, viewport: &Viewport) -> bool {
        self.y > viewport.height + 100.0 || self.x < -200.0 || self.x > viewport.width + 200.0
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        let s = self.size;
        canvas.fill_rect(
            self.x - s,
            self.y - s,
            s * 2.0,
            s * 2.0,
            hue_to_color(self.hue),
            self.opacity.min(1.0),
            Blend::Lighter,
        );
    }
}

/// Linear fade from 1 to 0 over the lifetime, floored at zero.
pub fn opacity_at(age: u32, lifetime: u32) -> f32 {
    if lifetime == 0 {
        return 0.0;
    }
    (1.0 - age as f32 / lifetime as f32).max(0.0)
}
