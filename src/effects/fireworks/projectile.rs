use crate::canvas::{Blend, Canvas, Viewport};
use crate::config::FireworksConfig;
use crate::random::{hue_to_color, rand_int, rand_range};
use fastrand::Rng;

const LAUNCH_MARGIN: f32 = 100.0; // Keep default launches off the side edges
const CEILING: f32 = 30.0; // Rockets above this line burst regardless
const SIDE_SLACK: f32 = 50.0; // Drift allowed past either side before dropping
const GLOW_RADIUS: f32 = 20.0;

/// An ascending rocket.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub hue: f32,
    pub age: u32,
    explode_altitude: f32,
}

impl Projectile {
    pub fn launch(x: Option<f32>, viewport: &Viewport, config: &FireworksConfig, rng: &mut Rng) -> Self {
        let (w, h) = (viewport.width, viewport.height);
        let x = x.unwrap_or_else(|| rand_range(rng, LAUNCH_MARGIN, w - LAUNCH_MARGIN));
        Self {
            x,
            y: h + 10.0, // Start just below the bottom edge
            vx: rand_range(rng, -1.5, 1.5), // Slight sideways drift
            vy: -rand_range(rng, config.projectile_speed_min, config.projectile_speed_max), // Negative because up is negative y
            size: rand_range(rng, 2.0, 3.0),
            hue: rand_int(rng, 0, 360) as f32,
            age: 0,
            explode_altitude: rand_range(rng, h * 0.15, h * 0.5), // Upper half of the screen, fixed for life
        }
    }

    #[cfg(test)]
    pub(crate) fn at(x: f32, y: f32, vx: f32, vy: f32, hue: f32, explode_altitude: f32) -> Self {
        Self {
            x,
            y,
            vx,
            vy,
            size: 2.5,
            hue,
            age: 0,
            explode_altitude,
        }
    }

    pub fn explode_altitude(&self) -> f32 {
        self.explode_altitude
    }

    pub fn advance(&mut self, gravity: f32) {
        self.vy += gravity; // Gravity slows the climb every frame
        self.x += self.vx;
        self.y += self.vy;
        self.age += 1;
    }

    pub fn is_explosion_due(&self, rng: &mut Rng, premature_probability: f32) -> bool {
        // Burst altitude reached
        self.y <= self.explode_altitude
            // Apex passed, the rocket started falling
            || self.vy > 0.0
            // Occasional early burst
            || rng.f32() < premature_probability
    }

    pub fn has_left_viewport(&self, viewport: &Viewport) -> bool {
        self.y < CEILING || self.x < -SIDE_SLACK || self.x > viewport.width + SIDE_SLACK
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        let color = hue_to_color(self.hue);
        // Glowing head
        canvas.fill_radial(self.x, self.y, self.size, GLOW_RADIUS, color);
        // Short exhaust mark under the head
        canvas.fill_rect(self.x - 1.0, self.y + 2.0, 2.0, 6.0, color, 0.6, Blend::SourceOver);
    }
}
