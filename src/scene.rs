//! Everything on screen, owned in one place and driven by the main loop.

use crate::canvas::{Frame, Viewport};
use crate::config::Config;
use crate::effects::countdown::Countdown;
use crate::effects::fireworks::FireworksEffect;
use crate::effects::stickers::StickerOverlay;
use crate::effects::{Effect, Stage};
use crate::error::Result;
use chrono::{DateTime, Local};
use crossterm::event::Event;
use fastrand::Rng;
use std::io::Write;

pub struct Scene {
    stage: Stage,
    scale: f32,
    fireworks: FireworksEffect,
    countdown: Option<Countdown>,
    stickers: Option<StickerOverlay>,
    output_buf: Vec<u8>,
}

impl Scene {
    /// `config` must already be validated.
    pub fn new(config: &Config, cols: u16, rows: u16, mut rng: Rng, now: DateTime<Local>) -> Result<Self> {
        let viewport = Viewport::from_terminal(cols, rows, config.pixel_scale);
        log::info!(
            "Scene {}x{} cells, logical viewport {:.0}x{:.0}",
            cols,
            rows,
            viewport.width,
            viewport.height
        );

        let countdown = if config.countdown.enabled {
            Some(Countdown::new(&config.countdown, now)?)
        } else {
            None
        };
        let stickers = config
            .stickers
            .enabled
            .then(|| StickerOverlay::new(config.stickers.clone(), &mut rng));

        Ok(Self {
            stage: Stage::new(viewport, config.background, rng),
            scale: config.pixel_scale,
            fireworks: FireworksEffect::new(config.fireworks.clone()),
            countdown,
            stickers,
            output_buf: Vec::with_capacity(cols as usize * rows as usize * 25),
        })
    }

    pub fn viewport(&self) -> &Viewport {
        &self.stage.viewport
    }

    pub fn fireworks(&self) -> &FireworksEffect {
        &self.fireworks
    }

    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    pub fn stickers(&self) -> Option<&StickerOverlay> {
        self.stickers.as_ref()
    }

    pub fn update(&mut self, dt: f32) {
        self.fireworks.update(dt, &mut self.stage);
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.update(dt, &mut self.stage);
        }
        if let Some(stickers) = self.stickers.as_mut() {
            stickers.update(dt, &mut self.stage);
        }
    }

    pub fn handle_event(&mut self, event: &Event) {
        if let Event::Resize(cols, rows) = event {
            self.resize(*cols, *rows);
            return;
        }
        self.fireworks.handle_event(event, &mut self.stage);
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.handle_event(event, &mut self.stage);
        }
        if let Some(stickers) = self.stickers.as_mut() {
            stickers.handle_event(event, &mut self.stage);
        }
    }

    /// Recomputes the extents only; live entities keep their positions.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        let viewport = Viewport::from_terminal(cols, rows, self.scale);
        log::info!(
            "Resized to {}x{} cells, logical viewport {:.0}x{:.0}",
            cols,
            rows,
            viewport.width,
            viewport.height
        );
        self.stage.resize(viewport);
    }

    /// Canvas plus countdown text and stickers on top.
    pub fn compose(&self) -> Frame {
        let mut frame = self.stage.canvas.compose();
        let viewport = &self.stage.viewport;
        if let Some(stickers) = &self.stickers {
            stickers.overlay(&mut frame, viewport);
        }
        if let Some(countdown) = &self.countdown {
            countdown.overlay(&mut frame, viewport);
        }
        frame
    }

    pub fn render<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        let frame = self.compose();
        self.output_buf.clear();
        frame.present(&mut self.output_buf)?;
        out.write_all(&self.output_buf)?;
        out.flush()
    }
}
