//! Days/hours/minutes/seconds left until a fixed local timestamp.

use super::{Effect, Stage};
use crate::canvas::{Color, Frame, Viewport};
use crate::config::CountdownConfig;
use crate::error::{Error, Result};
use crate::schedule::Interval;
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeDelta};

const TICK_SECONDS: f32 = 1.0;

pub struct Countdown {
    target: DateTime<Local>,
    completion_message: String,
    color: Color,
    text: String,
    interval: Interval,
}

impl Countdown {
    /// Resolves the target against the local time zone and ticks once
    /// straight away.
    pub fn new(config: &CountdownConfig, now: DateTime<Local>) -> Result<Self> {
        let naive = match config.target {
            Some(target) => target,
            None => next_new_year(now.naive_local()),
        };
        let target = naive
            .and_local_timezone(Local)
            .earliest()
            .ok_or_else(|| Error::InvalidTarget(format!("{naive} does not exist in the local time zone")))?;
        log::info!("Counting down to {target}");

        let mut countdown = Self {
            target,
            completion_message: config.completion_message.clone(),
            color: config.text_color,
            text: String::new(),
            interval: Interval::new(TICK_SECONDS),
        };
        countdown.tick_at(now);
        Ok(countdown)
    }

    pub fn target(&self) -> DateTime<Local> {
        self.target
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True once the target has been reached and the timer stopped.
    pub fn is_finished(&self) -> bool {
        self.interval.is_cancelled()
    }

    /// Recomputes the display for `now`. Does nothing after completion.
    pub fn tick_at(&mut self, now: DateTime<Local>) {
        if self.is_finished() {
            return;
        }
        let remaining = self.target.signed_duration_since(now);
        if remaining <= TimeDelta::zero() {
            self.text = self.completion_message.clone();
            self.interval.cancel();
            log::info!("Countdown reached {}", self.target);
            return;
        }
        self.text = format_remaining(remaining);
    }

    /// Advances the one-second timer, ticking against `now` when it fires.
    pub fn advance(&mut self, dt: f32, now: DateTime<Local>) {
        if self.interval.poll(dt) > 0 {
            self.tick_at(now);
        }
    }
}

/// `"{days}d {hh}h:{mm}m:{ss}s"`, padding everything but the days.
pub fn format_remaining(remaining: TimeDelta) -> String {
    let total = remaining.num_seconds().max(0);
    let days = total / 86_400;
    let hours = total % 86_400 / 3_600;
    let minutes = total % 3_600 / 60;
    let seconds = total % 60;
    format!("{days}d {hours:02}h:{minutes:02}m:{seconds:02}s")
}

/// Midnight on the first of January following `now`.
pub fn next_new_year(now: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(now.year() + 1, 1, 1)
        .unwrap_or(NaiveDate::MAX)
        .and_hms_opt(0, 0, 0)
        .unwrap_or(NaiveDateTime::MAX)
}

impl Effect for Countdown {
    fn update(&mut self, dt: f32, _stage: &mut Stage) {
        self.advance(dt, Local::now());
    }

    fn overlay(&self, frame: &mut Frame, _viewport: &Viewport) {
        frame.draw_text(frame.rows() / 4, &self.text, self.color);
    }
}
