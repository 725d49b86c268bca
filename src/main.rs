use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::fs::File;
use std::io::{BufWriter, Stdout, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tetsaver::config::parse_hex_color;
use tetsaver::{Config, Scene};

const FIXED_DT: f32 = 1.0 / 60.0;

#[derive(Parser)]
#[command(name = "tetsaver")]
#[command(about = "New Year fireworks, countdown and falling stickers in the terminal")]
#[command(after_help = "Click to launch rockets, SPACE for a random one. Press 'q', ESC, or Ctrl+C to exit")]
struct Cli {
    /// JSON config file; missing keys keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Countdown target in local time, e.g. 2027-01-01T00:00:00
    #[arg(long, value_parser = parse_target)]
    target: Option<NaiveDateTime>,

    /// Background color as hex (e.g. --bg-color 1a1b26)
    #[arg(long)]
    bg_color: Option<String>,

    /// Logical pixels per terminal sub-pixel
    #[arg(long)]
    scale: Option<f32>,

    /// Seed for a reproducible show
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    no_countdown: bool,

    #[arg(long)]
    no_stickers: bool,

    /// Write logs here (the terminal itself is busy drawing)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn parse_target(s: &str) -> std::result::Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .map_err(|e| format!("expected YYYY-MM-DDTHH:MM:SS ({e})"))
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let default_filter = if log_file.is_some() { "info" } else { "off" };
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if let Some(path) = log_file {
        let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(target) = cli.target {
        config.countdown.target = Some(target);
    }
    if let Some(hex) = &cli.bg_color {
        config.background = parse_hex_color(hex)?;
    }
    if let Some(scale) = cli.scale {
        config.pixel_scale = scale;
    }
    if cli.no_countdown {
        config.countdown.enabled = false;
    }
    if cli.no_stickers {
        config.stickers.enabled = false;
    }
    config.validate()?;
    Ok(config)
}

fn run(scene: &mut Scene, stdout: &mut BufWriter<Stdout>) -> Result<()> {
    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f32;

    loop {
        if event::poll(Duration::from_millis(1))? {
            let event = event::read()?;
            match &event {
                Event::Key(key_event) => {
                    if key_event.code == KeyCode::Char('q')
                        || key_event.code == KeyCode::Esc
                        || (key_event.code == KeyCode::Char('c')
                            && key_event.modifiers.contains(event::KeyModifiers::CONTROL))
                    {
                        break;
                    }
                    scene.handle_event(&event);
                }
                Event::Resize(..) => {
                    scene.handle_event(&event);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => scene.handle_event(&event),
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        accumulator += frame_time;
        if accumulator > FIXED_DT * 3.0 {
            accumulator = FIXED_DT * 3.0;
        }

        while accumulator >= FIXED_DT {
            scene.update(FIXED_DT);
            accumulator -= FIXED_DT;
        }

        scene.render(stdout)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let config = build_config(&cli).context("invalid configuration")?;
    let rng = match cli.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    let (cols, rows) = terminal::size()?;
    let mut scene = Scene::new(&config, cols, rows, rng, Local::now())?;
    log::info!("Starting with {:?}", config);

    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout());
    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All), EnableMouseCapture)?;

    let result = run(&mut scene, &mut stdout);

    // restore the terminal even if the loop failed
    execute!(stdout, Show, LeaveAlternateScreen, DisableMouseCapture)?;
    terminal::disable_raw_mode()?;

    let (launched, exploded) = scene.fireworks().totals();
    log::info!("Exiting after {launched} rockets launched, {exploded} burst");
    result
}
