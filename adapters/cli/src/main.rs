#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a tower defence session.

mod config;
mod scene;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use tower_defence_core::{Event, FieldPoint, Rules, WINDOW_TITLE};
use tower_defence_rendering::{Color, Palette, Presentation, RenderingBackend, Scene};
use tower_defence_rendering_macroquad::MacroquadBackend;
use tower_defence_simulation::{Simulation, TickLoop};

/// Command-line arguments accepted by the tower defence binary.
#[derive(Debug, Parser)]
#[command(author, version, about = "Minimal real-time tower defence")]
struct CliArgs {
    /// TOML file overriding gameplay rules.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Milliseconds covered by a single simulation tick.
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,
    /// Runs the simulation without opening a window.
    #[arg(long)]
    headless: bool,
    /// Number of ticks to run in headless mode.
    #[arg(long, default_value_t = 1_000)]
    ticks: u64,
    /// Tower placed before the first tick, given as `X,Y`.
    #[arg(long = "tower", value_name = "X,Y", value_parser = config::parse_field_point)]
    towers: Vec<FieldPoint>,
    /// Synchronises presentation with the display refresh rate.
    #[arg(long)]
    vsync: bool,
    /// Logs frame timing once per second.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the tower defence command-line interface.
fn main() -> Result<()> {
    init_logging();

    let args = CliArgs::parse();
    let rules = config::load_rules(args.config.as_deref(), args.tick_ms)?;
    info!(
        "field {}x{}, tick interval {:?} ({:.0} ticks/s)",
        rules.field_width,
        rules.field_height,
        rules.tick_interval,
        rules.ticks_per_second()
    );

    if args.headless {
        run_headless(rules, &args.towers, args.ticks)
    } else {
        run_windowed(rules, &args)
    }
}

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();
}

fn run_headless(rules: Rules, towers: &[FieldPoint], ticks: u64) -> Result<()> {
    let dt = rules.tick_interval;
    let mut simulation = Simulation::new(rules);
    let mut events = Vec::new();

    for &position in towers {
        simulation.place_tower(position, &mut events);
    }
    log_events(&events);

    for _ in 0..ticks {
        events.clear();
        simulation.step(dt, &mut events);
        log_events(&events);
        if simulation.is_victory() {
            break;
        }
    }

    let snapshot = simulation.snapshot();
    if snapshot.victory {
        info!(
            "victory after {} ticks ({:?} simulated)",
            snapshot.tick_index, snapshot.elapsed
        );
    } else {
        info!(
            "stopped after {} ticks without victory: {} enemies, boss present: {}",
            snapshot.tick_index,
            snapshot.enemies.len(),
            snapshot.boss.is_some()
        );
    }
    Ok(())
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::TimeAdvanced { .. } => {}
            Event::ProjectileFired { .. }
            | Event::ProjectileExpired { .. }
            | Event::EnemyDamaged { .. } => debug!("{event:?}"),
            Event::EnemyEscaped { enemy } => warn!("enemy {} escaped", enemy.get()),
            Event::TowerPlaced { .. }
            | Event::EnemyDestroyed { .. }
            | Event::BossSpawned { .. }
            | Event::BossDefeated { .. }
            | Event::VictoryAchieved => info!("{event:?}"),
        }
    }
}

fn run_windowed(rules: Rules, args: &CliArgs) -> Result<()> {
    let mut scene = Scene::new(rules.field_width as f32, rules.field_height as f32)
        .context("failed to describe the playfield")?;
    let tick_interval = rules.tick_interval;

    let tick_loop = TickLoop::spawn(Simulation::new(rules), tick_interval)
        .context("failed to start the simulation thread")?;
    for &position in &args.towers {
        tick_loop.place_tower(position)?;
    }
    scene::apply_snapshot(&mut scene, &tick_loop.snapshot());

    let presentation = presentation(scene);
    let mut stop_reported = false;
    MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps)
        .run(presentation, move |_dt, input, scene| {
            if !stop_reported && !tick_loop.is_running() {
                warn!("simulation thread stopped, the field is frozen");
                stop_reported = true;
            }
            if let Some(click) = input.click {
                let position = scene::click_to_field(click);
                if let Err(err) = tick_loop.place_tower(position) {
                    warn!("dropped tower at {position:?}: {err}");
                }
            }
            scene::apply_snapshot(scene, &tick_loop.snapshot());
        })
}

fn presentation(scene: Scene) -> Presentation {
    Presentation::new(
        WINDOW_TITLE,
        Color::from_rgb_u8(255, 255, 255),
        Palette::default(),
        scene,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn defaults_open_a_window() {
        let args = CliArgs::try_parse_from(["tower-defence"]).expect("no arguments needed");
        assert!(!args.headless);
        assert_eq!(args.ticks, 1_000);
        assert!(args.towers.is_empty());
        assert!(args.config.is_none());
        assert!(args.tick_ms.is_none());
    }

    #[test]
    fn repeated_towers_are_collected_in_order() {
        let args = CliArgs::try_parse_from([
            "tower-defence",
            "--headless",
            "--ticks",
            "50",
            "--tower",
            "750,300",
            "--tower",
            "600,300",
            "--tick-ms",
            "5",
        ])
        .expect("valid arguments");

        assert!(args.headless);
        assert_eq!(args.ticks, 50);
        assert_eq!(args.tick_ms, Some(5));
        assert_eq!(
            args.towers,
            vec![FieldPoint::new(750, 300), FieldPoint::new(600, 300)]
        );
    }

    #[test]
    fn malformed_tower_is_rejected() {
        assert!(CliArgs::try_parse_from(["tower-defence", "--tower", "750"]).is_err());
    }

    #[test]
    fn window_uses_classic_title_and_white_background() {
        let scene = Scene::new(800.0, 600.0).expect("valid field");
        let presentation = presentation(scene);
        assert_eq!(presentation.window_title, "Tower Defense Game");
        assert_eq!(presentation.clear_color, Color::from_rgb_u8(255, 255, 255));
    }

    #[test]
    fn headless_run_reaches_victory() {
        let towers = [FieldPoint::new(750, 300), FieldPoint::new(600, 300)];
        run_headless(Rules::default(), &towers, 500).expect("headless run succeeds");
    }
}
