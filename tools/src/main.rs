//! sim-runner: headless runner for Parallax.
//!
//! Usage:
//!   sim-runner --seed 12345 --ticks 120
//!   sim-runner --seed 12345 --ticks 120 --save-at 30 --save-at 60 --out saves
//!   sim-runner --seed 12345 --ticks 120 --display --color --save-delay-ms 5000
//!
//! At every `--save-at` tick the runner writes a live dump for comparison,
//! opens a save window, serializes the snapshot on a background thread while
//! the simulation keeps ticking, then closes the window. With no writes in
//! between, the pair of files is byte-identical — that is the whole point.

mod ui;

use anyhow::{anyhow, Context, Result};
use parallax_core::config::WorldConfig;
use parallax_core::engine::SimEngine;
use parallax_core::event::SimEvent;
use parallax_core::serializer::SaveSerializer;
use parallax_core::snapshot::Perspective;
use parallax_core::types::TICK_DELTA;
use parallax_core::world::World;
use std::env;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Default)]
struct RunStats {
    jumps: u64,
    docks: u64,
    kills: u64,
    respawns: u64,
    saves: u64,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 120u64);
    let save_delay_ms = parse_arg(&args, "--save-delay-ms", 0u64);
    let display = args.iter().any(|a| a == "--display");
    let use_color = args.iter().any(|a| a == "--color");
    let no_jumpgates = args.iter().any(|a| a == "--no-jumpgates");
    let out_dir: PathBuf = args
        .windows(2)
        .find(|w| w[0] == "--out")
        .map(|w| PathBuf::from(&w[1]))
        .unwrap_or_else(|| PathBuf::from("."));

    let mut save_at: Vec<u64> = args
        .windows(2)
        .filter(|w| w[0] == "--save-at")
        .filter_map(|w| w[1].parse().ok())
        .collect();
    save_at.sort_unstable();
    save_at.dedup();

    let mut config = match args.windows(2).find(|w| w[0] == "--config") {
        Some(w) => WorldConfig::load(&w[1])?,
        None => WorldConfig::default(),
    };
    if let Some(ships) = args
        .windows(2)
        .find(|w| w[0] == "--ships")
        .and_then(|w| w[1].parse().ok())
    {
        config.ship_count = ships;
    }
    if no_jumpgates {
        config.use_jumpgates = false;
    }

    println!("Parallax — sim-runner");
    println!("  seed:      {seed}");
    println!("  ticks:     {ticks}");
    println!("  sectors:   {}x{}", config.sector_rows, config.sector_cols);
    println!("  ships:     {}", config.ship_count);
    println!("  jumpgates: {}", config.use_jumpgates);
    if !save_at.is_empty() {
        println!("  save at:   {save_at:?} -> {}", out_dir.display());
    }
    println!();

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("create {}", out_dir.display()))?;

    let (mut engine, world) = SimEngine::build(seed, &config)?;
    let serializer = SaveSerializer::new();
    let mut stats = RunStats::default();

    engine.clock.resume();
    let mut next_save = 0usize;
    while engine.clock.current_tick < ticks {
        let work_started = Instant::now();
        let events = engine.tick(&world)?;
        count_events(&events, &mut stats);
        let work = work_started.elapsed();

        if display {
            print!("{}", "\n".repeat(50));
            print!("{}", ui::render(&world, engine.live_view(), use_color));
            println!("work: {:.2}ms", work.as_secs_f64() * 1000.0);
            std::thread::sleep(Duration::from_secs_f32(TICK_DELTA));
        }

        if next_save < save_at.len() && engine.clock.current_tick >= save_at[next_save] {
            run_background_save(
                &mut engine,
                &world,
                &serializer,
                &out_dir,
                next_save,
                save_delay_ms,
                &mut stats,
            )?;
            next_save += 1;
        }
    }
    engine.clock.pause();

    print_summary(&engine, &world, &stats, ticks);
    Ok(())
}

/// One complete save cycle: live dump, window open, background snapshot
/// dump with the simulation still ticking, window close.
fn run_background_save(
    engine: &mut SimEngine,
    world: &World,
    serializer: &SaveSerializer,
    out_dir: &Path,
    index: usize,
    save_delay_ms: u64,
    stats: &mut RunStats,
) -> Result<()> {
    let live_path = out_dir.join(format!("parallax_{:02}-live.txt", index * 2 + 1));
    let snap_path = out_dir.join(format!("parallax_{:02}-snap.txt", index * 2 + 2));

    let live = serializer.savegame(world, engine.live_view());
    std::fs::write(&live_path, &live)
        .with_context(|| format!("write {}", live_path.display()))?;

    let coordinator = engine.coordinator().clone();
    let window = coordinator.begin_save()?;
    let save_started = Instant::now();

    let (snap, ticks_during) = std::thread::scope(|scope| -> Result<(String, u64)> {
        let window_ref = &window;
        let reader = scope.spawn(move || {
            // Artificially slow the save down to prove the mutator
            // does not care.
            if save_delay_ms > 0 {
                std::thread::sleep(Duration::from_millis(save_delay_ms));
            }
            SaveSerializer::new().savegame(world, Perspective::Snap(window_ref))
        });

        let mut ticks_during = 0u64;
        while !reader.is_finished() {
            engine.tick(world)?;
            ticks_during += 1;
        }
        let snap = reader
            .join()
            .map_err(|_| anyhow!("save thread panicked"))?;
        Ok((snap, ticks_during))
    })?;

    coordinator.end_save(window, engine.mutator_mut())?;

    std::fs::write(&snap_path, &snap)
        .with_context(|| format!("write {}", snap_path.display()))?;
    stats.saves += 1;

    log::info!(
        "save #{}: {:.1}ms, {} ticks ran during the window, snapshot {} bytes",
        index + 1,
        save_started.elapsed().as_secs_f64() * 1000.0,
        ticks_during,
        snap.len()
    );
    println!(
        "save #{} written ({} and {}), {} ticks ran during the window",
        index + 1,
        live_path.display(),
        snap_path.display(),
        ticks_during
    );
    Ok(())
}

fn count_events(events: &[SimEvent], stats: &mut RunStats) {
    for event in events {
        match event {
            SimEvent::ShipJumped { .. } => stats.jumps += 1,
            SimEvent::ShipDocked { .. } => stats.docks += 1,
            SimEvent::ShipDestroyed { .. } => stats.kills += 1,
            SimEvent::ShipRespawned { .. } => stats.respawns += 1,
            _ => {}
        }
    }
}

fn print_summary(engine: &SimEngine, world: &World, stats: &RunStats, requested_ticks: u64) {
    let alive = world
        .ships
        .iter()
        .filter(|s| !s.is_dead(engine.live_view()))
        .count();

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  seed:        {}", engine.seed());
    println!("  ticks asked: {requested_ticks}");
    println!("  final tick:  {}", engine.clock.current_tick);
    println!("  ships alive: {}/{}", alive, world.ships.len());
    println!("  jumps:       {}", stats.jumps);
    println!("  docks:       {}", stats.docks);
    println!("  kills:       {}", stats.kills);
    println!("  respawns:    {}", stats.respawns);
    println!("  saves:       {}", stats.saves);
    println!("  events:      {}", engine.event_log().len());
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
