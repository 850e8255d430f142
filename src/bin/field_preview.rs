//! Field preview binary - flies a probe through an asteroid field and reports
//! what the generator streams in and out.
//!
//! Usage: cargo run --release --bin field_preview -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>        Field settings JSON (default: built-in belt)
//!   --definitions <PATH>   Generator definition table JSON (default: built-in)
//!   --seed <SEED>          Override the global seed
//!   --steps <N>            Number of ticks to simulate (default: 40)
//!   --speed <UNITS>        Distance moved along +X per tick (default: 5000)
//!   --start <X>            Starting X coordinate (default: 0)

use std::collections::HashMap;
use std::time::Instant;

use astrofield::bridge::{BlobSynthesizer, InMemoryHost};
use astrofield::config::FieldSettings;
use astrofield::core::types::DVec3;
use astrofield::core::{logging, Result};
use astrofield::generator::{DefinitionTable, GeneratorDefinition};
use astrofield::tracking::{EntityId, TrackedKind};
use astrofield::world::ProceduralWorld;

const PROBE: EntityId = EntityId(1);

fn main() {
    logging::init();

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut settings = match parse_str_arg(&args, "--config") {
        Some(path) => FieldSettings::load(&path)?,
        None => FieldSettings::default(),
    };
    if let Some(seed) = parse_i32_arg(&args, "--seed") {
        settings.global_seed = seed;
    }
    let definitions = match parse_str_arg(&args, "--definitions") {
        Some(path) => DefinitionTable::from_json(&std::fs::read_to_string(path)?)?,
        None => {
            let mut table = DefinitionTable::new();
            table.insert(GeneratorDefinition::default());
            table
        }
    };
    let steps = parse_usize_arg(&args, "--steps").unwrap_or(40);
    let speed = parse_f64_arg(&args, "--speed").unwrap_or(5_000.0);
    let start = parse_f64_arg(&args, "--start").unwrap_or(0.0);

    println!("=== Astrofield Preview ===");
    println!("Seed:      {}", settings.global_seed);
    println!("Cell size: {}", settings.effective_cell_size());
    println!("View:      {}", settings.view_distance);
    println!("Density:   {}", settings.density);
    println!("Regions:   {}", settings.regions.len());
    println!("Steps:     {} x {} units", steps, speed);
    println!();

    let mut world = ProceduralWorld::new(settings, &definitions, BlobSynthesizer::default(), InMemoryHost::new())?;
    world.track(PROBE, TrackedKind::Player);

    let started = Instant::now();
    let mut peak_objects = 0;
    for step in 0..steps {
        let x = start + step as f64 * speed;
        let positions = HashMap::from([(PROBE, DVec3::new(x, 0.0, 0.0))]);

        let tick_start = Instant::now();
        let stats = world.tick(&positions);
        let objects = world.host().len();
        peak_objects = peak_objects.max(objects);

        println!(
            "[{:>4}] x={:>10.0}  cells {:>4} (+{} -{})  objects {:>6} (+{})  {:.2}ms",
            step,
            x,
            stats.loaded_cells,
            stats.cells_loaded,
            stats.cells_unloaded,
            objects,
            stats.objects_materialized,
            tick_start.elapsed().as_secs_f64() * 1000.0,
        );
    }

    let unloaded = world.shutdown();
    let bridge = world.bridge().stats();

    println!();
    println!("=== Summary ===");
    println!("Time:       {:.2}s", started.elapsed().as_secs_f64());
    println!("Peak:       {} objects", peak_objects);
    println!("Created:    {}", bridge.created);
    println!("Destroyed:  {}", bridge.destroyed);
    println!("Failed:     {}", bridge.failed);
    println!("Shutdown:   {} cells unloaded", unloaded);
    Ok(())
}

fn parse_f64_arg(args: &[String], flag: &str) -> Option<f64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_i32_arg(args: &[String], flag: &str) -> Option<i32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
