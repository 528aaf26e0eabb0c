use anyhow::Result;
use clap::Parser;
use log::info;

use segment_sim::simulation::{SimConfig, SimWorld, FOLLOWING_DISTANCE};

#[derive(Parser)]
#[command(name = "segment_sim")]
#[command(about = "Road segment traffic simulation with optional UI")]
struct Cli {
    /// Run with the Bevy game engine UI
    #[arg(long)]
    ui: bool,

    /// Number of simulation ticks to run in headless mode
    #[arg(long, default_value = "1000")]
    ticks: u32,

    /// Seed for the successor RNG, random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks between spawn waves, 0 disables spawning after the first wave
    #[arg(long, default_value = "40")]
    spawn_interval: u32,

    /// No automatic spawns while this many cars are on the roads
    #[arg(long, default_value = "40")]
    max_cars: usize,

    /// Ticks between global signal toggles, 0 never toggles
    #[arg(long, default_value = "0")]
    toggle_interval: u32,

    /// Minimum gap between cars on straight roads
    #[arg(long, default_value_t = FOLLOWING_DISTANCE)]
    following_distance: f32,

    /// Ticks between progress reports
    #[arg(long, default_value = "200")]
    report_interval: u32,

    /// Draw the ASCII map with every report
    #[arg(long)]
    map: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = SimConfig {
        following_distance: cli.following_distance,
        ..SimConfig::default()
    };

    if cli.ui {
        #[cfg(feature = "ui")]
        {
            run_with_ui(config, cli.seed)
        }
        #[cfg(not(feature = "ui"))]
        {
            eprintln!("Error: UI feature is not enabled. Rebuild with --features ui");
            std::process::exit(1);
        }
    } else {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("warn,segment_sim=info"),
        )
        .init();
        run_headless(&cli, config)
    }
}

/// Build the demo world shared by both front-ends
fn build_world(config: SimConfig, seed: Option<u64>) -> Result<SimWorld> {
    let network = SimWorld::build_demo_network(&config)?;
    match seed {
        Some(seed) => SimWorld::new_with_seed(network, config, seed),
        None => SimWorld::new(network, config),
    }
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(cli: &Cli, config: SimConfig) -> Result<()> {
    println!("Running segment simulation in headless mode...");
    println!("Ticks: {}, Following distance: {}", cli.ticks, config.following_distance);
    println!();

    let mut world = build_world(config, cli.seed)?;

    world.spawn_wave()?;

    println!("Initial state:");
    world.print_summary();
    if cli.map {
        world.draw_map();
    }
    println!();

    for tick in 1..=cli.ticks {
        world.tick();

        if cli.spawn_interval > 0
            && tick % cli.spawn_interval == 0
            && world.car_count() < cli.max_cars
        {
            world.spawn_wave()?;
        }

        if cli.toggle_interval > 0 && tick % cli.toggle_interval == 0 {
            world.toggle_all_signals();
        }

        if cli.report_interval > 0 && tick % cli.report_interval == 0 && tick < cli.ticks {
            println!("--- After tick {} ---", tick);
            world.print_summary();
            if cli.map {
                world.draw_map();
            }
            println!();
        }
    }

    println!("=== Final State ===");
    world.print_summary();
    if cli.map {
        world.draw_map();
    }

    info!("=== SIMULATION COMPLETE ===");
    info!("Ticks run: {}", world.stats.ticks);
    info!("Total cars spawned: {}", world.stats.cars_spawned);
    info!("Total hand-offs: {}", world.stats.hand_offs);
    info!("Cars discarded: {}", world.stats.cars_discarded);
    info!("Active cars: {}", world.car_count());
    info!("Signal toggles: {}", world.stats.signal_toggles);

    Ok(())
}

#[cfg(feature = "ui")]
fn run_with_ui(config: SimConfig, seed: Option<u64>) -> Result<()> {
    use bevy::log::LogPlugin;
    use bevy::prelude::*;
    use segment_sim::ui::{SegmentSimUIPlugin, SimWorldResource};

    let world = build_world(config, seed)?;

    println!("Starting Segment Sim UI...");
    println!();
    println!("Controls:");
    println!("  Space  - Toggle every signal");
    println!("  Enter  - Spawn a car at each entry point");
    println!("  ESC    - Exit");
    println!();

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(LogPlugin {
                    filter: "warn,segment_sim=info".to_string(),
                    level: bevy::log::Level::INFO,
                    ..default()
                })
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Segment Sim".into(),
                        resolution: (640, 420).into(),
                        ..default()
                    }),
                    ..default()
                }),
        )
        .insert_resource(SimWorldResource(world))
        .add_plugins(SegmentSimUIPlugin)
        .run();

    Ok(())
}
