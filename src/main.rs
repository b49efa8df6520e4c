use clap::Parser;
use log::info;

use gridsim::simulation::SimWorld;

#[derive(Parser)]
#[command(name = "gridsim")]
#[command(about = "Headless grid traffic micro-simulation")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "2000")]
    ticks: u64,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Grid side length (number of intersections per axis)
    #[arg(long, default_value = "2")]
    grid_size: i32,

    /// Log a summary every N ticks (0 to disable)
    #[arg(long, default_value = "300")]
    summary_every: u64,

    /// Raise the speed cap as if driven by a live data feed
    #[arg(long)]
    real_time: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut world = match cli.seed {
        Some(seed) => SimWorld::new_with_seed(cli.grid_size, seed),
        None => SimWorld::new(cli.grid_size),
    };
    world.set_real_time_mode(cli.real_time);

    info!(
        "starting simulation: {} ticks, {}x{} grid",
        cli.ticks, cli.grid_size, cli.grid_size
    );

    let mut last_stats = None;
    for tick in 1..=cli.ticks {
        let snapshot = world.tick();

        if cli.summary_every > 0 && tick % cli.summary_every == 0 {
            let queued: usize = snapshot.queue_map.values().sum();
            info!(
                "tick {} | vehicles: {} | avg speed: {:.2} | congestion: {}% | queued: {} | incidents: {}",
                tick,
                snapshot.stats.total_vehicles,
                snapshot.stats.avg_speed,
                snapshot.stats.congestion_level,
                queued,
                snapshot.stats.incident_count
            );
        }

        last_stats = Some(snapshot.stats);
    }

    let stats = last_stats.unwrap_or_default();
    info!("=== SIMULATION COMPLETE ===");
    info!("Total vehicles spawned: {}", world.total_spawned());
    info!("Active vehicles: {}", stats.total_vehicles);
    info!("Total intersections: {}", world.intersections.len());
    info!("Total road segments: {}", world.roads.len());
    info!("Average speed: {:.2}", stats.avg_speed);
    info!("Open incidents: {}", world.incidents.len());
}
