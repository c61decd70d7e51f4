//! field_study: a week of colony missions around Schiaparelli Base.
//!
//! Proposes one mission of every kind (a field study, an exploration, a
//! mining trip, a rescue of a stranded rover, a drone trade run, and a
//! relocation), runs the driver for seven sols, and writes mission events
//! and summaries to `output/field_study/`.
//!
//! Usage: `field_study [mission_config.json]`.  Log verbosity follows
//! `RUST_LOG` (default `info`).

mod colony;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cm_core::{MissionConfig, SimConfig, Tick};
use cm_mission::missions::{self, SurplusValuer};
use cm_mission::{Mission, MissionEvent};
use cm_output::{CsvWriter, MissionOutputObserver, OutputWriter};
use cm_sim::{SimBuilder, SimObserver};

use colony::{build_colony, BASE_LOCATION};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:                  u64 = 42;
const MILLISOLS_PER_TICK:    f64 = 5.0;
const SIM_SOLS:              u64 = 7;
const OUTPUT_INTERVAL_TICKS: u64 = 200; // progress line every sol
const OUTPUT_DIR:            &str = "output/field_study";

// ── Observer wrapper to count rows ───────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:        MissionOutputObserver<W>,
    event_rows:   usize,
    summary_rows: usize,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: MissionOutputObserver<W>) -> Self {
        Self { inner, event_rows: 0, summary_rows: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_mission_event(&mut self, event: &MissionEvent) {
        self.event_rows += 1;
        self.inner.on_mission_event(event);
    }

    fn on_mission_end(&mut self, mission: &Mission) {
        self.summary_rows += 1;
        info!(mission = %mission.id(), kind = %mission.mission_type(), statuses = ?mission.statuses(), "mission finished");
        self.inner.on_mission_end(mission);
    }

    fn on_tick_end(&mut self, tick: Tick, steps: usize) {
        self.inner.on_tick_end(tick, steps);
    }

    fn on_snapshot(&mut self, tick: Tick, active: &[Mission]) {
        let phases: Vec<String> = active.iter().map(|m| format!("{}:{}", m.id().0, m.phase())).collect();
        info!(%tick, active = active.len(), phases = %phases.join(" "), "progress");
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

fn load_mission_config() -> Result<MissionConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(MissionConfig::default());
    };
    let file = File::open(&path).with_context(|| format!("opening {path}"))?;
    let config: MissionConfig =
        serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing {path}"))?;
    info!(%path, "mission config loaded");
    Ok(config)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("=== field_study: colony mission engine ===");
    println!("Sols: {SIM_SOLS}  |  Seed: {SEED}  |  {MILLISOLS_PER_TICK} msol per tick");
    println!();

    // 1. Configuration.
    let mission_config = load_mission_config()?;
    let config = SimConfig {
        millisols_per_tick:    MILLISOLS_PER_TICK,
        total_ticks:           SIM_SOLS * (1_000.0 / MILLISOLS_PER_TICK) as u64,
        seed:                  SEED,
        output_interval_ticks: OUTPUT_INTERVAL_TICKS,
    };

    // 2. Colony and driver.
    let (world, r) = build_colony()?;
    println!(
        "Colony: {} settlements, {} vehicles, {} members",
        world.settlements.len(),
        world.vehicles.len(),
        world.member_count()
    );
    let mut sim = SimBuilder::new(config.clone(), world)
        .mission_config(mission_config)
        .build()?;

    // 3. Proposals.
    let study = sim.propose(|id, ctx, rng| {
        missions::field_study(id, r.geologist, &[r.medic], ctx, rng)
    })?;
    let survey = sim.propose(|id, ctx, rng| {
        missions::exploration(id, r.engineer, 3, &[r.biologist], ctx, rng)
    })?;
    let deposits = [
        BASE_LOCATION.destination(0.8, 90.0),
        BASE_LOCATION.destination(2.5, 40.0),
        BASE_LOCATION.destination(4.0, 2_500.0),
    ];
    let dig = sim.propose(|id, ctx, _| missions::mining(id, r.miner, &deposits, &[r.rover_bot], ctx))?;
    let excluded = sim.rescue_targets();
    let rescue = sim.propose(|id, ctx, _| missions::rescue_salvage(id, r.pilot, &[], &excluded, ctx))?;
    let move_out = sim.propose(|id, ctx, _| {
        missions::travel_to_settlement(id, r.settler, Some(r.outpost), &[], ctx)
    })?;
    // Every rover is taken by now, so the trade run flies the drone.
    let run = sim.propose(|id, ctx, _| missions::trade(id, r.courier, &SurplusValuer, &[], ctx))?;
    println!(
        "Proposed: study {study}, survey {survey}, mining {dig}, rescue {rescue}, relocation {move_out}, trade {run}"
    );
    println!("Rescue target: {} (carrying {})", r.stranded, r.survivor);
    println!();

    // 4. Output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = CountingObserver::new(MissionOutputObserver::new(writer, &config));

    // 5. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 6. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  mission_events.csv    : {} rows", obs.event_rows);
    println!("  mission_summaries.csv : {} rows", obs.summary_rows);
    println!();

    println!("{:<4} {:<22} {:<14} {:<40}", "Id", "Kind", "Phase", "Outcome");
    println!("{}", "-".repeat(82));
    for mission in sim.finished.iter().chain(sim.active.iter()) {
        let outcome = if mission.is_done() {
            mission.statuses().iter().map(|s| s.label()).collect::<Vec<_>>().join("; ")
        } else {
            String::from("still running")
        };
        println!(
            "{:<4} {:<22} {:<14} {:<40}",
            mission.id().0,
            mission.mission_type().to_string(),
            mission.phase().to_string(),
            outcome,
        );
    }

    println!();
    for settlement in &sim.world.settlements {
        let people = sim.world.members().filter(|m| m.home() == settlement.id).count();
        println!("{:<20} {people} residents", settlement.name);
    }

    Ok(())
}
