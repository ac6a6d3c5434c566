//! Turn engine binary for the Sectomie simulation.
//!
//! Loads configuration, resumes the saved game (or seeds a fresh world),
//! plays the configured number of turns for the player sect, and saves.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `sectomie-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load the save file, or seed the starting world
//! 4. Play `simulation.turns` turns
//! 5. Log a roster summary and save

mod error;
mod seed;

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use sectomie_core::{ActionSummary, GameSession, SimulationConfig, TurnReport};
use sectomie_cultivators::{combat_power, sect_total_power};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Config file looked up in the working directory.
const CONFIG_FILE: &str = "sectomie-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, loading, a turn, or saving fails.
fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config);
    info!(
        world = config.world.name,
        config_file = from_file,
        turns = config.simulation.turns,
        seed = ?config.simulation.seed,
        "sectomie-engine starting"
    );

    // 3. Resume or seed.
    let mut session = load_or_seed(&config)?;
    info!(
        turn = session.calendar().current_turn(),
        date = %session.calendar().date(),
        player_sect = session.player_sect().map_or("", |s| s.name.as_str()),
        "game ready"
    );

    // 4. Play.
    let mut rng = config
        .simulation
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    for _ in 0..config.simulation.turns {
        let report = session.end_turn(&mut rng)?;
        log_turn(&report);
    }

    // 5. Summarize and save.
    log_roster(&session);
    if config.persistence.autosave {
        session.save_to_file(&config.persistence.save_path)?;
    }

    info!(
        turn = session.calendar().current_turn(),
        "sectomie-engine shutdown complete"
    );
    Ok(())
}

/// Load `sectomie-config.yaml` if present, else defaults.
fn load_config() -> Result<(SimulationConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        Ok((SimulationConfig::from_file(config_path)?, true))
    } else {
        let mut config = SimulationConfig::default();
        config.persistence.apply_env_overrides();
        Ok((config, false))
    }
}

fn init_logging(config: &SimulationConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

fn load_or_seed(config: &SimulationConfig) -> Result<GameSession, EngineError> {
    let save_path = &config.persistence.save_path;
    if save_path.exists() {
        return Ok(GameSession::load_from_file(save_path, config.clone())?);
    }
    info!(path = %save_path.display(), "no save found, seeding a new world");
    let roster = seed::seed_world()?;
    Ok(GameSession::new(config.clone(), roster)?)
}

fn log_turn(report: &TurnReport) {
    for deviation in &report.deviations {
        warn!(
            turn = report.turn,
            member = %deviation.name,
            qi_lost = deviation.qi_lost,
            "deviation during seclusion"
        );
    }
    for incident in &report.attribute_increases {
        for gain in &incident.gains {
            info!(
                turn = report.turn,
                member = %incident.name,
                attribute = %gain.attribute,
                new_value = gain.new_value,
                "attribute improved"
            );
        }
    }
    for event in &report.breakthroughs {
        info!(turn = report.turn, member = %event.name, "{}", event.message);
    }

    info!(turn = report.turn, "{}", report.message());
    match serde_json::to_string(report) {
        Ok(json) => debug!(turn = report.turn, report = %json, "turn report"),
        Err(err) => warn!(turn = report.turn, %err, "turn report not serializable"),
    }
}

fn log_roster(session: &GameSession) {
    let roster = session.roster();
    for sect in roster.sects() {
        info!(
            sect = %sect.name,
            tier = sect.tier_name(),
            spirit_stones = sect.spirit_stones,
            spirit_herbs = sect.spirit_herbs,
            members = sect.members().len(),
            power = sect_total_power(roster, sect.id),
            "sect summary"
        );
        for member in roster.members_of(sect.id) {
            info!(
                sect = %sect.name,
                member = %member.name,
                rank = member.rank_label(),
                qi = member.qi(),
                max_qi = member.max_qi(),
                bottleneck = member.bottleneck.label(),
                power = combat_power(member),
                "member summary"
            );
        }
    }
}
