use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use chase_arena::config::GameConfig;
use chase_arena::constants::TILE_SIZE;
use chase_arena::engine::LevelObserver;
use chase_arena::error::ConfigError;
use chase_arena::game::Game;
use chase_arena::maze::{ArenaMap, Grid};
use chase_arena::physics::{unit, Vec2};
use chase_arena::types::{Direction, Phase};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};

const DEFAULT_MAP: &str = "\
1111111111111111111
1z777777777777777z1
1717171717171717171
1777777777777777771
1717171717171717171
17777777b7777777771
1717171717171717171
1777777s7i7c7777771
1717171717171717171
177777777p777777771
1717171717171717171
1777777777777777771
1717171717171717171
1z777777777777777z1
1111111111111111111";

const DEFAULT_CONFIG: &str = r#"{
  "mapFile": "demos/arena.txt",
  "numLives": 3,
  "levels": [
    {
      "playerSpeed": 2.0,
      "pursuerSpeeds": { "patrol": 1.0, "pursue": 2.0, "vulnerable": 1.0 },
      "modeSeconds": { "patrol": 7, "pursue": 20, "vulnerable": 7 }
    },
    {
      "playerSpeed": 2.0,
      "pursuerSpeeds": { "patrol": 2.0, "pursue": 2.0, "vulnerable": 1.0 },
      "modeSeconds": { "patrol": 5, "pursue": 25, "vulnerable": 5 }
    },
    {
      "playerSpeed": 4.0,
      "pursuerSpeeds": { "patrol": 2.0, "pursue": 4.0, "vulnerable": 1.0 },
      "modeSeconds": { "patrol": 5, "pursue": 30, "vulnerable": 4 }
    }
  ]
}"#;

/// Headless simulation runner: drives a scripted player through a full run
/// and emits structured JSON log lines plus a final summary.
#[derive(Parser, Debug)]
#[command(name = "simulate")]
struct Cli {
    /// Arena layout file; defaults to the built-in arena.
    #[arg(long)]
    map: Option<PathBuf>,
    /// Game configuration JSON; defaults to the built-in tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Simulation seed; random when omitted.
    #[arg(long)]
    seed: Option<u32>,
    /// Comma-separated scripted moves (up/down/left/right or u/d/l/r),
    /// applied one per tick; the auto-player takes over afterwards.
    #[arg(long, value_delimiter = ',')]
    moves: Vec<String>,
    /// Hard tick limit for the run.
    #[arg(long, default_value_t = 36_000)]
    max_ticks: u64,
    /// Emit a snapshot log line every N ticks (0 disables).
    #[arg(long, default_value_t = 600)]
    snapshot_every: u64,
    /// Also write the final summary JSON to this file.
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum LevelEvent {
    ScoreChanged { delta: u32 },
    LivesChanged { lives: u32 },
    PhaseChanged { phase: Phase },
}

#[derive(Clone, Default)]
struct EventBuffer(Rc<RefCell<Vec<LevelEvent>>>);

impl LevelObserver for EventBuffer {
    fn score_changed(&mut self, delta: u32) {
        self.0.borrow_mut().push(LevelEvent::ScoreChanged { delta });
    }

    fn lives_changed(&mut self, lives: u32) {
        self.0.borrow_mut().push(LevelEvent::LivesChanged { lives });
    }

    fn phase_changed(&mut self, phase: Phase) {
        self.0.borrow_mut().push(LevelEvent::PhaseChanged { phase });
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary {
    seed: u32,
    ticks_run: u64,
    final_phase: Phase,
    level_index: usize,
    score: u32,
    lives: u32,
    items_remaining: usize,
    started_at: String,
    finished_at: String,
}

fn emit_log(level: &str, event: &str, details: Value) {
    let line = json!({
        "timestamp": Utc::now().to_rfc3339(),
        "level": level,
        "event": event,
        "details": details,
    });
    println!("{line}");
}

fn load_config(cli: &Cli) -> Result<GameConfig, ConfigError> {
    match &cli.config {
        Some(path) => GameConfig::load(path),
        None => GameConfig::from_json_str(DEFAULT_CONFIG),
    }
}

fn load_map_text(cli: &Cli, config: &GameConfig) -> Result<String, ConfigError> {
    if let Some(path) = &cli.map {
        return Ok(fs::read_to_string(path)?);
    }
    if let Some(config_path) = &cli.config {
        // The map path in a config file is relative to that file.
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        return Ok(fs::read_to_string(base.join(&config.map_file))?);
    }
    Ok(DEFAULT_MAP.to_string())
}

/// Scripted player: when tile-aligned, greedily head for the nearest
/// collectable item, never reversing unless there is no other way.
fn auto_direction(map: &ArenaMap, game: &Game) -> Option<Direction> {
    let snapshot = game.snapshot();
    let player = Vec2::new(snapshot.player.x, snapshot.player.y);
    let center = player.add(Vec2::new(TILE_SIZE / 2.0, TILE_SIZE / 2.0));
    if !Grid::is_tile_aligned(center) {
        return None;
    }
    let target = snapshot
        .items
        .iter()
        .filter(|item| item.collectable)
        .map(|item| Vec2::new(item.x, item.y))
        .min_by(|a, b| a.distance(player).total_cmp(&b.distance(player)))?;

    let facing = snapshot.player.dir;
    let mut best: Option<(f64, Direction)> = None;
    for dir in map.grid.possible_directions(center, facing) {
        if facing != Direction::None && dir == facing.opposite() {
            continue;
        }
        let step = player.add(unit(dir).scale(TILE_SIZE));
        let distance = step.distance(target);
        if best.map(|(b, _)| distance < b).unwrap_or(true) {
            best = Some((distance, dir));
        }
    }
    best.map(|(_, dir)| dir)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);

    let mut scripted = Vec::with_capacity(cli.moves.len());
    for token in &cli.moves {
        match Direction::parse_move(token) {
            Some(dir) => scripted.push(dir),
            None => {
                emit_log("error", "movesRejected", json!({ "token": token }));
                return ExitCode::from(2);
            }
        }
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            emit_log("error", "configRejected", json!({ "error": err.to_string() }));
            return ExitCode::from(2);
        }
    };
    let map_text = match load_map_text(&cli, &config) {
        Ok(text) => text,
        Err(err) => {
            emit_log("error", "mapUnreadable", json!({ "error": err.to_string() }));
            return ExitCode::from(2);
        }
    };
    let map = match ArenaMap::parse(&map_text) {
        Ok(map) => map,
        Err(err) => {
            emit_log("error", "mapRejected", json!({ "error": err.to_string() }));
            return ExitCode::from(2);
        }
    };

    let mut game = match Game::new(&config, map.clone(), seed) {
        Ok(game) => game,
        Err(err) => {
            emit_log("error", "configRejected", json!({ "error": err.to_string() }));
            return ExitCode::from(2);
        }
    };

    let events = EventBuffer::default();
    game.register_observer(Box::new(events.clone()));

    emit_log(
        "info",
        "runStarted",
        json!({
            "seed": seed,
            "levels": config.levels.len(),
            "maxTicks": cli.max_ticks,
            "arena": { "width": map.grid.width(), "height": map.grid.height() },
        }),
    );
    let started_at = Utc::now();

    let mut ticks_run = 0u64;
    for tick in 0..cli.max_ticks {
        let dir = scripted
            .get(tick as usize)
            .copied()
            .or_else(|| auto_direction(&map, &game));
        if let Some(dir) = dir {
            game.push_move(dir);
        }
        let level_before = game.level_index();
        game.tick();
        ticks_run = tick + 1;

        for event in events.0.borrow_mut().drain(..) {
            emit_log(
                "info",
                "levelEvent",
                json!({ "tick": ticks_run, "detail": event }),
            );
        }
        if game.level_index() != level_before {
            emit_log(
                "info",
                "levelAdvanced",
                json!({ "tick": ticks_run, "levelIndex": game.level_index() }),
            );
        }
        if cli.snapshot_every > 0 && ticks_run % cli.snapshot_every == 0 {
            emit_log(
                "debug",
                "snapshot",
                serde_json::to_value(game.snapshot()).unwrap_or(Value::Null),
            );
        }
        if matches!(game.phase(), Phase::Lost | Phase::Won) {
            break;
        }
    }

    let summary = RunSummary {
        seed,
        ticks_run,
        final_phase: game.phase(),
        level_index: game.level_index(),
        score: game.level().score(),
        lives: game.level().lives(),
        items_remaining: game.level().items_remaining(),
        started_at: started_at.to_rfc3339(),
        finished_at: Utc::now().to_rfc3339(),
    };
    emit_log(
        "info",
        "runFinished",
        serde_json::to_value(&summary).unwrap_or(Value::Null),
    );
    if let Some(path) = &cli.summary_out {
        let text = match serde_json::to_string_pretty(&summary) {
            Ok(text) => text,
            Err(err) => {
                emit_log("error", "summaryWriteFailed", json!({ "error": err.to_string() }));
                return ExitCode::from(2);
            }
        };
        if let Err(err) = fs::write(path, text) {
            emit_log("error", "summaryWriteFailed", json!({ "error": err.to_string() }));
            return ExitCode::from(2);
        }
    }
    ExitCode::SUCCESS
}
