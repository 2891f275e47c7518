//! # ecs_app
//!
//! Demo driver for the entity system.
//!
//! 1. Open the JSON level store (created if missing).
//! 2. Load the requested level, or spawn a fresh scene if it is empty.
//! 3. Run the update and draw passes for a number of steps.
//! 4. Save the level and write the store back to disk.

mod components;
mod systems;
mod transform;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ecs_component::entity::DEFAULT_MAX_ENTITY_ID;
use ecs_component::{EntityManager, ManagerConfig};
use ecs_data::{DataAdapter, LevelInfo, LevelStore, MemoryLevelStore, Transformer};
use ecs_system::{ExecutionType, World};

use components::{Name, Position, Velocity};
use systems::{Movement, Report, Wrap};
use transform::SelectionTransformer;

const ARENA_SIZE: f32 = 100.0;

#[derive(Parser, Debug)]
#[command(name = "ecs_app", about = "Run a level of the entity system demo")]
struct Args {
    /// Path to the JSON level store
    #[arg(short, long, default_value = "levels.json")]
    store: PathBuf,

    /// Level number to load and save
    #[arg(short, long, default_value_t = 1)]
    level: i32,

    /// Number of frames to run
    #[arg(long, default_value_t = 60)]
    steps: u64,

    /// Milliseconds to sleep between frames
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Entities to spawn when the level is empty
    #[arg(long, default_value_t = 8)]
    spawn: usize,

    /// Largest entity id the manager may hand out
    #[arg(long, default_value_t = DEFAULT_MAX_ENTITY_ID)]
    max_entity_id: u64,

    /// List the levels in the store and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ecs_app=info".parse()?))
        .init();

    let args = Args::parse();

    let store = open_store(&args.store)?;
    let mut adapter = DataAdapter::new(store, components::codecs())
        .with_transformer(SelectionTransformer);

    if args.list {
        for level in adapter.try_get_levels()? {
            info!(
                number = level.number,
                name = %level.name,
                description = %level.description,
                "level"
            );
        }
        return Ok(());
    }

    if adapter.store().level(args.level)?.is_none() {
        info!(level = args.level, "defining new level");
        adapter.store_mut().define_level(LevelInfo::new(
            args.level,
            format!("Level {}", args.level),
            "Generated by ecs_app",
        ));
    }

    let mut world = World::with_config(ManagerConfig::new().with_max_entity_id(args.max_entity_id));
    let loaded = adapter
        .try_load_level(world.entities_mut(), args.level)
        .with_context(|| format!("loading level {}", args.level))?;
    if loaded == 0 {
        let spawned = spawn_scene(world.entities_mut(), args.spawn)?;
        info!(spawned, "level was empty, spawned a fresh scene");
        SelectionTransformer.transform_post_load(world.entities_mut());
    }

    world.add_system(Movement, ExecutionType::Update)?;
    world.add_system(Wrap { size: ARENA_SIZE }, ExecutionType::Update)?;
    world.add_system(Report { every: 10 }, ExecutionType::Draw)?;

    let frame = Duration::from_millis(args.frame_ms);
    let mut failures = 0;
    for _ in 0..args.steps {
        failures += world.step();
        failures += world.draw();
        std::thread::sleep(frame);
    }
    if failures > 0 {
        warn!(failures, "some systems failed while running");
    }

    let rows = adapter
        .try_save_level(world.entities_mut(), args.level)
        .with_context(|| format!("saving level {}", args.level))?;
    save_store(&args.store, adapter.store())?;

    info!(
        level = args.level,
        frames = world.game_step().frame(),
        rows,
        store = %args.store.display(),
        "level saved"
    );
    Ok(())
}

fn open_store(path: &Path) -> Result<MemoryLevelStore> {
    if !path.exists() {
        info!(store = %path.display(), "no level store found, starting empty");
        return Ok(MemoryLevelStore::new());
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading level store {}", path.display()))?;
    Ok(MemoryLevelStore::from_json(&json)?)
}

fn save_store(path: &Path, store: &MemoryLevelStore) -> Result<()> {
    std::fs::write(path, store.to_json()?)
        .with_context(|| format!("writing level store {}", path.display()))
}

fn spawn_scene(entities: &mut EntityManager, count: usize) -> Result<usize> {
    for i in 0..count {
        let entity = entities.create_entity()?;
        let step = i as f32;
        entities.add_component(
            entity,
            Position {
                x: (step * 13.0) % ARENA_SIZE,
                y: (step * 29.0) % ARENA_SIZE,
            },
        )?;
        entities.add_component(
            entity,
            Velocity {
                dx: 5.0 + step,
                dy: 10.0 - 2.0 * step,
            },
        )?;
        entities.add_component(entity, Name(format!("mover-{i}")))?;
    }
    Ok(count)
}
