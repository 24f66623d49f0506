//! IsoARPG - headless simulation demo
//!
//! Builds a small arena, then drives the simulation from a fixed-step frame
//! clock with scripted input and logs what the renderer would see.

mod settings;

use anyhow::{Context, Result};
use enjon_core::{cartesian_to_iso, FrameClock, TimeConfig};
use enjon_ecs::{AttributeMask, EntityId};
use enjon_game::{factory, ProfileRegistry, Simulation, SpawnDesc, World};
use glam::{Vec2, Vec3};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use settings::{DemoSettings, Settings};

fn spawn_at(name: &str, cartesian: Vec2, size: f32) -> SpawnDesc {
    SpawnDesc::new(name, cartesian_to_iso(cartesian).extend(0.0), Vec2::splat(size))
}

/// Player with a starting axe, a ring of monsters, some crates and a grenade.
fn populate(world: &mut World, demo: &DemoSettings) -> Result<EntityId> {
    let player = factory::create_player(world, &spawn_at("Hero", Vec2::ZERO, 16.0))
        .context("Failed to spawn player")?;
    let axe = factory::create_weapon(world, &spawn_at("Axe", Vec2::ZERO, 8.0), "Axe")?;
    enjon_game::inventory::pickup(world, player, axe);

    for i in 0..demo.ai_count {
        let angle = std::f32::consts::TAU * i as f32 / demo.ai_count.max(1) as f32;
        let position = Vec2::new(angle.cos(), angle.sin()) * 200.0;
        let loot = if i % 4 == 0 { "Elite" } else { "Monster1" };
        if let Err(e) = factory::create_ai(world, &spawn_at("Beast", position, 16.0), loot) {
            warn!("Stopped spawning monsters: {}", e);
            break;
        }
    }

    for x in [-120.0, 0.0, 120.0] {
        factory::create_prop(world, &spawn_at("Crate", Vec2::new(x, -80.0), 24.0))?;
    }
    factory::create_grenade(
        world,
        &spawn_at("Grenade", Vec2::new(10.0, 0.0), 6.0),
        player,
        Vec3::new(1.0, 0.5, 0.0),
        24.0,
    )?;
    factory::create_vortex(world, cartesian_to_iso(Vec2::new(-220.0, 160.0)).extend(0.0), player)?;
    Ok(player)
}

/// Walk in a slow square and keep swinging.
fn script_input(world: &mut World, frame: u32) {
    let input = &mut world.input;
    input.clear();
    input.press("Space");
    let key = match (frame / 90) % 4 {
        0 => "D",
        1 => "W",
        2 => "A",
        _ => "S",
    };
    input.press(key);
    if frame % 180 < 30 {
        input.press("LShift");
    }
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting IsoARPG simulation...");

    let settings = Settings::load();
    let demo = settings.demo.clone();

    let mut profiles = ProfileRegistry::new();
    if let Some(path) = &demo.profiles {
        match profiles.load_file(path) {
            Ok(count) => info!("Loaded {} profiles from {:?}", count, path),
            Err(e) => warn!("Failed to load profiles: {}, using built-ins", e),
        }
    }

    let world = World::with_profiles(settings.simulation.clone(), profiles)
        .context("Failed to allocate simulation world")?;
    let mut sim = Simulation::with_world(world);
    let player = populate(&mut sim.world, &demo)?;

    let mut clock = FrameClock::new(TimeConfig {
        fixed_timestep: settings.simulation.timestep,
        ..Default::default()
    });

    for frame in 0..demo.frames {
        clock.advance(demo.frame_time);
        for _ in 0..clock.drain_ticks() {
            script_input(&mut sim.world, frame);
            sim.tick();
        }

        if !sim.world.is_active(player) {
            info!("Hero fell on frame {}", frame);
            break;
        }
        if demo.report_every > 0 && frame % demo.report_every == 0 {
            let world = &sim.world;
            let loose = world.count_with(AttributeMask::ITEM)
                - world.count_with(AttributeMask::ITEM | AttributeMask::PICKED_UP);
            info!(
                "Frame {}: {} renderables, {} monsters, {} loose items, hero health {:.1}",
                frame,
                world.render_snapshot().len(),
                world.count_with(AttributeMask::AI),
                loose,
                world.health_of(player)?
            );
        }
    }

    let carried = sim
        .world
        .manager
        .inventory(player)
        .map(|inv| inv.len())
        .unwrap_or_default();
    info!(
        "Finished after {} ticks ({:.2}s simulated), hero carries {} items",
        sim.ticks(),
        clock.total_time,
        carried
    );

    if demo.save_on_exit {
        settings.save()?;
    }
    Ok(())
}
