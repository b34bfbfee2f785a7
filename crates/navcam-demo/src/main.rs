//! Headless demo that drives the navigation controller through scripted
//! sessions against a procedural scene and logs the published camera poses.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p navcam-demo -- --scenario follow` to watch the follow
//! mode in the log, or `RUST_LOG=navcam_camera=debug` for every mode change.

mod scene;
mod script;

use clap::Parser;
use navcam_camera::{FollowParams, NavEvent, NavigationController, Subscription};
use navcam_config::{CliArgs, Config};
use navcam_input::InputSampler;
use navcam_math::rotation_to_angles;
use tracing::{error, info, warn};

use crate::scene::DemoScene;
use crate::script::{Scenario, Step};

#[derive(Parser, Debug)]
#[command(name = "navcam-demo", about = "Scripted camera navigation session")]
struct DemoArgs {
    #[command(flatten)]
    cli: CliArgs,

    /// Which scripted session to run.
    #[arg(long, value_enum, default_value_t = Scenario::Tour)]
    scenario: Scenario,

    /// Frames per gesture.
    #[arg(long, default_value_t = 90)]
    frames: u32,

    /// Seed for the procedural scene.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of crates in the scene.
    #[arg(long, default_value_t = 24)]
    crates: usize,

    /// Log the camera pose every N frames.
    #[arg(long, default_value_t = 30)]
    log_every: u64,
}

const FRAME_DT: f32 = 1.0 / 60.0;
/// Frames between checks for an edited `config.ron`.
const RELOAD_INTERVAL: u64 = 120;

struct Session {
    nav: NavigationController,
    scene: DemoScene,
    sampler: InputSampler,
    events: Subscription,
    /// Effective configuration: file contents plus CLI overrides and bookmarks.
    config: Config,
    /// Configuration as last read from disk.
    on_disk: Config,
    cli: CliArgs,
    config_dir: std::path::PathBuf,
    frame: u64,
    log_every: u64,
}

impl Session {
    fn run(&mut self, steps: &[Step]) {
        for step in steps {
            match step {
                Step::Gesture { gesture, frames } => {
                    for i in 0..*frames {
                        gesture.feed(&mut self.sampler, i, *frames);
                        self.tick();
                    }
                }
                Step::Idle { frames } => {
                    for _ in 0..*frames {
                        self.tick();
                    }
                }
                Step::Follow {
                    entity,
                    allow_rotation,
                    stop_on_click,
                } => {
                    let params = FollowParams {
                        allow_rotation: *allow_rotation,
                        stop_on_click: *stop_on_click,
                        ..self.nav.default_follow_params()
                    };
                    if let Err(e) = self.nav.start_following(*entity, params, &self.scene) {
                        warn!("Could not follow {entity}: {e}");
                    }
                }
                Step::Focus(entity) => {
                    if let Err(e) = self.nav.focus_on_object(*entity, None, None, &self.scene) {
                        warn!("Could not focus {entity}: {e}");
                    }
                }
                Step::StopFollowing => self.nav.stop_following(&self.scene),
                Step::Bookmark(name) => {
                    let viewpoint = self.nav.capture_viewpoint(*name);
                    info!("Bookmarked '{name}' at {:?}", viewpoint.anchor);
                    self.config.upsert_viewpoint(viewpoint);
                }
                Step::Recall(name) => match self.config.viewpoint(name) {
                    Some(viewpoint) => self.nav.recall_viewpoint(viewpoint),
                    None => warn!("No viewpoint named '{name}'"),
                },
                Step::DespawnDrone => self.scene.despawn_drone(),
                Step::Preset(preset) => {
                    self.sampler.on_view_preset(*preset);
                    self.tick();
                }
                Step::ResetView => {
                    self.sampler.on_reset_view();
                    self.tick();
                }
                Step::BlockRotation(block) => {
                    info!("Rotation blocked: {block}");
                    self.nav.block_rotation(*block, false);
                }
            }
        }
    }

    fn tick(&mut self) {
        let input = self.sampler.frame();
        let transform = self.nav.update(&input, &self.scene, FRAME_DT);
        self.sampler.clear_transients();
        self.scene.advance(FRAME_DT);
        self.frame += 1;

        for event in self.events.receiver.try_iter() {
            match event {
                NavEvent::ModeChanged { from, to } => {
                    info!("Frame {}: {from:?} -> {to:?}", self.frame);
                }
                NavEvent::FollowOrbit { active } => {
                    info!("Frame {}: follow orbit active={active}", self.frame);
                }
                NavEvent::InterpolationFinished => {
                    info!("Frame {}: interpolation finished", self.frame);
                }
            }
        }

        if self.log_every > 0 && self.frame % self.log_every == 0 {
            let angles = rotation_to_angles(transform.rotation);
            info!(
                "Frame {}: mode={:?} pos=({:.2}, {:.2}, {:.2}) pitch={:.1} yaw={:.1} dist={:.2}",
                self.frame,
                self.nav.mode(),
                transform.position.x,
                transform.position.y,
                transform.position.z,
                angles.x,
                angles.y,
                self.nav.pose().distance,
            );
        }

        if self.frame % RELOAD_INTERVAL == 0 {
            self.hot_reload();
        }
    }

    fn hot_reload(&mut self) {
        match self.on_disk.reload(&self.config_dir) {
            Ok(Some(reloaded)) => {
                self.on_disk = reloaded.clone();
                let mut next = reloaded;
                next.apply_cli_overrides(&self.cli);
                // Bookmarks taken during the session win over the file.
                for viewpoint in &self.config.viewpoints {
                    next.upsert_viewpoint(viewpoint.clone());
                }
                match self.nav.apply_config(next.clone()) {
                    Ok(()) => {
                        info!("Reloaded configuration from disk");
                        self.config = next;
                    }
                    Err(e) => warn!("Ignoring edited configuration: {e}"),
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Config reload failed: {e}"),
        }
    }
}

fn main() {
    let args = DemoArgs::parse();

    // Resolve config directory
    let config_dir = args.cli.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("navcam")
    });

    // Load or create config, then apply CLI overrides
    let on_disk = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    let mut config = on_disk.clone();
    config.apply_cli_overrides(&args.cli);

    // Initialize logging with config and debug settings
    let log_dir = config_dir.join("logs");
    navcam_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let mut nav = match NavigationController::new(config.clone()) {
        Ok(nav) => nav,
        Err(e) => {
            error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    let events = nav.subscribe();

    info!(
        "Running {:?} scenario: {} frames per gesture, seed {}",
        args.scenario, args.frames, args.seed
    );

    let mut session = Session {
        nav,
        scene: DemoScene::generate(args.seed, args.crates),
        sampler: InputSampler::new(),
        events,
        config,
        on_disk,
        cli: args.cli,
        config_dir,
        frame: 0,
        log_every: args.log_every,
    };
    session
        .sampler
        .on_cursor_moved(session.nav.lens().width * 0.5, session.nav.lens().height * 0.5);
    let steps = args.scenario.steps(args.frames.max(2));
    session.run(&steps);

    let end = session.nav.capture_viewpoint("last-session");
    session.config.upsert_viewpoint(end);
    if let Err(e) = session.config.save(&session.config_dir) {
        warn!("Failed to save config: {e}");
    }

    let t = session.nav.transform();
    info!(
        "Finished after {} frames at ({:.2}, {:.2}, {:.2}), mode {:?}",
        session.frame,
        t.position.x,
        t.position.y,
        t.position.z,
        session.nav.mode()
    );
}
