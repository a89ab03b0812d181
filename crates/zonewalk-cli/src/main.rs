use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use zonewalk_core::drift::NoteDrift;
use zonewalk_core::host::ManualHost;
use zonewalk_core::scenes::SceneCarousel;
use zonewalk_core::stage::Stage;
use zonewalk_core::surface::{DrawCommand, Recorder};
use zonewalk_core::survey::survey;
use zonewalk_core::{
    AnimatorConfig, EffectsConfig, GridAnimator, MapScene, Viewport, ZoneGrid, ZoneType,
};

#[derive(Parser, Debug)]
#[command(name = "zonewalk", about = "Procedural zone maps and their frame-driven animation")]
struct Cli {
    /// JSON file with optional `map` and `drift` sections.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = 42)]
    seed: u64,

    #[arg(long, global = true, default_value_t = 1280.0)]
    width: f64,

    #[arg(long, global = true, default_value_t = 720.0)]
    height: f64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the generated zone grid as letters.
    Map,
    /// Print the agent's waypoints as JSON.
    Path,
    /// Drive the zone map, glyph overlay and scene card for a number of ticks.
    Run {
        #[arg(long, default_value_t = 600)]
        ticks: usize,
        /// Simulated milliseconds per tick; timers follow this clock.
        #[arg(long, default_value_t = 16)]
        frame_ms: u64,
        /// Tick at which the map section scrolls out of view.
        #[arg(long)]
        hide_at: Option<usize>,
        /// Tick at which it scrolls back in.
        #[arg(long)]
        show_at: Option<usize>,
        /// Tick at which the whole tab goes to the background.
        #[arg(long)]
        tab_hidden_at: Option<usize>,
        /// Tick at which the tab comes back.
        #[arg(long)]
        tab_shown_at: Option<usize>,
        /// Tick at which the container is resized to --resize-width x --resize-height.
        #[arg(long)]
        resize_at: Option<usize>,
        #[arg(long, default_value_t = 800.0)]
        resize_width: f64,
        #[arg(long, default_value_t = 600.0)]
        resize_height: f64,
        #[arg(long)]
        reduced_motion: bool,
        /// Also dump the map's final frame draw commands.
        #[arg(long)]
        dump_frame: bool,
    },
    /// Summarise layouts over a range of seeds.
    Survey {
        #[arg(long, default_value_t = 256)]
        count: u64,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<EffectsConfig> {
    let config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?
        }
        None => EffectsConfig::default(),
    };
    config.validate().context("invalid config")?;
    Ok(config)
}

#[derive(Serialize)]
struct RunReport {
    ticks: usize,
    map_frames: usize,
    drift_frames: usize,
    map_commands: BTreeMap<&'static str, usize>,
    drift_glyphs_drawn: usize,
    frames_requested: u64,
    frames_cancelled: u64,
    live_subscriptions_after_teardown: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_map_frame: Option<Vec<DrawCommand>>,
}

fn command_kind(cmd: &DrawCommand) -> &'static str {
    match cmd {
        DrawCommand::Clear { .. } => "clear",
        DrawCommand::Line { .. } => "line",
        DrawCommand::FillRect { .. } => "fill_rect",
        DrawCommand::Segments { .. } => "segments",
        DrawCommand::Glow { .. } => "glow",
        DrawCommand::FillCircle { .. } => "fill_circle",
        DrawCommand::StrokeCircle { .. } => "stroke_circle",
        DrawCommand::Glyph { .. } => "glyph",
    }
}

struct RunPlan {
    ticks: usize,
    frame_ms: u64,
    hide_at: Option<usize>,
    show_at: Option<usize>,
    tab_hidden_at: Option<usize>,
    tab_shown_at: Option<usize>,
    resize_at: Option<usize>,
    resize_to: Viewport,
    reduced_motion: bool,
    dump_frame: bool,
}

fn run(config: &EffectsConfig, seed: u64, viewport: Viewport, plan: RunPlan) -> Result<RunReport> {
    let host = ManualHost::new(viewport).with_reduced_motion(plan.reduced_motion);
    let mut stage = Stage::new(host).with_frame_ms(plan.frame_ms);

    let map_surface = Rc::new(RefCell::new(Recorder::new()));
    let drift_surface = Rc::new(RefCell::new(Recorder::new()));

    let map_config = config.map.clone();
    let surface = Rc::clone(&map_surface);
    stage.mount(move |host| {
        GridAnimator::mount(host, Some(surface), ChaCha12Rng::seed_from_u64(seed), map_config)
    });
    let drift_config = config.drift.clone();
    let surface = Rc::clone(&drift_surface);
    stage.mount(move |host| {
        NoteDrift::mount(
            host,
            Some(surface),
            ChaCha12Rng::seed_from_u64(seed.wrapping_add(1)),
            drift_config,
        )
    });
    stage.mount(SceneCarousel::mount);

    // The map section starts on screen.
    stage.set_container_visible(true);

    for tick in 0..plan.ticks {
        if plan.hide_at == Some(tick) {
            info!("tick {tick}: map section hidden");
            stage.set_container_visible(false);
        }
        if plan.show_at == Some(tick) {
            info!("tick {tick}: map section shown");
            stage.set_container_visible(true);
        }
        if plan.tab_hidden_at == Some(tick) {
            info!("tick {tick}: tab hidden");
            stage.set_page_visible(false);
        }
        if plan.tab_shown_at == Some(tick) {
            info!("tick {tick}: tab shown");
            stage.set_page_visible(true);
        }
        if plan.resize_at == Some(tick) {
            info!("tick {tick}: resizing to {}x{}", plan.resize_to.width, plan.resize_to.height);
            stage.resize(plan.resize_to);
        }
        stage.tick();
    }

    let frames_requested = stage.host().frames_requested();
    let host = stage.teardown();

    let map = map_surface.borrow();
    let drift = drift_surface.borrow();
    let mut map_commands = BTreeMap::new();
    for cmd in map.commands() {
        *map_commands.entry(command_kind(cmd)).or_insert(0) += 1;
    }
    Ok(RunReport {
        ticks: plan.ticks,
        map_frames: map.count_where(|c| matches!(c, DrawCommand::Clear { .. })),
        drift_frames: drift.count_where(|c| matches!(c, DrawCommand::Clear { .. })),
        map_commands,
        drift_glyphs_drawn: drift.count_where(|c| matches!(c, DrawCommand::Glyph { .. })),
        frames_requested,
        frames_cancelled: host.frames_cancelled(),
        live_subscriptions_after_teardown: host.live_subscriptions(),
        last_map_frame: plan.dump_frame.then(|| map.last_frame().to_vec()),
    })
}

/// Grid and path for one seed, the same draws `map` and `path` both see.
fn build_scene(config: &AnimatorConfig, viewport: Viewport, seed: u64) -> Result<MapScene> {
    let (cols, rows) = viewport.grid_dims(config.cell_size);
    if cols == 0 || rows == 0 {
        bail!("viewport {}x{} has no cells", viewport.width, viewport.height);
    }
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    Ok(MapScene::build(viewport, config, &mut rng))
}

fn print_map(grid: &ZoneGrid) {
    print!("{grid}");
    println!();
    let histogram = grid.histogram();
    for zone in ZoneType::ALL {
        let cells = histogram[zone.index()];
        println!("{} {:<12} {cells}", zone.letter(), zone.name());
    }
    println!(". {:<12} {}", "background", grid.cols() * grid.rows() - grid.occupied_count());
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let viewport = Viewport::new(cli.width, cli.height);

    match cli.command {
        Command::Map => {
            let scene = build_scene(&config.map, viewport, cli.seed)?;
            print_map(scene.grid());
        }
        Command::Path => {
            let scene = build_scene(&config.map, viewport, cli.seed)?;
            println!("{}", serde_json::to_string_pretty(scene.path())?);
        }
        Command::Run {
            ticks,
            frame_ms,
            hide_at,
            show_at,
            tab_hidden_at,
            tab_shown_at,
            resize_at,
            resize_width,
            resize_height,
            reduced_motion,
            dump_frame,
        } => {
            let plan = RunPlan {
                ticks,
                frame_ms,
                hide_at,
                show_at,
                tab_hidden_at,
                tab_shown_at,
                resize_at,
                resize_to: Viewport::new(resize_width, resize_height),
                reduced_motion,
                dump_frame,
            };
            let report = run(&config, cli.seed, viewport, plan)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Survey { count } => {
            let summary = survey(&config.map, viewport, cli.seed..cli.seed.saturating_add(count))
                .context("survey failed")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
