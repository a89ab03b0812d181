use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;
use zonewalk_core::drift::NoteDrift;
use zonewalk_core::host::ManualHost;
use zonewalk_core::stage::Stage;
use zonewalk_core::surface::Recorder;
use zonewalk_core::{AnimatorConfig, DriftConfig, GridAnimator, MapScene, Viewport};

fn map_stage(viewport: Viewport, seed: u64) -> (Stage, Rc<RefCell<Recorder>>) {
    let surface = Rc::new(RefCell::new(Recorder::new()));
    let mut stage = Stage::new(ManualHost::new(viewport));
    let shared = Rc::clone(&surface);
    stage.mount(move |host| {
        GridAnimator::mount(
            host,
            Some(shared),
            ChaCha12Rng::seed_from_u64(seed),
            AnimatorConfig::default(),
        )
    });
    stage.set_container_visible(true);
    (stage, surface)
}

fn main() {
    let viewport = Viewport::new(2560.0, 1440.0);
    let (cols, rows) = viewport.grid_dims(AnimatorConfig::default().cell_size);
    println!(
        "Benchmarking a {}x{} viewport ({} x {} cells)",
        viewport.width, viewport.height, cols, rows
    );

    let builds = 200;
    let start = Instant::now();
    let mut zoned = 0;
    for seed in 0..builds {
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        zoned += MapScene::build(viewport, &AnimatorConfig::default(), &mut rng)
            .grid()
            .occupied_count();
    }
    let duration_build = start.elapsed();
    println!(
        "Time for {} scene builds: {:?} ({} zoned cells total)",
        builds, duration_build, zoned
    );
    println!("Avg time per build: {:?}", duration_build / builds as u32);

    let ticks = 600;

    // Map alone. The recorder is drained each tick so memory stays flat.
    let (mut stage, surface) = map_stage(viewport, 42);
    let start = Instant::now();
    let mut commands = 0;
    for _ in 0..ticks {
        stage.tick();
        commands += surface.borrow_mut().take().len();
    }
    let duration_map = start.elapsed();
    stage.teardown();
    println!("Time for {} map frames: {:?} ({} draw commands)", ticks, duration_map, commands);
    println!("Avg time per frame (map): {:?}", duration_map / ticks as u32);

    // Map plus a crowded glyph overlay.
    let (mut stage, surface) = map_stage(viewport, 42);
    let drift_surface = Rc::new(RefCell::new(Recorder::new()));
    let shared = Rc::clone(&drift_surface);
    let drift_config = DriftConfig {
        max_alive: 200,
        spawn_period_ms: 16,
        ..DriftConfig::default()
    };
    stage.mount(move |host| {
        NoteDrift::mount(host, Some(shared), ChaCha12Rng::seed_from_u64(43), drift_config)
    });
    let start = Instant::now();
    for _ in 0..ticks {
        stage.tick();
        surface.borrow_mut().take();
        drift_surface.borrow_mut().take();
    }
    let duration_both = start.elapsed();
    stage.teardown();
    println!("Time for {} frames WITH overlay: {:?}", ticks, duration_both);
    println!("Avg time per frame (with overlay): {:?}", duration_both / ticks as u32);

    let diff = duration_both.saturating_sub(duration_map);
    println!("Avg overlay overhead per frame: {:?}", diff / ticks as u32);
}
