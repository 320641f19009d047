use anyhow::Result;
use flips_config::FlipsConfig;

mod scenarios;
use scenarios::{Board, Scenario};

fn main() -> Result<()> {
    // tracing's `log` feature forwards events to env_logger.
    let _ = env_logger::try_init();

    let config = FlipsConfig::load();
    tracing::info!(move_class = %config.move_class(), wrap = %config.wrap, "loaded configuration");

    // Scenario selection
    let scene_env = std::env::var("FLIPS_DEMO_SCENE").ok();
    let arg = std::env::args().find_map(|a| a.strip_prefix("--scene=").map(str::to_string));
    let selected = match arg.or(scene_env).as_deref() {
        Some("shuffle") => vec![Scenario::Shuffle],
        Some("remove") => vec![Scenario::Remove],
        Some("insert") => vec![Scenario::Insert],
        Some(other) => {
            tracing::warn!(scene = other, "unknown scene; running all");
            Scenario::ALL.to_vec()
        }
        None => Scenario::ALL.to_vec(),
    };

    for scenario in selected {
        let mut board = Board::new(config.clone(), &[1, 2, 3, 4, 5])?;
        println!("=== {} ===", scenario.name());
        println!("  start:   {}", board.describe()?);
        scenario.run(&mut board)?;
        println!("  settled: {}", board.describe()?);
        println!();
    }
    Ok(())
}
