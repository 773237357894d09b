mod cli;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use powerline_circuit::{CircuitConfig, GateCatalog, Port, Simulation};
use powerline_levels::LevelPack;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use cli::{Cli, Command};

fn init_tracing(directives: &str) -> anyhow::Result<()> {
    let filter_layer = EnvFilter::builder()
        .parse(directives)
        .context("invalid log filter")?;

    Registry::default()
        .with(filter_layer)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log)?;

    match cli.command {
        Command::Kinds => {
            for kind in GateCatalog::builtin().iter() {
                println!(
                    "{:<10} {:<11} {}->{}  {}",
                    kind.id(),
                    kind.name(),
                    kind.inputs(),
                    kind.outputs(),
                    kind.description()
                );
            }
        }
        Command::Table { kind } => {
            let kind = GateCatalog::builtin().lookup(&kind)?;
            println!("{}\n", kind.name());
            print!("{}", kind.truth_table());
        }
        Command::Levels { file } => {
            let pack = match file {
                Some(path) => {
                    let source = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    LevelPack::from_toml(&source, &GateCatalog::builtin())?
                }
                None => LevelPack::builtin()?,
            };

            for level in pack.levels() {
                if let Some(chapter) = pack.chapters().iter().find(|c| c.start == level.index()) {
                    println!("{}", chapter.name);
                }
                println!(
                    "  {:>2}. {:<20} best: {}",
                    level.index() + 1,
                    level.name(),
                    level.best()
                );
            }
        }
        Command::Clock { ticks, period_ms } => run_clock(ticks, period_ms).await?,
    }

    Ok(())
}

async fn run_clock(ticks: usize, period_ms: u64) -> anyhow::Result<()> {
    let config = CircuitConfig::builder()
        .clock_period(Duration::from_millis(period_ms))
        .build()?;
    let mut sim = Simulation::new(config);

    let graph = sim.graph_mut();
    let clock = graph.create_gate("clock", None)?;
    let not = graph.create_gate("not", None)?;
    let output = graph.create_gate("output", None)?;
    graph.connect(Port::output(clock, 0), Port::input(not, 0))?;
    graph.connect(Port::output(not, 0), Port::input(output, 0))?;

    for (id, label) in [(clock, "clock"), (not, "not"), (output, "output")] {
        graph.on_output_changed(id, 0, move |value| {
            println!("{label:<6} -> {}", u8::from(value));
        })?;
    }

    for tick in 1..=ticks {
        if !sim.step().await {
            break;
        }
        tracing::debug!(tick, "clock tick applied");
    }

    Ok(())
}
