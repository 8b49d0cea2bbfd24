/// Chapter — writes chapters of space opera from a world file.
///
/// Usage: chapter --world <file.ron> [--config <file.ron>] [--seed <n>]
///                [--chapters <n>] [--depth <n>] [--synopsis | --dump]

use saga_engine::core::pipeline::{EngineConfig, NarrativeEngine, OutputMode};
use std::path::PathBuf;
use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut world_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut seed: Option<u64> = None;
    let mut chapters = 1usize;
    let mut depth: Option<u32> = None;
    let mut output: Option<OutputMode> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--world" if i + 1 < args.len() => {
                i += 1;
                world_path = Some(PathBuf::from(&args[i]));
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(PathBuf::from(&args[i]));
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = Some(parse_number(&args[i], "--seed"));
            }
            "--chapters" if i + 1 < args.len() => {
                i += 1;
                chapters = parse_number(&args[i], "--chapters");
            }
            "--depth" if i + 1 < args.len() => {
                i += 1;
                depth = Some(parse_number(&args[i], "--depth"));
            }
            "--synopsis" => output = Some(OutputMode::Synopsis),
            "--dump" => output = Some(OutputMode::Dump),
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(world_path) = world_path else {
        eprintln!("Error: --world is required");
        print_usage();
        process::exit(1);
    };

    // Command-line flags win over the config file.
    let mut config = match &config_path {
        Some(path) => EngineConfig::load_from_ron(path).unwrap_or_else(|e| {
            eprintln!("Error: failed to load config {}: {}", path.display(), e);
            process::exit(1);
        }),
        None => EngineConfig::default(),
    };
    if let Some(depth) = depth {
        config.depth = depth;
    }
    if let Some(output) = output {
        config.output = output;
    }

    let mut builder = NarrativeEngine::builder().world_file(world_path).config(config);
    if let Some(seed) = seed {
        builder = builder.seed(seed);
    }
    let mut engine = builder.build().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    let written = engine.write_chapters(chapters).unwrap_or_else(|e| {
        eprintln!("Error: {} (seed {})", e, engine.seed());
        process::exit(1);
    });

    let mut total_words = 0;
    for chapter in &written {
        match engine.config().output {
            OutputMode::Prose => println!("## {}\n\n{}\n", chapter.title, chapter.text),
            OutputMode::Synopsis | OutputMode::Dump => println!("{}", chapter.text),
        }
        total_words += chapter.word_count;
    }
    eprintln!("{} chapters, {} words, seed {}", written.len(), total_words, engine.seed());
}

fn parse_number<T: std::str::FromStr>(raw: &str, flag: &str) -> T {
    raw.parse().unwrap_or_else(|_| {
        eprintln!("Error: {} expects a number, got '{}'", flag, raw);
        process::exit(1);
    })
}

fn print_usage() {
    println!("Chapter — writes chapters of space opera from a world file.");
    println!();
    println!("Usage: chapter --world <file.ron> [options]");
    println!();
    println!("  --world <file>     World catalog (RON)");
    println!("  --config <file>    Engine configuration (RON, optional)");
    println!("  --seed <n>         RNG seed (default: random, logged)");
    println!("  --chapters <n>     Chapters to write (default: 1)");
    println!("  --depth <n>        Plot expansion rounds (default: 5)");
    println!("  --synopsis         Print the plot synopsis instead of prose");
    println!("  --dump             Print the lowered story tree instead of prose");
}
