//! Draws items at random from weighted lists described in a JSON file
use clap::Parser;
use env_logger::fmt::Formatter;
use log::Record;
use rand::rngs::StdRng;
use rand::SeedableRng;
use randomizer_rs::randomizer::{self, shared, RawInput, Weight, WeightedCollection, WeightedGroup};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io::Write;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg()]
    config_file: String,
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
    /// Number of items to draw, overriding the config file
    #[arg(short('n'), long)]
    draws: Option<usize>,
    /// Deplete each drawn item
    #[arg(short, long)]
    remove: bool,
    /// Seed for reproducible draws
    #[arg(short, long)]
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct DrawSettings {
    #[serde(default = "default_draws")]
    draws: usize,
    #[serde(default)]
    remove: bool,
    seed: Option<u64>,
    lists: Vec<RawInput<ListSettings>>,
}

fn default_draws() -> usize {
    1
}

#[derive(Debug, Deserialize)]
struct ListSettings {
    name: Option<String>,
    items: Vec<RawInput<Value>>,
}

#[derive(Debug)]
enum Source {
    Single(WeightedCollection<Value>),
    Group(WeightedGroup<Value>),
}

impl Source {
    ///
    /// One usable list is drawn from directly, anything else goes through a
    /// group. Lists weighted zero or below are dropped in both cases.
    ///
    fn new(lists: Vec<RawInput<ListSettings>>) -> randomizer::Result<Source> {
        let mut collections: Vec<(WeightedCollection<Value>, Option<Weight>)> = vec![];
        for list in lists {
            let (settings, weight) = match list {
                RawInput::Plain(settings) => (settings, None),
                RawInput::Weighted(settings, weight) => (settings, Some(weight)),
            };
            let name = settings.name.as_deref().unwrap_or("(unnamed)").to_string();
            if let Some(weight) = weight.filter(|weight| *weight <= 0) {
                log::warn!("Dropping list {} with non-positive weight {}", name, weight);
                continue;
            }
            log::debug!("Loaded list {} with {} items", name, settings.items.len());
            collections.push((WeightedCollection::new(settings.items)?, weight));
        }
        if collections.len() == 1 {
            if let Some((collection, _)) = collections.pop() {
                return Ok(Source::Single(collection));
            }
        }
        let group = WeightedGroup::new(collections.into_iter().map(|(collection, weight)| {
            match weight {
                None => RawInput::Plain(shared(collection)),
                Some(weight) => RawInput::Weighted(shared(collection), weight),
            }
        }))?;
        Ok(Source::Group(group))
    }

    fn draw(&mut self, rng: &mut StdRng, remove: bool) -> randomizer::Result<Value> {
        match self {
            Source::Single(collection) if remove => collection.get_random_and_remove_with(rng),
            Source::Single(collection) => collection.get_random_with(rng),
            Source::Group(group) if remove => group.get_random_and_remove_with(rng),
            Source::Group(group) => group.get_random_with(rng),
        }
    }
}

/// Settings after command line flags have been applied over the file.
#[derive(Debug, PartialEq)]
struct DrawOptions {
    draws: usize,
    remove: bool,
    seed: Option<u64>,
}

impl DrawOptions {
    fn resolve(args: &Args, settings: &DrawSettings) -> DrawOptions {
        DrawOptions {
            draws: args.draws.unwrap_or(settings.draws),
            remove: args.remove || settings.remove,
            seed: args.seed.or(settings.seed),
        }
    }
}

fn display(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .format(|buf: &mut Formatter, record: &Record| {
            let timestamp = buf.timestamp_millis();
            writeln!(
                buf,
                "[{}] [{}] - {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config_file = match fs::read_to_string(&args.config_file) {
        Ok(contents) => contents,
        Err(err) => {
            eprintln!("Failed to read config file {}: {}", args.config_file, err);
            std::process::exit(1);
        }
    };
    let settings: DrawSettings = match serde_json::from_str(&config_file) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Failed to parse config file {}: {}", args.config_file, err);
            std::process::exit(1);
        }
    };

    let options = DrawOptions::resolve(&args, &settings);
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    log::info!(
        "Drawing {} items from {} lists (remove: {})",
        options.draws,
        settings.lists.len(),
        options.remove
    );

    let mut source = match Source::new(settings.lists) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Failed to build lists from {}: {}", args.config_file, err);
            std::process::exit(1);
        }
    };
    for _ in 0..options.draws {
        match source.draw(&mut rng, options.remove) {
            Ok(item) => println!("{}", display(&item)),
            Err(err) => {
                eprintln!("Draw failed: {}", err);
                std::process::exit(1);
            }
        }
    }
}
