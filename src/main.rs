use std::{fs, path::PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use vigenere_hack::{
    crack,
    text::{load_corpus, MonogramCounts},
    Ciphertext, CrackConfig, Profiles,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Recovers the key and plaintext of a Vigenere ciphertext")]
struct Args {
    /// File holding the ciphertext
    ciphertext: PathBuf,

    /// JSON run configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reference plaintext document (repeatable)
    #[arg(long)]
    corpus: Vec<PathBuf>,

    /// Ordered alphabet symbols
    #[arg(long)]
    alphabet: Option<String>,

    /// Shortest repeated substring considered by Kasiski examination
    #[arg(long = "min-substring")]
    min_substring_length: Option<usize>,

    /// Hill-climbing passes allowed per key length
    #[arg(long)]
    max_passes: Option<usize>,

    /// Random restarts after the first convergence
    #[arg(long)]
    restarts: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Try key lengths one after another instead of on the thread pool
    #[arg(long)]
    sequential: bool,

    /// Drop ciphertext symbols outside the alphabet instead of failing
    #[arg(long)]
    strip_unknown: bool,

    /// Print the ciphertext symbol and Kasiski divisor histograms
    #[arg(long)]
    histogram: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Result<CrackConfig> {
        let mut config = match &self.config {
            Some(path) => CrackConfig::from_json_file(path)?,
            None => CrackConfig::default(),
        };
        if !self.corpus.is_empty() {
            config.corpus = self.corpus.clone();
        }
        if let Some(alphabet) = &self.alphabet {
            config.alphabet = Some(alphabet.clone());
        }
        if let Some(length) = self.min_substring_length {
            config.min_substring_length = length;
        }
        if self.max_passes.is_some() {
            config.budget.max_passes = self.max_passes;
        }
        if let Some(restarts) = self.restarts {
            config.budget.restarts = restarts;
        }
        if let Some(seed) = self.seed {
            config.budget.seed = seed;
        }
        if self.sequential {
            config.parallel = false;
        }
        Ok(config)
    }

    fn level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    SimpleLogger::new().with_level(args.level()).init()?;

    let config = args.config().wrap_err("failed to load configuration")?;
    let alphabet = config.alphabet()?;

    let raw = fs::read_to_string(&args.ciphertext)
        .wrap_err_with(|| format!("failed to read {:?}", args.ciphertext))?;
    let raw = if args.strip_unknown {
        alphabet.clean(&raw)
    } else {
        raw
    };
    let ciphertext = Ciphertext::parse(&raw, &alphabet).wrap_err("ciphertext is not alphabet-clean")?;
    let corpus = load_corpus(&config.corpus).wrap_err("failed to read corpus")?;

    if !args.json {
        println!("Hack process was started... Wait a minute...");
    }
    let profiles = Profiles::build(&corpus, &alphabet)?;
    let analysis = crack(&ciphertext, &alphabet, &profiles, &config);

    if args.histogram {
        let symbols = MonogramCounts::from_indices(&ciphertext, alphabet.len());
        for chart in [symbols.histogram(&alphabet), analysis.kasiski.histogram()]
            .into_iter()
            .flatten()
        {
            eprintln!("{chart}");
        }
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!("{analysis}");
    Ok(())
}
