use std::fs::File;
use std::io::{stdin, BufReader};
use std::path::PathBuf;
use std::time::Instant;

use clap::{ArgGroup, Parser};
use genetag::{Model, SentenceReader, Tagger};

#[derive(Parser, Debug)]
#[command(
    about = "A program to tag gene names in tokenized sentences.",
    group = ArgGroup::new("source").required(true),
)]
struct Args {
    /// The compiled model file to load (zstd-compressed)
    #[arg(long, group = "source")]
    model: Option<PathBuf>,

    /// The counts file to load
    #[arg(long, group = "source")]
    counts: Option<PathBuf>,

    /// Tag every token independently instead of decoding tag sequences
    #[arg(long)]
    baseline: bool,
}

fn load_model(args: &Args) -> Result<Model, Box<dyn std::error::Error>> {
    if let Some(path) = &args.model {
        let mut f = zstd::Decoder::new(File::open(path)?)?;
        Ok(Model::read(&mut f)?)
    } else if let Some(path) = &args.counts {
        Ok(Model::from_counts(BufReader::new(File::open(path)?))?)
    } else {
        Err("--model or --counts is required".into())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    eprintln!("Loading model file...");
    let model = load_model(&args)?;
    let tagger = Tagger::new(model)?;

    if atty::is(atty::Stream::Stdin) {
        eprintln!("Please input tokens, one per line, with a blank line after each sentence:");
    }

    eprintln!("Start tagging");
    let mut n_tokens = 0;
    let mut n_fallbacks = 0;
    let start = Instant::now();
    if args.baseline {
        for sentence in SentenceReader::new(stdin().lock()) {
            let s = tagger.baseline(sentence?);
            n_tokens += s.len();
            println!("{}", s.to_tagged_string()?);
            println!();
        }
    } else {
        for sentence in tagger.tag_stream(stdin().lock()) {
            let mut s = sentence?;
            if s.tags().is_empty() {
                log::warn!(
                    "no viable tag sequence, using per-token tags: {:?}",
                    s.tokens().join(" ")
                );
                s = tagger.baseline(s);
                n_fallbacks += 1;
            }
            n_tokens += s.len();
            println!("{}", s.to_tagged_string()?);
            println!();
        }
    }
    let duration = start.elapsed();
    eprintln!("Elapsed: {} [sec]", duration.as_secs_f64());
    eprintln!(
        "Speed: {} [tokens/sec]",
        n_tokens as f64 / duration.as_secs_f64()
    );
    if n_fallbacks != 0 {
        eprintln!("Sentences with no viable tag sequence: {n_fallbacks}");
    }

    Ok(())
}
