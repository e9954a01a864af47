use std::fs::File;
use std::io::{prelude::*, stderr, BufReader, BufWriter};
use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use genetag::{TaggedSentenceReader, Trainer};

#[derive(Parser, Debug)]
#[command(
    about = "A program to count tag and emission statistics for Genetag.",
    group = ArgGroup::new("output").required(true).multiple(true),
)]
struct Args {
    /// A labeled training corpus with one `token tag` pair per line
    #[arg(long, required = true)]
    corpus: Vec<PathBuf>,

    /// The file to write the counts to
    #[arg(long, group = "output")]
    counts: Option<PathBuf>,

    /// The file to write the compiled model to
    #[arg(long, group = "output")]
    model: Option<PathBuf>,

    /// The number of workers for zstd (0 means multithreading is disabled)
    #[arg(long, default_value = "0")]
    zstd_workers: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    eprintln!("Loading dataset...");
    let mut trainer = Trainer::new();
    let mut n_sentences = 0;
    for path in args.corpus {
        eprintln!("Loading {path:?} ...");
        let f = File::open(path)?;
        let f = BufReader::new(f);
        for (i, sentence) in TaggedSentenceReader::new(f).enumerate() {
            if i % 10000 == 0 {
                eprint!("# of sentences: {i}\r");
                stderr().flush()?;
            }
            trainer.add_sentence(&sentence?)?;
            n_sentences += 1;
        }
        eprintln!("# of sentences: {n_sentences}");
    }

    if let Some(path) = args.counts {
        eprintln!("Writing counts to {path:?} ...");
        let mut f = BufWriter::new(File::create(path)?);
        trainer.write_counts(&mut f)?;
        f.flush()?;
    }

    if let Some(path) = args.model {
        eprintln!("Compiling the model...");
        let model = trainer.into_model()?;
        eprintln!("# of tags: {}", model.counts().known_tags().len());

        eprintln!("Writing model to {path:?} ...");
        let mut f = zstd::Encoder::new(File::create(path)?, 19)?;
        f.multithread(args.zstd_workers)?;
        model.write(&mut f)?;
        f.finish()?;
    }

    Ok(())
}
