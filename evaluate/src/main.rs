use std::collections::BTreeMap;
use std::fs::File;
use std::io::{stdin, BufReader};
use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use genetag::{Model, Sentence, TaggedSentenceReader, Tagger};

#[derive(Parser, Debug)]
#[command(
    about = "A program to evaluate the accuracy of Genetag.",
    group = ArgGroup::new("source").required(true),
)]
struct Args {
    /// The compiled model file to load (zstd-compressed)
    #[arg(long, group = "source")]
    model: Option<PathBuf>,

    /// The counts file to load
    #[arg(long, group = "source")]
    counts: Option<PathBuf>,

    /// Evaluate the per-token baseline instead of the Viterbi decoder
    #[arg(long)]
    baseline: bool,
}

#[derive(Debug, Default)]
struct TagMeasure {
    n_match: usize,
    n_model: usize,
    n_ref: usize,
}

impl TagMeasure {
    fn precision(&self) -> f64 {
        if self.n_model == 0 {
            0.0
        } else {
            self.n_match as f64 / self.n_model as f64
        }
    }

    fn recall(&self) -> f64 {
        if self.n_ref == 0 {
            0.0
        } else {
            self.n_match as f64 / self.n_ref as f64
        }
    }

    fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
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
    let args = Args::parse();

    eprintln!("Loading model file...");
    let model = load_model(&args)?;
    let tagger = Tagger::new(model)?;

    eprintln!("Start evaluation");
    let mut measures: BTreeMap<String, TagMeasure> = BTreeMap::new();
    let mut n_tokens = 0;
    let mut n_correct_tokens = 0;
    let mut n_sentences = 0;
    let mut n_correct_sentences = 0;
    for gold in TaggedSentenceReader::new(stdin().lock()) {
        let gold = gold?;
        let input = Sentence::from_tokens(gold.tokens().to_vec())?;
        let mut predicted = if args.baseline {
            tagger.baseline(input)
        } else {
            tagger.tag(input)
        };
        if predicted.tags().is_empty() {
            predicted = tagger.baseline(predicted);
        }

        let mut all_correct = true;
        for (gold_tag, predicted_tag) in gold.tags().iter().zip(predicted.tags()) {
            measures.entry(gold_tag.clone()).or_default().n_ref += 1;
            measures.entry(predicted_tag.clone()).or_default().n_model += 1;
            if gold_tag == predicted_tag {
                measures.entry(gold_tag.clone()).or_default().n_match += 1;
                n_correct_tokens += 1;
            } else {
                all_correct = false;
            }
            n_tokens += 1;
        }
        n_sentences += 1;
        if all_correct {
            n_correct_sentences += 1;
        }
    }

    if n_tokens == 0 {
        eprintln!("No sentences to evaluate.");
        return Ok(());
    }

    println!("Performance by tag (#match, #model, #ref) (precision, recall, F1):");
    let mut precision_sum = 0.0;
    let mut recall_sum = 0.0;
    let mut f1_sum = 0.0;
    for (tag, m) in &measures {
        println!(
            "    {}: ({}, {}, {}) ({:.4}, {:.4}, {:.4})",
            tag,
            m.n_match,
            m.n_model,
            m.n_ref,
            m.precision(),
            m.recall(),
            m.f1()
        );
        precision_sum += m.precision();
        recall_sum += m.recall();
        f1_sum += m.f1();
    }
    let n_tags = measures.len() as f64;
    println!(
        "Macro-average precision, recall, F1: ({:.4}, {:.4}, {:.4})",
        precision_sum / n_tags,
        recall_sum / n_tags,
        f1_sum / n_tags
    );
    println!(
        "Token accuracy: {} / {} ({:.4})",
        n_correct_tokens,
        n_tokens,
        n_correct_tokens as f64 / n_tokens as f64
    );
    println!(
        "Sentence accuracy: {} / {} ({:.4})",
        n_correct_sentences,
        n_sentences,
        n_correct_sentences as f64 / n_sentences as f64
    );

    Ok(())
}
