//! rmaxent Command Line Interface
//!
//! A command-line interface for training, evaluating, and using
//! log-linear classifier models over SVM-light format data.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info};
use rmaxent::api::{evaluate, evaluate_detailed, quick, LogLinear, OnlineTrainer, PriorKind, UpdateRule};
use rmaxent::core::{Classifier, ProbabilisticClassifier, Result};
use rmaxent::dataset::svmlight;
use rmaxent::persistence::{SerializableModel, TrainingParams};
use rmaxent::solver::MinimizerKind;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "rmaxent")]
#[command(about = "A Rust implementation of log-linear (maximum entropy) classifiers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "rmaxent contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new classifier model
    Train(TrainArgs),
    /// Make predictions using a trained model
    Predict(PredictArgs),
    /// Evaluate a model on test data
    Evaluate(EvaluateArgs),
    /// Display model information
    Info(InfoArgs),
    /// Quick operations without model saving
    Quick(QuickArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Training data file (SVM-light format)
    #[arg(long)]
    data: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    /// Training algorithm
    #[arg(short, long, default_value = "batch")]
    trainer: CliTrainer,

    /// Prior sigma (batch trainer)
    #[arg(short, long, default_value = "1.0")]
    sigma: f64,

    /// Prior family (batch trainer)
    #[arg(long, default_value = "quadratic")]
    prior: CliPrior,

    /// Huber epsilon (with --prior huber)
    #[arg(long, default_value = "0.1")]
    huber_epsilon: f64,

    /// Convergence tolerance (batch trainer)
    #[arg(long, default_value = "1e-4")]
    tolerance: f64,

    /// Maximum minimizer iterations (batch) or epochs (online)
    #[arg(short, long, default_value = "1000")]
    max_iterations: usize,

    /// Minimizer selection (batch trainer)
    #[arg(long, default_value = "quasi-newton")]
    minimizer: CliMinimizer,

    /// Drop features seen fewer than this many times
    #[arg(long)]
    feature_threshold: Option<usize>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliTrainer {
    /// Batch conditional-likelihood training
    #[value(name = "batch")]
    Batch,
    /// Perceptron epochs
    #[value(name = "perceptron")]
    Perceptron,
    /// Averaged perceptron epochs
    #[value(name = "averaged-perceptron")]
    AveragedPerceptron,
    /// MIRA epochs
    #[value(name = "mira")]
    Mira,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliPrior {
    /// Gaussian prior (default)
    #[value(name = "quadratic")]
    Quadratic,
    /// Huber prior
    #[value(name = "huber")]
    Huber,
    /// Quartic prior
    #[value(name = "quartic")]
    Quartic,
    /// No regularization
    #[value(name = "none")]
    None,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliMinimizer {
    /// L-BFGS quasi-Newton (default)
    #[value(name = "quasi-newton")]
    QuasiNewton,
    /// Steepest descent
    #[value(name = "gradient-descent")]
    GradientDescent,
}

impl From<CliMinimizer> for MinimizerKind {
    fn from(cli: CliMinimizer) -> Self {
        match cli {
            CliMinimizer::QuasiNewton => MinimizerKind::QuasiNewton,
            CliMinimizer::GradientDescent => MinimizerKind::GradientDescent,
        }
    }
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Input data file (SVM-light format)
    #[arg(long)]
    data: PathBuf,

    /// Output predictions file (optional, prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show class probabilities
    #[arg(long)]
    probabilities: bool,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Test data file (SVM-light format)
    #[arg(long)]
    data: PathBuf,

    /// Show per-class counts
    #[arg(long)]
    detailed: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,
}

#[derive(Args)]
struct QuickArgs {
    #[command(subcommand)]
    operation: QuickOperation,
}

#[derive(Subcommand)]
enum QuickOperation {
    /// Quick train and evaluate with a train/test split
    Eval {
        /// Training data file
        train: PathBuf,
        /// Test data file
        test: PathBuf,
        /// Prior sigma
        #[arg(short, long, default_value = "1.0")]
        sigma: f64,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Info(args) => info_command(args),
        Commands::Quick(args) => quick_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn train_command(args: TrainArgs) -> Result<()> {
    info!("Training classifier...");
    info!("Data file: {:?}", args.data);

    let mut dataset = svmlight::read_file(&args.data)?;
    if let Some(threshold) = args.feature_threshold {
        let before = dataset.num_features();
        dataset.apply_feature_count_threshold(threshold);
        info!(
            "Feature threshold {threshold}: {before} -> {} features",
            dataset.num_features()
        );
    }
    info!(
        "Loaded {} examples, {} features, {} classes",
        dataset.len(),
        dataset.num_features(),
        dataset.num_classes()
    );

    let model = match args.trainer {
        CliTrainer::Batch => {
            let prior = match args.prior {
                CliPrior::Quadratic => PriorKind::Quadratic,
                CliPrior::Huber => PriorKind::Huber {
                    epsilon: args.huber_epsilon,
                },
                CliPrior::Quartic => PriorKind::Quartic,
                CliPrior::None => PriorKind::None,
            };
            info!(
                "Batch training: sigma={}, prior={:?}, tolerance={}",
                args.sigma, args.prior, args.tolerance
            );
            LogLinear::new()
                .with_sigma(args.sigma)
                .with_prior(prior)
                .with_tolerance(args.tolerance)
                .with_max_iterations(args.max_iterations)
                .with_minimizer(args.minimizer.into())
                .train(&dataset)?
        }
        online => {
            let rule = match online {
                CliTrainer::Perceptron => UpdateRule::Perceptron,
                CliTrainer::AveragedPerceptron => UpdateRule::AveragedPerceptron,
                CliTrainer::Mira => UpdateRule::Mira,
                CliTrainer::Batch => unreachable!(),
            };
            info!("Online training: rule={rule:?}, epochs={}", args.max_iterations);
            OnlineTrainer::new(rule)
                .with_epochs(args.max_iterations)
                .train(&dataset)?
        }
    };

    info!("Training completed successfully");

    let params = TrainingParams {
        sigma: args.sigma,
        tolerance: args.tolerance,
        max_iterations: args.max_iterations,
    };
    SerializableModel::from_linear(&model, params).save_to_file(&args.output)?;
    info!("Model saved to: {:?}", args.output);

    let accuracy = evaluate(&model, &dataset)?;
    info!("Training accuracy: {:.2}%", accuracy * 100.0);
    Ok(())
}

fn predict_command(args: PredictArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let model: SerializableModel<usize, String> =
        SerializableModel::load_from_file(&args.model)?;
    let classifier = model.to_linear()?;

    info!("Loading prediction data from: {:?}", args.data);
    let dataset = svmlight::read_file(&args.data)?;
    let view = dataset.indexed()?;

    let mut lines = Vec::with_capacity(view.len());
    for d in 0..view.len() {
        let features: Vec<usize> = view.data[d]
            .iter()
            .map(|&f| *dataset.feature_index().get(f).unwrap())
            .collect();
        let values: Vec<f64> = (0..features.len()).map(|pos| view.value(d, pos)).collect();
        let datum = rmaxent::core::Datum::with_values(features, values, String::new());

        let label = classifier.class_of(&datum);
        if args.probabilities {
            let probs = classifier.probability_of(&datum);
            let formatted: Vec<String> = classifier
                .label_index()
                .iter()
                .zip(probs.iter())
                .map(|(l, p)| format!("{l}:{p:.6}"))
                .collect();
            lines.push(format!("{label} {}", formatted.join(" ")));
        } else {
            lines.push(label);
        }
    }

    match args.output {
        Some(output_path) => {
            let file = File::create(&output_path)?;
            let mut writer = BufWriter::new(file);
            for line in &lines {
                writeln!(writer, "{line}")?;
            }
            info!("Predictions saved to: {output_path:?}");
        }
        None => {
            for line in &lines {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let model: SerializableModel<usize, String> =
        SerializableModel::load_from_file(&args.model)?;
    let classifier = model.to_linear()?;

    info!("Loading test data from: {:?}", args.data);
    let dataset = svmlight::read_file(&args.data)?;

    let metrics = evaluate_detailed(&classifier, &dataset)?;
    println!("Accuracy: {:.2}%", metrics.accuracy() * 100.0);
    println!("Correct: {}/{}", metrics.correct, metrics.total);

    if args.detailed {
        println!("Per-class counts (label gold predicted correct):");
        for (label, gold, predicted, correct) in &metrics.per_class {
            println!("  {label} {gold} {predicted} {correct}");
        }
    }
    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    let model: SerializableModel<usize, String> =
        SerializableModel::load_from_file(&args.model)?;
    model.print_summary();
    Ok(())
}

fn quick_command(args: QuickArgs) -> Result<()> {
    match args.operation {
        QuickOperation::Eval { train, test, sigma } => {
            let model = quick::train_svmlight_with_sigma(&train, sigma)?;
            let test_set = svmlight::read_file(&test)?;
            let accuracy = evaluate(&model, &test_set)?;
            println!("Test accuracy: {:.2}%", accuracy * 100.0);
        }
    }
    Ok(())
}
