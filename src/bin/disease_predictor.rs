// Disease Predictor CLI
//
// Purpose: Predict a disease from symptoms and show description, precautions,
// diet and medications from the reference tables.
// Usage: cargo run --bin disease_predictor -- --data-dir data predict itching skin_rash

use anyhow::Result;
use clap::{Parser, Subcommand};
use disease_predictor::{
    AppContext, Classifier, Disease, InfoBundle, PredictorConfig, PredictorError,
    SymptomVocabulary,
};
use disease_predictor::data::TrainingTable;
use std::io::{stdin, stdout, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "disease_predictor")]
#[command(about = "Symptom-based disease prediction with diet and medication lookups", long_about = None)]
struct Args {
    /// Directory holding the CSV tables and model artifact (env: DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive menu (default)
    Interactive,
    /// List known symptoms
    Symptoms,
    /// Predict a disease from symptoms and show its info
    Predict {
        #[arg(required = true, value_name = "SYMPTOM")]
        symptoms: Vec<String>,
    },
    /// Show reference info for a disease
    Info {
        #[arg(value_name = "DISEASE")]
        disease: String,
    },
    /// Train a forest from the training table and write the model artifact
    Train,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "disease_predictor=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;

    match args.command.unwrap_or(Commands::Interactive) {
        Commands::Train => train(config),
        Commands::Symptoms => {
            let app = AppContext::load(config)?;
            for name in app.vocabulary().names() {
                println!("{}", name);
            }
            Ok(())
        }
        Commands::Predict { symptoms } => {
            let app = AppContext::load(config)?;
            let mut session = app.session();
            let prediction = session.select_symptoms(&symptoms)?;
            let info = session.current_info()?;
            if args.json {
                let out = serde_json::json!({ "prediction": prediction, "info": info });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("Predicted Disease: {}", prediction.disease);
                if !prediction.unrecognized.is_empty() {
                    println!("Ignored unknown symptoms: {}", prediction.unrecognized.join(", "));
                }
                print_bundle(&info);
            }
            Ok(())
        }
        Commands::Info { disease } => {
            let app = AppContext::load(config)?;
            let info = app.info(&Disease::new(disease));
            if args.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                print_bundle(&info);
            }
            Ok(())
        }
        Commands::Interactive => {
            let app = AppContext::load(config)?;
            interactive(&app)
        }
    }
}

/// --config file, then --data-dir, then DATA_DIR
fn resolve_config(args: &Args) -> Result<PredictorConfig> {
    let mut config = match &args.config {
        Some(path) => PredictorConfig::load(path)?,
        None => PredictorConfig::default(),
    };

    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    } else if args.config.is_none() {
        if let Ok(dir) = std::env::var("DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
    }

    tracing::info!("Configuration:");
    tracing::info!("  DATA_DIR: {:?}", config.data_dir);
    tracing::info!("  MODEL: {:?}", config.model_path());
    Ok(config)
}

fn train(config: PredictorConfig) -> Result<()> {
    config.validate()?;
    let training = TrainingTable::load(&config.training_path(), &config.label_column)?;
    let classifier = Classifier::train(&training, &config.forest)?;
    classifier.to_artifact().save(&config.model_path())?;
    println!(
        "Model written to {:?} ({} symptoms, {} diseases)",
        config.model_path(),
        classifier.vocabulary().len(),
        classifier.diseases().len()
    );
    Ok(())
}

fn print_list(title: &str, items: &[String]) {
    println!("\n{}:", title);
    if items.is_empty() {
        println!("  (none)");
    }
    for item in items {
        println!("  • {}", item);
    }
}

fn print_bundle(info: &InfoBundle) {
    println!("\nDescription: {}", info.description);
    print_list("Precautions", &info.precautions);
    print_list("Recommended Diet", &info.diet);
    print_list("Medications", &info.medications);
    for issue in &info.issues {
        println!("\n[warning] {}", issue);
    }
}

const MENU: [&str; 6] = ["Predict Disease", "Medicines", "Diet", "Precautions", "Description", "Quit"];

fn interactive(app: &AppContext) -> Result<()> {
    let mut session = app.session();
    let mut lines = stdin().lock().lines();

    println!("AI-Powered Disease Diagnosis and Medicine Recommendation System");
    println!("---------------------------------------------------------------");

    loop {
        println!();
        for (i, item) in MENU.iter().enumerate() {
            println!("  {}. {}", i + 1, item);
        }
        print!("\n> ");
        stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let choice = line?;

        let page = match choice.trim() {
            "1" => {
                println!("Enter symptoms separated by commas (e.g. {}):", example_symptoms(app.vocabulary()));
                print!("> ");
                stdout().flush()?;
                let Some(input) = lines.next() else { break };
                let input = input?;
                let symptoms: Vec<&str> = input.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
                match session.select_symptoms(&symptoms) {
                    Ok(prediction) => {
                        if !prediction.unrecognized.is_empty() {
                            println!("Ignored unknown symptoms: {}", prediction.unrecognized.join(", "));
                        }
                        println!("Predicted Disease: {}", prediction.disease);
                    }
                    Err(PredictorError::NoSymptomsSelected) => println!("Please select at least one symptom."),
                    Err(e) => println!("Error: {}", e),
                }
                continue;
            }
            "2" => session.medications().map(|m| print_list("Medications", &m)),
            "3" => session.diet().map(|d| print_list("Recommended Diet", &d)),
            "4" => session.precautions().map(|p| print_list("Precautions", &p)),
            "5" => session.description().map(|d| println!("\nDescription: {}", d)),
            "6" | "q" | "quit" | "exit" => break,
            other => {
                println!("Unknown choice '{}'", other);
                continue;
            }
        };

        match page {
            Ok(()) => {
                if let Ok(info) = session.current_info() {
                    for issue in &info.issues {
                        println!("[warning] {}", issue);
                    }
                }
            }
            Err(PredictorError::NotYetPredicted) => println!("Please predict a disease first!"),
            Err(e) => println!("Error: {}", e),
        }
    }

    Ok(())
}

fn example_symptoms(vocabulary: &SymptomVocabulary) -> String {
    vocabulary
        .names()
        .iter()
        .take(3)
        .map(|n| n.trim().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
