use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input};

use super::{Config, OpenAiConfig, QdrantConfig, get_config_dir};

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 doc-rag Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("Qdrant Configuration").bold().yellow());
    eprintln!("Configure the vector collection used for retrieval.");
    eprintln!();
    configure_qdrant(&mut config.qdrant)?;

    eprintln!();
    eprintln!("{}", style("OpenAI Configuration").bold().yellow());
    eprintln!("Configure the embedding and completion models.");
    eprintln!();
    configure_openai(&mut config.openai)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    if test_qdrant_connection(&config.qdrant) {
        eprintln!("{}", style("✓ Qdrant connection successful!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not connect to Qdrant").yellow()
        );
        eprintln!("You can continue, but make sure Qdrant is running before ingesting.");
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Qdrant Settings:").bold().yellow());
    eprintln!("  URL: {}", style(&config.qdrant.url).cyan());
    eprintln!("  Collection: {}", style(&config.qdrant.collection).cyan());
    eprintln!("  Dimension: {}", style(config.qdrant.dimension).cyan());
    eprintln!(
        "  Distance: {}",
        style(config.qdrant.distance.as_str()).cyan()
    );

    eprintln!();
    eprintln!("{}", style("OpenAI Settings:").bold().yellow());
    eprintln!("  Base URL: {}", style(&config.openai.base_url).cyan());
    eprintln!(
        "  Embedding model: {}",
        style(&config.openai.embedding_model).cyan()
    );
    eprintln!(
        "  Completion model: {}",
        style(&config.openai.completion_model).cyan()
    );
    eprintln!(
        "  API key variable: {}",
        style(&config.openai.api_key_env).cyan()
    );

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config() -> Result<Config> {
    Config::load().map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            let base_dir = get_config_dir().context("Failed to resolve config directory")?;
            Ok(Config {
                base_dir,
                ..Config::default()
            })
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn configure_qdrant(qdrant: &mut QdrantConfig) -> Result<()> {
    let url: String = Input::new()
        .with_prompt("Qdrant URL")
        .default(qdrant.url.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if url::Url::parse(input).is_ok() {
                Ok(())
            } else {
                Err("Must be a valid URL, e.g. http://localhost:6333")
            }
        })
        .interact_text()?;

    let collection: String = Input::new()
        .with_prompt("Collection name")
        .default(qdrant.collection.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.is_empty() || input.chars().any(char::is_whitespace) {
                Err("Collection name must be non-empty, without whitespace")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let dimension: u32 = Input::new()
        .with_prompt("Vector dimension (must match the embedding model)")
        .default(qdrant.dimension)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 || *input > 65536 {
                Err("Dimension must be between 1 and 65536")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    qdrant.url = url;
    qdrant.collection = collection;
    qdrant.dimension = dimension;
    qdrant.validate()?;

    Ok(())
}

fn configure_openai(openai: &mut OpenAiConfig) -> Result<()> {
    let embedding_model: String = Input::new()
        .with_prompt("Embedding model")
        .default(openai.embedding_model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let completion_model: String = Input::new()
        .with_prompt("Completion model")
        .default(openai.completion_model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    openai.embedding_model = embedding_model;
    openai.completion_model = completion_model;
    openai.validate()?;

    Ok(())
}

fn test_qdrant_connection(qdrant: &QdrantConfig) -> bool {
    let url = format!("{}/collections", qdrant.url.trim_end_matches('/'));

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(std::time::Duration::from_secs(5)))
        .build()
        .into();

    match agent.get(&url).call() {
        Ok(_) => true,
        Err(ureq::Error::StatusCode(code)) => (400..500).contains(&code),
        Err(_) => false,
    }
}
