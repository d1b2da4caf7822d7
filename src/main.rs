mod cli;

use mediaprobe::config;
use mediaprobe_core::MetadataNormalizer;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set. Logs go to stderr so stdout stays valid JSON.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mediaprobe=debug,mediaprobe_core=debug".to_string()
        } else {
            "mediaprobe=info,mediaprobe_core=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Probe { file, compact } => probe_file(&file, compact, cli.config.as_deref()),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
    }
}

fn probe_file(file: &Path, compact: bool, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let normalizer = MetadataNormalizer::new(config.tools);

    let result = normalizer
        .probe(file)
        .with_context(|| format!("Failed to probe {:?}", file))?;

    let json = if compact || !config.output.pretty {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{}", json);

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let normalizer = MetadataNormalizer::new(config.tools);

    println!("Checking external tools...\n");

    let tools = normalizer.tools().check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Files needing them will fail to probe.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Pretty output: {}", config.output.pretty);
    println!("  Tools:");
    for tool in mediaprobe_core::Tool::ALL {
        match config.tools.get(tool) {
            Some(p) => println!("    {}: {}", tool, p.display()),
            None => println!("    {}: (PATH)", tool),
        }
    }

    Ok(())
}
