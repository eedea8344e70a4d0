mod cli;

use imgforge::{check_input_dir, config, ConvertOptions, Converter};
use imgforge_av::select_backend;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "imgforge=debug,imgforge_av=debug".to_string()
        } else {
            "imgforge=info,imgforge_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.check_tools {
        return check_tools();
    }

    let mut config = config::load_config_or_default(cli.config.as_deref())?;
    cli.apply(&mut config);
    config::validate_config(&config)?;

    let input_dir = config.input.clone();
    let output_dir = config.output_dir();

    check_input_dir(&input_dir)?;

    let backend = select_backend(
        config.conversion.backend,
        config.conversion.from,
        config.conversion.to,
        config.conversion.timeout(),
    )
    .context("No usable conversion backend")?;

    let options = ConvertOptions {
        source_format: config.conversion.from,
        target_format: config.conversion.to,
        overwrite: config.overwrite,
        recursive: config.recursive,
        dry_run: cli.dry_run,
    };
    let target = options.target_format;

    let report = Converter::new(backend, options).run(&input_dir, &output_dir)?;

    if cli.dry_run {
        println!(
            "Would convert {} file(s) to {} ({} already converted).",
            report.planned,
            target.label(),
            report.skipped
        );
        return Ok(());
    }

    println!("Converted {} file(s) to {}.", report.converted, target.label());
    if report.skipped > 0 {
        println!("Skipped {} file(s) with existing output.", report.skipped);
    }
    if report.has_failures() {
        println!("Failed to convert {} file(s):", report.failures.len());
        for failure in &report.failures {
            println!("  {}: {}", failure.source.display(), failure.message);
        }
    }

    Ok(())
}

fn check_tools() -> Result<()> {
    println!("Checking external tools...\n");

    for tool in imgforge_av::check_tools() {
        let status = if tool.available { "✓" } else { "✗" };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    let heif = if cfg!(feature = "heif") { "enabled" } else { "disabled" };
    println!("\nIn-process HEIC decoding: {}", heif);

    Ok(())
}
