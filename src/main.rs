use clap::Parser;
use workflowproj::utils::error::{ErrorCategory, ProjectError};
use workflowproj::utils::{logger, validation::Validate};
use workflowproj::{CliConfig, Project};

fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting workflowproj");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config) {
        tracing::error!("❌ {} (Category: {:?})", e, e.category());
        eprintln!("❌ {}", e);
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.category() {
            ErrorCategory::Input => 1,
            ErrorCategory::Io => 2,
            ErrorCategory::Config => 3,
        };
        std::process::exit(exit_code);
    }
}

fn run(config: &CliConfig) -> Result<(), ProjectError> {
    config.validate()?;

    let project_config = config.project_config()?;
    let builder = project_config.into_builder()?;

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no manifests will be written");
        let project = builder.materialize()?;
        print_summary(&project);
        return Ok(());
    }

    let output_path = project_config.output_path();
    let written = builder.serialize_to_directory(&output_path)?;

    println!("✅ Wrote {} manifest(s)", written.len());
    println!("📁 Output saved to: {}", output_path.display());
    Ok(())
}

fn print_summary(project: &Project) {
    let workflow = project.workflow();
    println!("Workflow:   {} (namespace: {})", workflow.name, project.namespace());
    if let Some(properties) = project.properties() {
        println!(
            "Properties: {} ({} entries)",
            properties.name,
            properties.entries.len()
        );
    }
    for group in project.resources() {
        let files: Vec<&str> = group.data.keys().map(String::as_str).collect();
        println!(
            "Resources:  {} [{}] {}",
            group.name,
            group.resource_type,
            files.join(", ")
        );
    }
    for (key, value) in &workflow.annotations {
        println!("  {}: {}", key, value);
    }
}
