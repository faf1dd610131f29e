use clap::Parser;
use dotenv::dotenv;
use log::{ error, info };
use std::process::ExitCode;

use pagesmith::{ ErrorKind, Pipeline, PipelineResponse, ServiceConfig };

mod cli;
use cli::{ commands, ui, Commands, OutputFormat, PagesmithCli };

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = PagesmithCli::parse();

    setup_logging(&cli.log_level);

    let format = match OutputFormat::parse(&cli.output_format) {
        Some(format) => format,
        None => {
            ui::print_error(&format!("Unsupported output format: {}", cli.output_format));
            return ExitCode::FAILURE;
        }
    };

    let config = match ServiceConfig::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            ui::print_error(&format!("Configuration error: {}", e));
            return ExitCode::FAILURE;
        }
    };

    match &cli.command {
        Commands::Check => {
            match commands::check::execute(&config) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    ui::print_error(&e.to_string());
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Run { request } => {
            if let Err(e) = config.validate() {
                ui::print_error(&format!("Configuration error: {}", e));
                return ExitCode::FAILURE;
            }
            let pipeline = match Pipeline::from_config(&config) {
                Ok(pipeline) => pipeline,
                Err(e) => {
                    ui::print_error(&format!("Failed to initialize pipeline: {}", e));
                    return ExitCode::FAILURE;
                }
            };
            match commands::run::execute(&pipeline, request, format).await {
                Ok(response) => exit_code(&response),
                Err(e) => {
                    ui::print_error(&e.to_string());
                    ExitCode::FAILURE
                }
            }
        }
    }
}

/// 0 on success, 2 unauthorized, 3 malformed, 4 repository conflict, 1 otherwise
fn exit_code(response: &PipelineResponse) -> ExitCode {
    match response.error_kind() {
        None => ExitCode::SUCCESS,
        Some(ErrorKind::Unauthorized) => ExitCode::from(2),
        Some(ErrorKind::MalformedRequest) => ExitCode::from(3),
        Some(ErrorKind::RepoAlreadyExists) => ExitCode::from(4),
        Some(_) => ExitCode::FAILURE,
    }
}

fn setup_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::new().filter_level(level).init();

    info!("Logger initialized with level: {}", log_level);
}
