use anyhow::{ anyhow, Result };
use std::fs;
use std::io::Read;
use std::path::Path;

use pagesmith::{ Pipeline, PipelineResponse };

use crate::cli::ui;
use crate::cli::OutputFormat;

/// Run one request body through the pipeline and print the terminal response
pub async fn execute(pipeline: &Pipeline, request_path: &Path, format: OutputFormat) -> Result<PipelineResponse> {
    let body = read_request(request_path)?;

    if format == OutputFormat::Text {
        ui::print_header("Generating Site");
        ui::print_info(&format!("Request: {}", request_path.display()));
    }
    let spinner = (format == OutputFormat::Text).then(|| ui::spinner_with_message("Running pipeline..."));

    let response = pipeline.run_bytes(&body).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        OutputFormat::Text => ui::print_response(&response),
    }
    Ok(response)
}

fn read_request(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut body = Vec::new();
        std::io::stdin().read_to_end(&mut body).map_err(|e| anyhow!("Failed to read request from stdin: {}", e))?;
        return Ok(body);
    }
    fs::read(path).map_err(|e| anyhow!("Failed to read request file {}: {}", path.display(), e))
}
