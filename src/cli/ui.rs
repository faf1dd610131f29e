use colored::*;
use indicatif::{ ProgressBar, ProgressStyle };
use std::time::Duration;

use pagesmith::{ NotificationOutcome, PipelineResponse };

/// Print a section header
pub fn print_header(title: &str) {
    let title = format!(" {} ", title);
    println!("\n{}\n", title.bold().white().on_blue());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "ERROR:".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "WARNING:".yellow().bold(), message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "SUCCESS:".green().bold(), message);
}

/// Print information
pub fn print_info(message: &str) {
    println!("{} {}", "INFO:".blue().bold(), message);
}

/// Print a formatted result
pub fn print_result(label: &str, value: &str) {
    println!("{}: {}", label.bold(), value);
}

/// Display a spinner while waiting for an operation to complete
pub fn spinner_with_message(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ").template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Human-readable rendering of a pipeline response
pub fn print_response(response: &PipelineResponse) {
    match response {
        PipelineResponse::Success(success) => {
            print_success(&format!("Published {}", success.repo_name));
            print_result("Repository", &success.repository_url);
            print_result("Site", &success.site_url);
            print_result("Commit", &success.commit_sha);
            let provider = if success.fallback_used {
                format!("{} (fallback)", success.provider).yellow().to_string()
            } else {
                success.provider.clone()
            };
            print_result("Provider", &provider);
            print_notification(&success.notification);
        }
        PipelineResponse::Failure(failure) => {
            print_error(&format!("{} while {}: {}", failure.error_kind, failure.stage, failure.message));
            if let Some(url) = &failure.repository_url {
                print_warning(&format!("Repository was created and left in place: {}", url));
            }
            if let Some(notification) = &failure.notification {
                print_notification(notification);
            }
        }
    }
}

fn print_notification(outcome: &NotificationOutcome) {
    let status = outcome.status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
    if outcome.delivered {
        print_result("Evaluator", &format!("notified (HTTP {})", status).green().to_string());
    } else {
        print_result("Evaluator", &format!("not notified: {} (HTTP {})", outcome.detail, status).yellow().to_string());
    }
}
