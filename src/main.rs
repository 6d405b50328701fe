use clap::{CommandFactory, Parser};
use colored::*;
use kep_processor::cli::{self, Args, Command};
use std::process;

fn main() {
    let args = Args::parse();

    let Some(command) = args.command else {
        if let Err(e) = Args::command().print_help() {
            eprintln!("Failed to print help: {}", e);
            process::exit(1);
        }
        println!();
        process::exit(0);
    };

    let process_args = match command {
        Command::Definitions(definitions) => match cli::render_definitions(&definitions) {
            Ok(yaml) => {
                print!("{}", yaml);
                process::exit(0);
            }
            Err(error) => {
                eprintln!("Error: {:#}", error);
                process::exit(1);
            }
        },
        Command::Process(process_args) => process_args,
    };

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let code = runtime.block_on(async {
        tokio::select! {
            result = cli::run(process_args) => match result {
                Ok(stats) if stats.files_failed > 0 => {
                    eprintln!(
                        "{} {} release(s) failed, see log for details",
                        "Warning:".bright_yellow().bold(),
                        stats.files_failed
                    );
                    2
                }
                Ok(_) => 0,
                Err(error) => {
                    eprintln!("Error: {:#}", error);
                    1
                }
            },
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                130
            }
        }
    });

    // Leaves unfinished parse tasks behind
    runtime.shutdown_background();
    process::exit(code);
}
