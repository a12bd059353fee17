use std::process::ExitCode;
use std::time::Instant;

use chess_core::config::{AppConfig, OutputFormat};
use chess_core::engine::{Position, movegen};
use chess_core::perft::{self, PerftReport, ReportError};

fn main() -> ExitCode {
    // Initialize tracing (structured logging).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chess_core=info".into()),
        )
        .init();

    let config = AppConfig::from_env().with_args(std::env::args().skip(1));

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, fen = %config.fen, "perft failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &AppConfig) -> Result<(), ReportError> {
    let mut pos = Position::from_fen(&config.fen)?;

    tracing::info!(
        "chess-core v{} perft depth {} on {}",
        env!("CARGO_PKG_VERSION"),
        config.depth,
        config.fen
    );

    let started = Instant::now();
    let (nodes, divide) = if config.divide {
        let entries = perft::divide(&mut pos, config.depth)?;
        (entries.iter().map(|e| e.nodes).sum::<u64>(), Some(entries))
    } else {
        (perft::perft(&mut pos, config.depth)?, None)
    };

    let report = PerftReport {
        fen: pos.to_fen(),
        depth: config.depth,
        nodes,
        status: movegen::status(&pos).to_string(),
        divide,
        elapsed_ms: started.elapsed().as_millis(),
    };
    tracing::info!(nodes, elapsed_ms = report.elapsed_ms as u64, "perft complete");

    match config.output {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => print_text(&report),
    }
    Ok(())
}

fn print_text(report: &PerftReport) {
    if let Some(entries) = &report.divide {
        for entry in entries {
            println!("{}: {}", entry.uci, entry.nodes);
        }
        println!();
    }
    println!("fen:     {}", report.fen);
    println!("status:  {}", report.status);
    println!("depth:   {}", report.depth);
    println!("nodes:   {}", report.nodes);
    println!("time:    {} ms", report.elapsed_ms);
}
