use clap::Parser;
use icpc_board::{parse_line, render, Engine};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Replay a contest command log and print the protocol output.
#[derive(Parser, Debug)]
#[command(name = "replay", version)]
struct Args {
    /// Command file (defaults to stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Export the last ranked scoreboard as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let mut engine = Engine::new();
    let mut lines = 0u64;

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        lines += 1;

        let cmd = match parse_line(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = lineno + 1, error = %e, "skipping unparsable line");
                continue;
            }
        };

        for event in engine.process_command(cmd) {
            render(&event, &mut out)?;
        }

        if engine.is_ended() {
            break;
        }
    }
    out.flush()?;

    info!(lines, hash = engine.state_hash(), "replay finished");

    if let Some(path) = &args.csv {
        engine.contest.scoreboard().write_csv(File::create(path)?)?;
        info!(path = %path.display(), "scoreboard exported");
    }

    Ok(())
}
