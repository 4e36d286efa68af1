use clap::Parser;
use icpc_board::{Command, Engine, Submit};
use hdrhistogram::Histogram;
use std::time::Instant;

const STATUSES: [&str; 4] = ["Accepted", "Wrong_Answer", "Runtime_Error", "Time_Limit_Exceed"];

/// Measure per-command latency of submit and flush, and the cost of a full scroll.
#[derive(Parser, Debug)]
#[command(name = "latency-report")]
struct Args {
    #[arg(long, default_value_t = 500)]
    teams: u32,

    #[arg(long, default_value_t = 13)]
    problems: u32,

    /// Submissions before the freeze; the same number follows it
    #[arg(long, default_value_t = 50_000)]
    submissions: u64,

    #[arg(long, default_value_t = 12345)]
    seed: u64,
}

fn print_report(label: &str, histogram: &Histogram<u64>) {
    println!("\n=== {} Latency (ns) ===", label);
    println!("Count:  {:6}", histogram.len());
    println!("Min:    {:6} ns", histogram.min());
    println!("P50:    {:6} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:6} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:6} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:6} ns", histogram.value_at_quantile(0.999));
    println!("Max:    {:6} ns", histogram.max());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    println!("Preparing Latency Benchmark...");

    let mut engine = Engine::new();
    for t in 0..args.teams {
        engine.process_command(Command::AddTeam(format!("team{t:04}")));
    }
    engine.process_command(Command::Start { duration: 300, problems: args.problems });

    let mut submit_hist = Histogram::<u64>::new_with_bounds(1, 10_000_000, 3)?;
    let mut flush_hist = Histogram::<u64>::new_with_bounds(1, 1_000_000_000, 3)?;

    // Simple LCG, deterministic per seed
    let mut rng = args.seed;
    let mut next = move || {
        rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
        rng >> 33
    };

    println!("Running {} submissions per phase...", args.submissions);

    for phase in 0..2 {
        if phase == 1 {
            engine.process_command(Command::Freeze);
        }
        for i in 0..args.submissions {
            let cmd = Command::Submit(Submit {
                problem: (b'A' + (next() % args.problems as u64) as u8) as char,
                team: format!("team{:04}", next() % args.teams as u64),
                status: STATUSES[(next() % 4) as usize].to_string(),
                time: (i * 300 / (2 * args.submissions) + phase * 150) as u32,
            });

            let start = Instant::now();
            std::hint::black_box(engine.process_command(cmd));
            submit_hist.record(start.elapsed().as_nanos() as u64).unwrap_or(());

            if i % 1000 == 0 {
                let start = Instant::now();
                std::hint::black_box(engine.process_command(Command::Flush));
                flush_hist.record(start.elapsed().as_nanos() as u64).unwrap_or(());
            }
        }
    }

    let pending = engine.contest.pending_count();
    let start = Instant::now();
    let events = engine.process_command(Command::Scroll);
    let scroll_time = start.elapsed();

    print_report("Submit", &submit_hist);
    print_report("Flush", &flush_hist);

    println!("\n=== Scroll ===");
    println!("Pending revealed: {}", pending);
    println!("Events emitted:   {}", events.len());
    println!("Total time:       {:.3} ms", scroll_time.as_secs_f64() * 1000.0);

    Ok(())
}
