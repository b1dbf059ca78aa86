use clap::{Parser, ValueEnum};
use hdrhistogram::Histogram;
use rb_index::{Key, RbTree, NULL_INDEX};
use std::time::Instant;
use tracing::info;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Pattern {
    /// Pseudo-random keys (LCG)
    Random,
    /// Strictly increasing keys, the worst case for an unbalanced tree
    Ascending,
    /// Alternating outside-in keys
    Zigzag,
}

#[derive(Parser, Debug)]
#[command(name = "latency-report", about = "Insert latency histogram")]
struct Args {
    /// Number of insertions to measure
    #[arg(long, default_value_t = 1_000_000)]
    iterations: u32,

    #[arg(long, value_enum, default_value_t = Pattern::Random)]
    pattern: Pattern,

    /// Pin to the last available CPU core
    #[arg(long)]
    pin: bool,
}

/// The last core is typically isolated from OS interrupts.
fn pin_to_last_core() {
    if let Some(core_ids) = core_affinity::get_core_ids() {
        if let Some(last_core) = core_ids.last() {
            core_affinity::set_for_current(*last_core);
        }
    }
}

fn capacity_for(iterations: u32) -> u32 {
    iterations.min(NULL_INDEX - 1)
}

fn key_at(pattern: Pattern, i: u32, rng: &mut u64) -> Key {
    match pattern {
        Pattern::Random => {
            *rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
            (*rng >> 16) as i64
        }
        Pattern::Ascending => i as Key,
        Pattern::Zigzag => {
            let half = (i / 2) as Key;
            if i % 2 == 0 { half } else { -half - 1 }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    rb_index::logging::init("info");
    let args = Args::parse();

    if args.pin {
        pin_to_last_core();
    }

    println!("Preparing Latency Benchmark...");

    // The index space reserves NULL_INDEX, so the largest request is clamped
    let mut tree = RbTree::with_capacity(capacity_for(args.iterations));
    tree.warm_up();

    let mut histogram = Histogram::<u64>::new_with_bounds(1, 100_000, 3)?;

    println!("Running {} insertions ({:?})...", args.iterations, args.pattern);

    let mut rng = 12345u64;
    let mut total_duration = std::time::Duration::new(0, 0);

    for i in 0..args.iterations {
        let key = key_at(args.pattern, i, &mut rng);

        // Critical measurement section
        let start = Instant::now();
        std::hint::black_box(tree.insert(key));
        let elapsed = start.elapsed();

        // Outliers above the histogram bound are dropped
        histogram.record(elapsed.as_nanos() as u64).unwrap_or(());
        total_duration += elapsed;
    }

    let n = tree.len() as f64;
    info!(len = tree.len(), height = tree.height(), "tree built");

    println!("\n=== Insert Latency Report (ns) ===");
    println!("Total Ops:  {}", args.iterations);
    println!("Stored:     {}", tree.len());
    println!("Height:     {} (bound {:.1})", tree.height(), 2.0 * (n + 1.0).log2());
    println!("Throughput: {:.2} ops/sec", args.iterations as f64 / total_duration.as_secs_f64());
    println!("---------------------------");
    println!("Min:    {:6} ns", histogram.min());
    println!("P50:    {:6} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:6} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:6} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:6} ns", histogram.value_at_quantile(0.999));
    println!("P99.99: {:6} ns", histogram.value_at_quantile(0.9999));
    println!("Max:    {:6} ns", histogram.max());
    println!("---------------------------");

    println!("\nDistribution:");
    for v in histogram.iter_log(100, 2.0) {
        let count = v.count_since_last_iteration();
        if count > 0 {
            println!("<= {:6} ns: {:10} count", v.value_iterated_to(), count);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_clamped_below_null_index() {
        assert_eq!(capacity_for(u32::MAX), NULL_INDEX - 1);
        assert_eq!(capacity_for(1_000), 1_000);
        assert!(capacity_for(NULL_INDEX) < NULL_INDEX);
    }
}
