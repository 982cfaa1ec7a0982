//! CLI shell: flag parsing, logging setup, and exit-code mapping around the
//! pure measurement API in `cache_stride`. Everything measurement-specific
//! lives in the library; this binary is the thin external collaborator
//! spec.md describes.

use cache_stride::config::Config;
use cache_stride::order::Pattern;
use clap::Parser;
use log::error;

// use faster/smaller `mimalloc` allocator over the glibc default; allocator
// jitter on the chase buffer and permutation scratch is exactly the kind of
// noise the "best of N" measurement policy exists to survive
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Pointer-chase memory-hierarchy boundary detector.
#[derive(Parser, Debug)]
#[command(name = "cache-stride", version, about)]
struct Args {
    /// Smallest working-set size to measure, in bytes.
    #[arg(long, default_value_t = 4096)]
    min_bytes: u64,

    /// Largest working-set size to measure, in bytes (clamped to 4 GiB).
    #[arg(long, default_value_t = 256 * 1024 * 1024)]
    max_bytes: u64,

    /// Byte distance between consecutive chase nodes.
    #[arg(long, default_value_t = 256)]
    node_stride: usize,

    /// Target wall-clock time per measured size, in milliseconds.
    #[arg(long, default_value_t = 80)]
    target_ms: u64,

    /// Number of timed repeats per size; the minimum is reported.
    #[arg(long, default_value_t = 3)]
    repeats: u32,

    /// Number of warmup traversals per size before timing starts.
    #[arg(long, default_value_t = 3)]
    warmup_iters: u32,

    /// Chase ordering pattern.
    #[arg(long, default_value = "random")]
    pattern: String,

    /// Pattern-specific argument (e.g. the stride for `stride`).
    #[arg(long, default_value_t = 1)]
    pattern_arg: i64,

    /// Print the per-size data table to stdout.
    #[arg(long, default_value_t = true)]
    print_table: bool,

    /// Pin the measuring thread to a specific CPU core.
    #[arg(long)]
    pin_to_core: Option<usize>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut cfg = Config {
        min_bytes: args.min_bytes,
        max_bytes: args.max_bytes,
        node_stride: args.node_stride,
        target_ms: args.target_ms,
        repeats: args.repeats,
        warmup_iters: args.warmup_iters,
        pattern: Pattern::parse(&args.pattern),
        pattern_arg: args.pattern_arg,
        print_table: args.print_table,
        pin_to_core: args.pin_to_core,
    };

    if let Err(e) = cfg.normalize() {
        error!("{e}");
        std::process::exit(1);
    }

    match cache_stride::driver::run(&cfg) {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}
