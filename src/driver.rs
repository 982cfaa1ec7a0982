//! Orchestrates the whole measurement: allocates the buffer (with
//! fallback-on-OOM shrinking), drives the Measurer across the generated
//! sizes, streams the table, and prints the boundary summary.

use log::{info, warn};

use crate::boundary::{self, Boundary};
use crate::config::Config;
use crate::error::Error;
use crate::format::human_size;
use crate::measure::{MeasureConfig, Measurer, Sample};
use crate::prng::Prng;
use crate::size_gen;

/// Aligned allocation for the chase buffer. A plain `Vec<u8>` is not
/// guaranteed aligned beyond `align_of::<u8>()`; this wraps a manually
/// over-allocated, alignment-corrected region so the arena base satisfies
/// `node_stride` alignment, per the Data Model's pointer-alignment
/// invariant.
struct AlignedBuffer {
    raw: Vec<u8>,
    offset: usize,
    len: usize,
}

impl AlignedBuffer {
    fn try_new(len: usize, align: usize) -> Option<Self> {
        if len == 0 {
            return Some(AlignedBuffer {
                raw: Vec::new(),
                offset: 0,
                len: 0,
            });
        }
        let mut raw = Vec::new();
        raw.try_reserve_exact(len + align).ok()?;
        raw.resize(len + align, 0u8);
        let base = raw.as_ptr() as usize;
        let offset = align - (base % align);
        let offset = if offset == align { 0 } else { offset };
        Some(AlignedBuffer { raw, offset, len })
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.raw[self.offset..self.offset + self.len]
    }
}

pub struct Report {
    pub samples: Vec<Sample>,
    pub boundaries: Vec<Boundary>,
    pub allocated_bytes: u64,
}

/// Run the full measurement per `cfg`, returning the completed report.
///
/// Failure semantics: allocation failure at the smallest configured size is
/// fatal ([`Error::AllocationFailure`]); any other allocation failure
/// downsizes the working-set list transparently. A failure to read the
/// clock is fatal ([`Error::ClockUnavailable`]).
pub fn run(cfg: &Config) -> Result<Report, Error> {
    crate::timer::Timer::new()
        .checked_now_ns()
        .map_err(|_| Error::ClockUnavailable)?;

    if let Some(core) = cfg.pin_to_core {
        let core_id = core_affinity::CoreId { id: core };
        if core_affinity::set_for_current(core_id) {
            info!("pinned measurement thread to core {core}");
        } else {
            warn!("couldn't pin measurement thread to core {core} (continuing unpinned)");
        }
    }
    if thread_priority::set_current_thread_priority(thread_priority::ThreadPriority::Max).is_err() {
        warn!("couldn't raise measurement thread priority (continuing at default priority)");
    }

    let mut sizes = size_gen::generate(cfg.min_bytes, cfg.max_bytes, size_gen::DEFAULT_MAX_SIZES);
    if sizes.is_empty() {
        return Err(Error::InvalidConfiguration(format!(
            "no working-set sizes in [{}, {}]",
            cfg.min_bytes, cfg.max_bytes
        )));
    }

    let align = cfg.node_stride;
    let mut buffer = allocate_with_shrink(&mut sizes, align)?;
    for byte in buffer.as_mut_slice() {
        *byte = 0;
    }

    let allocated_bytes = *sizes.last().unwrap();
    let max_nodes = (allocated_bytes as usize / cfg.node_stride).max(2);
    let mut measurer = Measurer::new(max_nodes, Prng::from_environment().next());

    let measure_cfg = MeasureConfig {
        node_stride: cfg.node_stride,
        target_ms: cfg.target_ms,
        repeats: cfg.repeats,
        warmup_iters: cfg.warmup_iters,
        pattern: cfg.pattern,
        pattern_arg: cfg.pattern_arg,
    };

    if cfg.print_table {
        let step_suffix = if cfg.pattern == crate::order::Pattern::Stride {
            format!(", step={}", cfg.pattern_arg)
        } else {
            String::new()
        };
        println!(
            "# Cache size detection via pointer-chasing (node_stride={}b, pattern={}{})",
            cfg.node_stride,
            cfg.pattern.name(),
            step_suffix
        );
        println!("# size_bytes\tlatency_ns_per_access");
    }

    let mut samples = Vec::with_capacity(sizes.len());
    for &size in &sizes {
        let sample = measurer.measure(buffer.as_mut_slice(), size, &measure_cfg);
        if cfg.print_table {
            println!("{}\t{:.3}", sample.working_set_bytes, sample.ns_per_access);
        }
        info!(
            "measured {} bytes: {:.3} ns/access",
            sample.working_set_bytes, sample.ns_per_access
        );
        samples.push(sample);
    }

    let boundaries = boundary::detect(&samples);

    if cfg.print_table {
        println!();
        print_summary(&boundaries);
    }

    Ok(Report {
        samples,
        boundaries,
        allocated_bytes,
    })
}

fn print_summary(boundaries: &[Boundary]) {
    println!("Detected cache levels (approx):");
    if boundaries.is_empty() {
        println!("(no sustained latency step found across the measured size range)");
        return;
    }
    let labels = ["L1", "L2", "L3", "L4", "L?", "L?", "L?", "L?"];
    for (i, b) in boundaries.iter().enumerate() {
        let label = labels.get(i).copied().unwrap_or("L?");
        println!(
            "- {} capacity ~ {} (jump x{:.2})",
            label,
            human_size(b.approx_size_bytes),
            b.ratio
        );
    }
}

/// Allocate `sizes.last()` bytes aligned to `align`, shrinking the tail of
/// `sizes` and retrying on allocation failure until one succeeds or the list
/// is exhausted (the smallest size failing is fatal).
fn allocate_with_shrink(sizes: &mut Vec<u64>, align: usize) -> Result<AlignedBuffer, Error> {
    loop {
        let Some(&largest) = sizes.last() else {
            return Err(Error::AllocationFailure { requested_bytes: 0 });
        };
        match AlignedBuffer::try_new(largest as usize, align) {
            Some(buf) => return Ok(buf),
            None => {
                if sizes.len() == 1 {
                    return Err(Error::AllocationFailure {
                        requested_bytes: largest as usize,
                    });
                }
                warn!("allocation of {largest} bytes failed; shrinking working-set list");
                sizes.pop();
            }
        }
    }
}
