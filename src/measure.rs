//! Per-size measurement: build the chase graph, warm it, adaptively choose
//! an iteration count to hit a target wall time, repeat, and report the
//! minimum per-access latency observed.

use crate::chase_graph;
use crate::kernel;
use crate::order::{self, Pattern};
use crate::prng::Prng;
use crate::timer::Timer;

/// One size's measurement result, in the order Samples are produced
/// (ascending working-set size).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub working_set_bytes: u64,
    pub ns_per_access: f64,
}

pub struct MeasureConfig {
    pub node_stride: usize,
    pub target_ms: u64,
    pub repeats: u32,
    pub warmup_iters: u32,
    pub pattern: Pattern,
    pub pattern_arg: i64,
}

/// Scratch state reused across measurements: one permutation buffer sized
/// for the largest size the Driver will ever measure, and one RNG instance
/// so `random` ordering draws a fresh shuffle per size rather than repeating.
pub struct Measurer {
    perm_scratch: Vec<usize>,
    rng: Prng,
}

impl Measurer {
    pub fn new(max_nodes: usize, seed: u64) -> Self {
        Measurer {
            perm_scratch: vec![0usize; max_nodes],
            rng: Prng::new(seed),
        }
    }

    /// Measure one working-set size against `buffer`, writing the chase
    /// graph into its first `num_nodes * node_stride` bytes.
    pub fn measure(&mut self, buffer: &mut [u8], working_set_bytes: u64, cfg: &MeasureConfig) -> Sample {
        let num_nodes = ((working_set_bytes as usize) / cfg.node_stride).max(2);
        debug_assert!(self.perm_scratch.len() >= num_nodes);

        order::build_permutation(
            &mut self.perm_scratch[..num_nodes],
            num_nodes,
            cfg.pattern,
            cfg.pattern_arg,
            &mut self.rng,
        );
        chase_graph::build(buffer, 0, cfg.node_stride, num_nodes, &self.perm_scratch[..num_nodes]);

        let timer = Timer::new();
        let head = buffer.as_ptr();

        for _ in 0..cfg.warmup_iters {
            std::hint::black_box(kernel::chase(head, num_nodes as u64));
        }

        let mut steps = (16 * num_nodes as u64).max(1000);
        let target_ns = cfg.target_ms.saturating_mul(1_000_000);
        loop {
            let start = timer.now_ns();
            std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);
            std::hint::black_box(kernel::chase(head, steps));
            std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);
            let elapsed = timer.now_ns() - start;
            if elapsed >= target_ns / 2 || steps >= 1u64 << 62 {
                break;
            }
            steps = steps.saturating_mul(2).min(1u64 << 62);
        }

        let mut best_ns_per_access = f64::MAX;
        for _ in 0..cfg.repeats.max(1) {
            let start = timer.now_ns();
            std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);
            std::hint::black_box(kernel::chase(head, steps));
            std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);
            let elapsed = timer.now_ns() - start;
            let ns_per_access = elapsed as f64 / steps as f64;
            if ns_per_access < best_ns_per_access {
                best_ns_per_access = ns_per_access;
            }
        }

        Sample {
            working_set_bytes,
            ns_per_access: best_ns_per_access,
        }
    }
}
