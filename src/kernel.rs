//! The latency-bound pointer-chase kernel and its anti-optimization contract.
//!
//! Grounded in the teacher's `measure_latency` (`#[inline(never)]` +
//! `std::hint::black_box` over a raw `unsafe { *ptr.add(idx) }`), generalized
//! per spec.md §4.5/§9:
//! - each load carries a true data dependency to the next load's address
//!   (the teacher's `idx = unsafe { *ptr.add(idx) }` chain);
//! - the kernel is `#[inline(never)]` so it cannot be folded into a caller
//!   that could constant-fold the head pointer;
//! - the final value escapes through `black_box` *and* a process-global
//!   write-only sink, so no reader could prove the loop's result unused even
//!   via whole-program analysis across the crate boundary.
//!
//! The inner loop is unrolled 8x, same as the teacher's `measure_latency`:
//! this is a loop-control detail, not a break in the dependency chain — each
//! load's address is still exactly the previous load's result. A remainder
//! loop handles the `steps % 8` leftover iterations one at a time.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-wide observable sink for chase results. Written once per call to
/// [`chase`]; never read by this program. Its only role is to give the
/// optimizer a reason it cannot prove `chase`'s result dead — do not
/// generalize this into a logger or metrics counter.
static SINK: AtomicUsize = AtomicUsize::new(0);

/// Perform `steps` dependent pointer-width loads starting from `head`,
/// returning the final address reached.
///
/// `head` must point at the first byte of a node written by
/// [`crate::chase_graph::build`] (so the first pointer-width word at every
/// reachable address is itself a valid node address). Safety: the caller
/// must guarantee `head` and every address reachable from it by following
/// `steps` next-pointers lie within a single live allocation.
#[inline(never)]
pub fn chase(head: *const u8, steps: u64) -> *const u8 {
    let mut p = head;

    // SAFETY: contract above guarantees every address reached by following
    // next-pointers from `head` for up to `steps` hops is a valid node
    // address for the duration of the chase.
    macro_rules! step {
        () => {
            let next = unsafe { std::ptr::read_unaligned(p as *const usize) };
            p = std::hint::black_box(next as *const u8);
        };
    }

    let mut remaining = steps;
    while remaining >= 8 {
        step!();
        step!();
        step!();
        step!();
        step!();
        step!();
        step!();
        step!();
        remaining -= 8;
    }
    for _ in 0..remaining {
        step!();
    }

    SINK.store(p as usize, Ordering::Relaxed);
    std::hint::black_box(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chase_graph;
    use crate::order;
    use crate::prng::Prng;

    #[test]
    fn chase_n_steps_over_n_nodes_returns_to_start() {
        let stride = 64;
        let n = 16;
        let mut perm = vec![0usize; n];
        let mut rng = Prng::new(5);
        order::build_permutation(&mut perm, n, order::Pattern::Random, 1, &mut rng);

        let mut buf = vec![0u8; n * stride];
        chase_graph::build(&mut buf, 0, stride, n, &perm);

        let head = buf.as_ptr();
        let result = chase(head, n as u64);
        assert_eq!(result, head);
    }

    #[test]
    fn chase_zero_steps_is_identity() {
        let buf = [0u8; 64];
        let head = buf.as_ptr();
        assert_eq!(chase(head, 0), head);
    }
}
