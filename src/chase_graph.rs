//! Writes a Hamiltonian cycle of next-pointers into an aligned byte buffer,
//! re-expressing the source's raw-pointer graph as an arena of fixed-size
//! cells addressed by offset, with the first machine word of each cell
//! holding an address within the same arena.

/// Build the chase graph for `n` nodes over `buffer`, starting at
/// `base_offset`, using `node_stride`-byte cells and permutation `perm`
/// (must satisfy [`crate::order::is_permutation`] for `n`).
///
/// For `i` in `[0, n)`, writes at offset `base_offset + perm[i] * node_stride`
/// the address of the node at `base_offset + perm[(i+1) % n] * node_stride`,
/// inducing the cycle `perm[0] -> perm[1] -> ... -> perm[n-1] -> perm[0]`.
///
/// # Panics
/// Panics if `buffer` is too small to hold `n` nodes at `node_stride`, if
/// `node_stride` is not a multiple of the pointer size, or if `perm` is not
/// a valid permutation of `[0, n)` in debug builds.
pub fn build(buffer: &mut [u8], base_offset: usize, node_stride: usize, n: usize, perm: &[usize]) {
    const PTR_SIZE: usize = std::mem::size_of::<usize>();
    assert_eq!(node_stride % PTR_SIZE, 0, "node_stride must be pointer-aligned");
    assert!(n >= 2, "a chase graph needs at least 2 nodes");
    debug_assert!(crate::order::is_permutation(perm, n));
    assert!(
        base_offset + n * node_stride <= buffer.len(),
        "buffer too small for {n} nodes at stride {node_stride}"
    );

    let base_ptr = buffer.as_ptr() as usize;
    for i in 0..n {
        let cur_node = perm[i];
        let next_node = perm[(i + 1) % n];
        let next_addr = base_ptr + base_offset + next_node * node_stride;
        let cell = &mut buffer[base_offset + cur_node * node_stride..];
        cell[..PTR_SIZE].copy_from_slice(&next_addr.to_ne_bytes());
    }
}

/// Read the next-pointer stored at a node's address, returning it as an
/// offset into `buffer` (used by tests to walk a built graph without the
/// kernel's unsafe raw-pointer chase).
pub fn read_next(buffer: &[u8], node_addr_offset: usize) -> usize {
    const PTR_SIZE: usize = std::mem::size_of::<usize>();
    let mut bytes = [0u8; PTR_SIZE];
    bytes.copy_from_slice(&buffer[node_addr_offset..node_addr_offset + PTR_SIZE]);
    let base_ptr = buffer.as_ptr() as usize;
    usize::from_ne_bytes(bytes) - base_ptr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order;
    use crate::prng::Prng;

    #[test]
    fn three_node_cycle_matches_spec_example() {
        let stride = 64;
        let n = 3;
        let mut buf = vec![0u8; n * stride];
        let perm = [2usize, 0, 1];
        build(&mut buf, 0, stride, n, &perm);

        assert_eq!(read_next(&buf, 2 * stride), 0);
        assert_eq!(read_next(&buf, 0), stride);
        assert_eq!(read_next(&buf, stride), 2 * stride);

        // 3 chase steps from node 2 return to node 2.
        let mut offset = 2 * stride;
        for _ in 0..3 {
            offset = read_next(&buf, offset);
        }
        assert_eq!(offset, 2 * stride);
    }

    #[test]
    fn visits_every_node_exactly_once_for_every_pattern() {
        let stride = 64;
        let n = 50;
        let mut rng = Prng::new(99);
        for pattern in [
            order::Pattern::Random,
            order::Pattern::Sequential,
            order::Pattern::Reverse,
            order::Pattern::Stride,
            order::Pattern::Interleave,
            order::Pattern::Gray,
            order::Pattern::Bitrev,
        ] {
            let mut perm = vec![0usize; n];
            order::build_permutation(&mut perm, n, pattern, 7, &mut rng);
            let mut buf = vec![0u8; n * stride];
            build(&mut buf, 0, stride, n, &perm);

            let mut visited = vec![false; n];
            let mut offset = 0usize;
            for _ in 0..n {
                let node_idx = offset / stride;
                assert!(!visited[node_idx], "revisited node {node_idx} under {pattern:?}");
                visited[node_idx] = true;
                offset = read_next(&buf, offset);
            }
            assert!(visited.iter().all(|&v| v), "not all nodes visited under {pattern:?}");
            assert_eq!(offset, 0, "cycle did not close under {pattern:?}");
        }
    }
}
