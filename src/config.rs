//! Plain configuration struct and its clamping/validation rules. Deliberately
//! independent of `clap` so the core library has no CLI dependency; the
//! `clap` surface in `src/bin/cache-stride.rs` builds one of these and hands
//! it to [`crate::driver::run`].

use crate::error::Error;
use crate::order::Pattern;

const PTR_SIZE: u64 = std::mem::size_of::<usize>() as u64;
const FOUR_GIB: u64 = 4 * 1024 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub min_bytes: u64,
    pub max_bytes: u64,
    pub node_stride: usize,
    pub target_ms: u64,
    pub repeats: u32,
    pub warmup_iters: u32,
    pub pattern: Pattern,
    pub pattern_arg: i64,
    pub print_table: bool,
    pub pin_to_core: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            min_bytes: 4096,
            max_bytes: 256 * 1024 * 1024,
            node_stride: 256,
            target_ms: 80,
            repeats: 3,
            warmup_iters: 3,
            pattern: Pattern::Random,
            pattern_arg: 1,
            print_table: true,
            pin_to_core: None,
        }
    }
}

impl Config {
    /// Normalize the configuration in place per the external-interface
    /// clamping rules: `max_bytes` is clamped into `min_bytes..4 GiB`,
    /// `node_stride` is raised to at least `2 * pointer size` and rounded up
    /// to a multiple of pointer alignment, and `min_bytes < node_stride` is
    /// clamped to `node_stride * 2`. Returns an error only for configuration
    /// that cannot be sanely normalized (zero-sized sweep).
    pub fn normalize(&mut self) -> Result<(), Error> {
        if !(self.node_stride as u64).is_multiple_of(PTR_SIZE) {
            self.node_stride = (self.node_stride as u64).div_ceil(PTR_SIZE) as usize * PTR_SIZE as usize;
        }
        if (self.node_stride as u64) < 2 * PTR_SIZE {
            self.node_stride = (2 * PTR_SIZE) as usize;
        }

        if self.min_bytes < self.node_stride as u64 {
            self.min_bytes = self.node_stride as u64 * 2;
        }

        self.max_bytes = self.max_bytes.clamp(self.min_bytes, FOUR_GIB);

        if self.min_bytes > self.max_bytes {
            return Err(Error::InvalidConfiguration(format!(
                "min_bytes ({}) exceeds the 4 GiB ceiling after clamping",
                self.min_bytes
            )));
        }
        if self.repeats == 0 {
            self.repeats = 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_below_node_stride_is_clamped() {
        let mut cfg = Config {
            min_bytes: 10,
            node_stride: 256,
            ..Config::default()
        };
        cfg.normalize().unwrap();
        assert_eq!(cfg.min_bytes, 512);
    }

    #[test]
    fn node_stride_below_minimum_is_raised() {
        let mut cfg = Config {
            node_stride: 4,
            ..Config::default()
        };
        cfg.normalize().unwrap();
        assert!(cfg.node_stride as u64 >= 2 * PTR_SIZE);
    }

    #[test]
    fn max_bytes_is_clamped_to_four_gib() {
        let mut cfg = Config {
            max_bytes: u64::MAX,
            ..Config::default()
        };
        cfg.normalize().unwrap();
        assert_eq!(cfg.max_bytes, FOUR_GIB);
    }
}
