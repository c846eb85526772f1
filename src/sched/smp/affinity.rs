//! Affinity queries. Grounded in `_Scheduler_default_Get/Set_affinity_body`:
//! the default policy never rejects a mask about processors it doesn't own,
//! it only insists on agreement for processors it does own.

use crate::sched::config::{SchedulerConfig, SchedulerId, MAX_CPUS};
use crate::sched::trait_def::CpuId;

pub type CpuMask = u32;

pub fn get_affinity(config: &SchedulerConfig, owner: SchedulerId) -> CpuMask {
    let mut mask: CpuMask = 0;
    for cpu in 0..MAX_CPUS {
        if config.owner_of(cpu) == Some(owner) {
            mask |= 1 << cpu;
        }
    }
    mask
}

/// Accepts `requested` iff, for every processor index, either the bit is
/// set or that processor is not owned by `owner` at all. A mask that would
/// leave the thread with zero eligible processors under `owner` is still
/// accepted — the source does not special-case that, and this crate keeps
/// that behavior (see DESIGN.md).
pub fn set_affinity(config: &SchedulerConfig, owner: SchedulerId, requested: CpuMask) -> bool {
    for cpu in 0..MAX_CPUS {
        let owned_by_us = config.owner_of(cpu) == Some(owner);
        let requested_bit = requested & (1 << cpu) != 0;
        if owned_by_us && !requested_bit {
            return false;
        }
    }
    true
}

/// On uniprocessor there is exactly one processor to request; the degenerate
/// case of `set_affinity` above, spelled out per spec's explicit UP note.
pub fn up_set_affinity(requested: CpuMask) -> bool {
    requested & 1 != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::config::ProcessorAssignment;

    fn config_with(owner: SchedulerId, owned_cpus: &[CpuId]) -> SchedulerConfig {
        let mut config = SchedulerConfig::new();
        for &cpu in owned_cpus {
            config.assignments[cpu] = ProcessorAssignment::new(owner, false);
        }
        config
    }

    #[test]
    fn get_affinity_reports_owned_processors_only() {
        let owner = SchedulerId::from_index(0);
        let config = config_with(owner, &[0, 2]);
        assert_eq!(get_affinity(&config, owner), 0b0101);
    }

    #[test]
    fn set_affinity_rejects_dropping_an_owned_processor() {
        let owner = SchedulerId::from_index(0);
        let config = config_with(owner, &[0, 1]);
        assert!(!set_affinity(&config, owner, 0b01));
        assert!(set_affinity(&config, owner, 0b11));
    }

    #[test]
    fn set_affinity_ignores_bits_for_processors_we_dont_own() {
        let owner = SchedulerId::from_index(0);
        let config = config_with(owner, &[0]);
        // Bit for cpu 1 (owned by nobody here) is irrelevant either way.
        assert!(set_affinity(&config, owner, 0b01));
        assert!(set_affinity(&config, owner, 0b11));
    }

    #[test]
    fn up_set_affinity_requires_the_sole_processor() {
        assert!(up_set_affinity(0b1));
        assert!(!up_set_affinity(0b0));
    }
}
