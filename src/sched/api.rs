//! Top-level scheduler indirection: the kernel-facing entry points that
//! resolve a thread's bound scheduler instance and forward to it. Every
//! operation here assumes the caller already holds the equivalent of an
//! interrupt-disabled critical section — these functions are not
//! internally re-entrant and never block.

use spin::Mutex;

use crate::error::{ThreadError, ThreadResult};
use crate::sched::config::{SchedulerConfig, SchedulerId, MAX_SCHEDULERS, PER_CPU};
use crate::sched::metrics::METRICS;
use crate::sched::ops::{self, SchedulerInstance};
use crate::sched::priority::Priority;
use crate::sched::smp::affinity::{self, CpuMask};
use crate::sched::smp::heir::{InterProcessorInterrupt, NoIpi};
use crate::sched::trait_def::CpuId;
use crate::thread::{Thread, ThreadId};

pub struct SchedulerTable {
    instances: Mutex<[Option<SchedulerInstance>; MAX_SCHEDULERS]>,
    config: SchedulerConfig,
}

impl SchedulerTable {
    pub const fn new(config: SchedulerConfig) -> Self {
        SchedulerTable {
            instances: Mutex::new([None, None, None, None]),
            config,
        }
    }

    pub fn install(&self, index: usize, instance: SchedulerInstance) {
        self.instances.lock()[index] = Some(instance);
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub(crate) fn with<R>(&self, id: SchedulerId, f: impl FnOnce(&mut SchedulerInstance) -> R) -> ThreadResult<R> {
        let mut table = self.instances.lock();
        match table.get_mut(id.index()).and_then(|slot| slot.as_mut()) {
            Some(instance) => Ok(f(instance)),
            None => Err(ThreadError::InvalidSchedulerId),
        }
    }
}

pub static SCHEDULERS: SchedulerTable = SchedulerTable::new(SchedulerConfig::new());

fn resolve(thread: &Thread) -> ThreadResult<SchedulerId> {
    thread.scheduler_id.ok_or(ThreadError::InvalidSchedulerId)
}

pub fn schedule(thread: &mut Thread, ipi: &dyn InterProcessorInterrupt) -> ThreadResult<()> {
    let id = resolve(thread)?;
    SCHEDULERS.with(id, |s| s.schedule(thread.id, ipi))
}

pub fn yield_thread(thread: &mut Thread, ipi: &dyn InterProcessorInterrupt) -> ThreadResult<()> {
    let id = resolve(thread)?;
    SCHEDULERS.with(id, |s| s.yield_thread(thread.id, ipi))
}

pub fn block(thread: &mut Thread, ipi: &dyn InterProcessorInterrupt) -> ThreadResult<()> {
    let id = resolve(thread)?;
    SCHEDULERS.with(id, |s| s.block(thread.id, ipi))
}

pub fn unblock(thread: &mut Thread, prepend: bool, ipi: &dyn InterProcessorInterrupt) -> ThreadResult<()> {
    let id = resolve(thread)?;
    SCHEDULERS.with(id, |s| s.unblock(thread.id, prepend, ipi))
}

pub fn change_priority(
    thread: &mut Thread,
    new: Priority,
    prepend: bool,
    ipi: &dyn InterProcessorInterrupt,
) -> ThreadResult<()> {
    let id = resolve(thread)?;
    SCHEDULERS.with(id, |s| s.change_priority(thread.id, new, prepend, ipi))?;
    thread.priority = new.0;
    Ok(())
}

pub fn update_priority(thread: &mut Thread, new: Priority) -> ThreadResult<()> {
    let id = resolve(thread)?;
    SCHEDULERS.with(id, |s| s.update_priority(thread.id, new))?;
    thread.priority = new.0;
    Ok(())
}

pub fn release_job(thread: &mut Thread, length: u8, ipi: &dyn InterProcessorInterrupt) -> ThreadResult<()> {
    let id = resolve(thread)?;
    SCHEDULERS.with(id, |s| s.release_job(thread.id, length, ipi))
}

pub fn start_idle(thread: &mut Thread, cpu: CpuId, ipi: &dyn InterProcessorInterrupt) -> ThreadResult<()> {
    let id = resolve(thread)?;
    thread.is_executing_cpu = Some(cpu);
    SCHEDULERS.with(id, |s| ops::start_idle(s, thread.id, cpu, ipi))
}

/// Iterates every processor; for each with a bound scheduler and an
/// executing thread, forwards the tick. Visits processors in increasing
/// index order, matching the invariant that `tick()` covers each exactly
/// once per call.
pub fn tick(ipi: &dyn InterProcessorInterrupt) {
    for cpu in 0..crate::sched::config::MAX_CPUS {
        let (scheduler, executing) = {
            let table = PER_CPU.cpus.lock();
            (table[cpu].scheduler, table[cpu].executing)
        };
        if let (Some(id), Some(thread)) = (scheduler, executing) {
            let _ = SCHEDULERS.with(id, |s| ops::tick(s, cpu, thread, ipi));
        }
    }
}

/// Re-binds `thread` to `target`. Ordering is non-negotiable: mark
/// migrating, destroy the old node, rebind, initialize the new node,
/// re-install current priority, clear migrating.
pub fn set(target: SchedulerId, thread: &mut Thread, ipi: &dyn InterProcessorInterrupt) -> ThreadResult<()> {
    let current = thread.scheduler_id;
    if current == Some(target) {
        return Ok(());
    }

    thread.state = crate::thread::ThreadState::Blocked;

    if let Some(old) = current {
        SCHEDULERS.with(old, |s| s.node_destroy(thread.id))?;
    }

    thread.scheduler_id = Some(target);
    let priority = Priority(thread.priority);
    SCHEDULERS.with(target, |s| s.node_initialize(thread.id, priority))?;
    SCHEDULERS.with(target, |s| s.update_priority(thread.id, priority))?;

    thread.state = crate::thread::ThreadState::Ready;
    METRICS.record_migration();
    schedule(thread, ipi)
}

pub fn get_affinity(thread: &Thread) -> ThreadResult<CpuMask> {
    let id = resolve(thread)?;
    Ok(affinity::get_affinity(&SCHEDULERS.config, id))
}

pub fn set_affinity(thread: &Thread, requested: CpuMask) -> ThreadResult<()> {
    let id = resolve(thread)?;
    if affinity::set_affinity(&SCHEDULERS.config, id, requested) {
        Ok(())
    } else {
        Err(ThreadError::AffinityRejected)
    }
}

pub fn compare(thread_a: &Thread, thread_b: &Thread) -> ThreadResult<core::cmp::Ordering> {
    let id = resolve(thread_a)?;
    SCHEDULERS.with(id, |s| s.compare(Priority(thread_a.priority), Priority(thread_b.priority)))
}

pub fn is_higher(cmp: core::cmp::Ordering) -> bool {
    cmp == core::cmp::Ordering::Greater
}

pub fn is_lower(cmp: core::cmp::Ordering) -> bool {
    cmp == core::cmp::Ordering::Less
}

pub fn highest_of_two(
    scheduler: &SchedulerInstance,
    a: Priority,
    b: Priority,
) -> Priority {
    if is_higher(scheduler.compare(a, b)) { a } else { b }
}

pub fn set_if_higher(scheduler: &SchedulerInstance, slot: &mut Priority, candidate: Priority) -> bool {
    if is_higher(scheduler.compare(candidate, *slot)) {
        *slot = candidate;
        true
    } else {
        false
    }
}

pub fn change_if_higher(scheduler: &SchedulerInstance, current: Priority, candidate: Priority) -> Option<Priority> {
    if is_higher(scheduler.compare(candidate, current)) {
        Some(candidate)
    } else {
        None
    }
}

/// Convenience for call sites with no real interrupt controller wired up.
pub static DEFAULT_IPI: NoIpi = NoIpi;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::policy::priority::PriorityScheduler;
    use std::vec;

    fn dummy_entry() {}

    #[test]
    fn set_rebinds_and_reschedules_thread() {
        SCHEDULERS.install(2, SchedulerInstance::Priority(PriorityScheduler::new(SchedulerId::from_index(2), 2)));
        SCHEDULERS.install(3, SchedulerInstance::Priority(PriorityScheduler::new(SchedulerId::from_index(3), 3)));

        let mut stack = vec![0u8; 32 * 1024];
        let stack: &'static mut [u8] = unsafe { std::mem::transmute(stack.as_mut_slice()) };
        let mut thread = Thread::new(10, stack, dummy_entry, 5);
        thread.scheduler_id = Some(SchedulerId::from_index(2));
        SCHEDULERS
            .with(SchedulerId::from_index(2), |s| s.node_initialize(10, Priority(5)))
            .unwrap();

        set(SchedulerId::from_index(3), &mut thread, &DEFAULT_IPI).unwrap();
        assert_eq!(thread.scheduler_id, Some(SchedulerId::from_index(3)));
        assert_eq!(thread.state, crate::thread::ThreadState::Ready);
    }
}
