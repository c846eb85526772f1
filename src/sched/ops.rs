//! Policy dispatch. The original vtable is a function-pointer table keyed
//! by a type-erased context pointer; in a no_std, allocation-free crate a
//! tagged union reached through `match` is the equivalent without a
//! `dyn Trait` object (see DESIGN.md for why the sum-type form was chosen
//! over a boxed trait object here).

use core::cmp::Ordering;

use crate::sched::config::SchedulerId;
use crate::sched::node::NodeState;
use crate::sched::policy::edf::EdfScheduler;
use crate::sched::policy::priority::PriorityScheduler;
use crate::sched::priority::Priority;
use crate::sched::smp::heir::InterProcessorInterrupt;
use crate::sched::smp::priority_policy::SmpPriorityContext;
use crate::sched::smp::{self, SmpPolicy};
use crate::sched::trait_def::CpuId;
use crate::thread::ThreadId;

pub enum SchedulerInstance {
    Priority(PriorityScheduler),
    Edf(EdfScheduler),
    SmpPriority(SmpPriorityContext),
}

impl SchedulerInstance {
    pub fn id(&self) -> SchedulerId {
        match self {
            SchedulerInstance::Priority(s) => s.id(),
            SchedulerInstance::Edf(s) => s.id(),
            SchedulerInstance::SmpPriority(s) => s.scheduler_id(),
        }
    }

    pub fn compare(&self, a: Priority, b: Priority) -> Ordering {
        match self {
            SchedulerInstance::Priority(s) => s.compare(a, b),
            SchedulerInstance::Edf(_) => crate::sched::priority::compare_edf(a, b),
            SchedulerInstance::SmpPriority(s) => (s.compare())(a, b),
        }
    }

    pub fn node_initialize(&mut self, thread: ThreadId, priority: Priority) {
        match self {
            SchedulerInstance::Priority(s) => s.node_initialize(thread, priority),
            SchedulerInstance::Edf(s) => s.node_initialize(thread, priority),
            SchedulerInstance::SmpPriority(s) => s.node_initialize(thread, priority),
        }
    }

    pub fn node_destroy(&mut self, thread: ThreadId) {
        match self {
            SchedulerInstance::Priority(s) => s.node_destroy(thread),
            SchedulerInstance::Edf(s) => s.node_destroy(thread),
            SchedulerInstance::SmpPriority(s) => s.node_destroy(thread),
        }
    }

    pub fn schedule(&mut self, thread: ThreadId, ipi: &dyn InterProcessorInterrupt) {
        match self {
            SchedulerInstance::Priority(s) => s.schedule(thread, ipi),
            SchedulerInstance::Edf(s) => s.unblock(thread, ipi),
            SchedulerInstance::SmpPriority(s) => smp::unblock(s, ipi, thread),
        }
    }

    pub fn unblock(&mut self, thread: ThreadId, prepend: bool, ipi: &dyn InterProcessorInterrupt) {
        match self {
            SchedulerInstance::Priority(s) => s.unblock(thread, prepend, ipi),
            SchedulerInstance::Edf(s) => s.unblock(thread, ipi),
            SchedulerInstance::SmpPriority(s) => smp::unblock(s, ipi, thread),
        }
    }

    pub fn block(&mut self, thread: ThreadId, ipi: &dyn InterProcessorInterrupt) {
        match self {
            SchedulerInstance::Priority(s) => s.block(thread, ipi),
            SchedulerInstance::Edf(s) => s.block(thread, ipi),
            SchedulerInstance::SmpPriority(s) => smp::block(s, ipi, thread),
        }
    }

    pub fn yield_thread(&mut self, thread: ThreadId, ipi: &dyn InterProcessorInterrupt) {
        match self {
            SchedulerInstance::Priority(s) => s.yield_thread(thread, ipi),
            SchedulerInstance::Edf(s) => s.yield_thread(thread, ipi),
            SchedulerInstance::SmpPriority(s) => smp::yield_thread(s, thread),
        }
    }

    pub fn change_priority(&mut self, thread: ThreadId, new: Priority, prepend: bool, ipi: &dyn InterProcessorInterrupt) {
        match self {
            SchedulerInstance::Priority(s) => s.change_priority(thread, new, prepend, ipi),
            SchedulerInstance::Edf(s) => s.change_priority(thread, new, ipi),
            SchedulerInstance::SmpPriority(s) => smp::change_priority(s, ipi, thread, new),
        }
    }

    pub fn update_priority(&mut self, thread: ThreadId, new: Priority) {
        match self {
            SchedulerInstance::Priority(s) => s.update_priority(thread, new),
            SchedulerInstance::Edf(s) => s.update_priority(thread, new),
            SchedulerInstance::SmpPriority(s) => s.set_priority(thread, new),
        }
    }

    pub fn release_job(&mut self, thread: ThreadId, length: u8, ipi: &dyn InterProcessorInterrupt) {
        match self {
            SchedulerInstance::Edf(s) => s.release_job(thread, length, ipi),
            // Fixed-priority policies have no deadline key to adjust.
            SchedulerInstance::Priority(_) | SchedulerInstance::SmpPriority(_) => {}
        }
    }

    pub fn node_state(&self, thread: ThreadId) -> Option<NodeState> {
        match self {
            SchedulerInstance::SmpPriority(s) => Some(s.state_of(thread)),
            _ => None,
        }
    }
}

/// Per-processor bookkeeping call: decrement the executing thread's
/// time-slice and yield it on expiry. The remaining time-slice lives on the
/// thread's `SchedulerNode` (see `sched::node::SchedulerNode::time_slice`),
/// not the thread object, since it's the scheduler's own accounting.
pub fn tick(instance: &mut SchedulerInstance, cpu: CpuId, executing: ThreadId, ipi: &dyn InterProcessorInterrupt) {
    let _ = cpu;
    match instance {
        SchedulerInstance::Priority(s) => s.tick(executing, ipi),
        SchedulerInstance::Edf(s) => s.tick(executing, ipi),
        SchedulerInstance::SmpPriority(s) => s.tick(executing, ipi),
    }
}

pub fn start_idle(instance: &mut SchedulerInstance, thread: ThreadId, cpu: CpuId, ipi: &dyn InterProcessorInterrupt) {
    let _ = cpu;
    instance.schedule(thread, ipi);
}
