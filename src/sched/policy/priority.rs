//! Uniprocessor fixed-priority policy: a ready set as an indexed array of
//! FIFO chains (one per priority level) plus a bitmap over occupied levels
//! for O(1) highest-priority lookup, generalizing the bitmap-plus-buckets
//! trick this crate's older lock-free scheduler used for its eight fixed
//! priority levels up to the full `u8` priority range.

use crate::sched::chain::Chain;
use crate::sched::config::{SchedulerId, PER_CPU};
use crate::sched::metrics::METRICS;
use crate::sched::node::{node_destroy, node_initialize, NodeState, SchedulerNode, DEFAULT_TIME_SLICE};
use crate::sched::priority::{compare_numeric_desc, is_higher, CompareFn, Priority};
use crate::sched::smp::heir::{update_heir, InterProcessorInterrupt};
use crate::sched::trait_def::CpuId;
use crate::thread::ThreadId;

const LEVELS: usize = 256;
const BITMAP_WORDS: usize = LEVELS / 64;

pub struct PriorityReadySet {
    chains: [Chain; LEVELS],
    bitmap: [u64; BITMAP_WORDS],
}

impl PriorityReadySet {
    pub const fn new() -> Self {
        PriorityReadySet { chains: [Chain::new(); LEVELS], bitmap: [0; BITMAP_WORDS] }
    }

    fn mark(&mut self, level: u8) {
        let (w, b) = (level as usize / 64, level as usize % 64);
        self.bitmap[w] |= 1 << b;
    }

    fn unmark_if_empty(&mut self, level: u8) {
        if self.chains[level as usize].is_empty() {
            let (w, b) = (level as usize / 64, level as usize % 64);
            self.bitmap[w] &= !(1 << b);
        }
    }

    /// Highest occupied level, "highest" meaning largest numeric value —
    /// the fixed-priority policy's convention (see `compare_numeric_desc`).
    pub fn highest_occupied(&self) -> Option<u8> {
        for (w, word) in self.bitmap.iter().enumerate().rev() {
            if *word != 0 {
                let bit = 63 - word.leading_zeros() as usize;
                return Some((w * 64 + bit) as u8);
            }
        }
        None
    }

    pub fn insert(&mut self, nodes: &mut [SchedulerNode], id: ThreadId, level: u8, prepend: bool) {
        if prepend {
            self.chains[level as usize].push_front(nodes, id);
        } else {
            self.chains[level as usize].push_back(nodes, id);
        }
        self.mark(level);
    }

    pub fn extract(&mut self, nodes: &mut [SchedulerNode], id: ThreadId, level: u8) {
        self.chains[level as usize].extract(nodes, id);
        self.unmark_if_empty(level);
    }

    pub fn pick_highest(&self) -> Option<ThreadId> {
        self.highest_occupied().and_then(|lvl| self.chains[lvl as usize].head())
    }
}

impl Default for PriorityReadySet {
    fn default() -> Self {
        Self::new()
    }
}

pub const MAX_NODES: usize = 64;

/// A complete uniprocessor fixed-priority scheduler instance. Treats the
/// single processor it owns as CPU 0 of a one-entry scheduler assignment,
/// reusing the same heir-update fence the SMP skeleton uses rather than a
/// bespoke single-CPU path.
pub struct PriorityScheduler {
    id: SchedulerId,
    cpu: CpuId,
    nodes: [SchedulerNode; MAX_NODES],
    ready: PriorityReadySet,
    executing: Option<ThreadId>,
    compare: CompareFn,
}

impl PriorityScheduler {
    pub fn new(id: SchedulerId, cpu: CpuId) -> Self {
        PER_CPU.bind_scheduler(cpu, id);
        PriorityScheduler {
            id,
            cpu,
            nodes: [SchedulerNode::uninitialized(0); MAX_NODES],
            ready: PriorityReadySet::new(),
            executing: None,
            compare: compare_numeric_desc,
        }
    }

    pub fn id(&self) -> SchedulerId {
        self.id
    }

    pub fn node_initialize(&mut self, thread: ThreadId, priority: Priority) {
        node_initialize(&mut self.nodes[thread], thread, priority);
    }

    pub fn node_destroy(&mut self, thread: ThreadId) {
        node_destroy(&mut self.nodes[thread]);
    }

    pub fn priority_of(&self, thread: ThreadId) -> Priority {
        self.nodes[thread].priority
    }

    pub fn compare(&self, a: Priority, b: Priority) -> core::cmp::Ordering {
        (self.compare)(a, b)
    }

    fn update_heir_candidate(&mut self, candidate: ThreadId, ipi: &dyn InterProcessorInterrupt) {
        let promote = match PER_CPU.heir(self.cpu) {
            None => true,
            Some(current) => is_higher(self.compare, self.nodes[candidate].priority, self.nodes[current].priority),
        };
        if promote {
            update_heir(self.cpu, self.cpu, candidate, ipi);
        }
    }

    /// Initial placement of a freshly created or migrated-in thread.
    pub fn schedule(&mut self, thread: ThreadId, ipi: &dyn InterProcessorInterrupt) {
        self.unblock(thread, false, ipi);
    }

    pub fn unblock(&mut self, thread: ThreadId, prepend: bool, ipi: &dyn InterProcessorInterrupt) {
        debug_assert_eq!(self.nodes[thread].state, NodeState::Blocked);
        let level = self.nodes[thread].priority.0;
        self.nodes[thread].set_state(NodeState::Ready);
        self.ready.insert(&mut self.nodes, thread, level, prepend);
        self.update_heir_candidate(thread, ipi);
        METRICS.record_unblock();
    }

    pub fn block(&mut self, thread: ThreadId, ipi: &dyn InterProcessorInterrupt) {
        let level = self.nodes[thread].priority.0;
        self.ready.extract(&mut self.nodes, thread, level);
        self.nodes[thread].set_state(NodeState::Blocked);
        if PER_CPU.heir(self.cpu) == Some(thread) {
            let next = self.ready.pick_highest();
            if let Some(heir) = next {
                update_heir(self.cpu, self.cpu, heir, ipi);
            }
        }
        METRICS.record_block();
    }

    /// Yielding always re-selects heir as the new leftmost, even when that
    /// leftmost is merely equal in priority to the thread that just yielded
    /// (e.g. rotating the CPU among FIFO equals) — unlike `unblock`/
    /// `change_priority`, which only promote on a strict improvement.
    pub fn yield_thread(&mut self, thread: ThreadId, ipi: &dyn InterProcessorInterrupt) {
        let level = self.nodes[thread].priority.0;
        self.ready.extract(&mut self.nodes, thread, level);
        self.ready.insert(&mut self.nodes, thread, level, false);
        let highest = self.ready.pick_highest();
        if let Some(heir) = highest {
            update_heir(self.cpu, self.cpu, heir, ipi);
        }
        METRICS.record_yield();
    }

    pub fn change_priority(&mut self, thread: ThreadId, new: Priority, prepend: bool, ipi: &dyn InterProcessorInterrupt) {
        let old_level = self.nodes[thread].priority.0;
        self.ready.extract(&mut self.nodes, thread, old_level);
        self.nodes[thread].priority = new;
        self.ready.insert(&mut self.nodes, thread, new.0, prepend);
        self.update_heir_candidate(thread, ipi);
    }

    pub fn update_priority(&mut self, thread: ThreadId, new: Priority) {
        self.nodes[thread].priority = new;
    }

    /// Decrements the executing thread's remaining time-slice. A node with
    /// `time_slice == 0` is not budget-enforced and is left alone. On
    /// expiry, re-arms the quantum and yields the thread.
    pub fn tick(&mut self, thread: ThreadId, ipi: &dyn InterProcessorInterrupt) {
        if self.nodes[thread].time_slice == 0 {
            return;
        }
        self.nodes[thread].time_slice -= 1;
        if self.nodes[thread].time_slice == 0 {
            self.nodes[thread].time_slice = DEFAULT_TIME_SLICE;
            self.yield_thread(thread, ipi);
        }
    }

    pub fn set_executing(&mut self, thread: Option<ThreadId>) {
        self.executing = thread;
        PER_CPU.set_executing(self.cpu, thread);
    }

    pub fn executing(&self) -> Option<ThreadId> {
        self.executing
    }
}
