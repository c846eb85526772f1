//! Earliest-deadline-first policy. The real RTEMS implementation keys a
//! red-black tree on the (inverted) priority field; this crate is
//! allocation-free and has no tree, so the ready set is a single chain
//! kept sorted by `compare_edf`, giving O(n) insert and O(1) leftmost
//! pick instead of O(log n)/O(1) — an explicit complexity trade-off for
//! not pulling in `alloc`, recorded in DESIGN.md.

use crate::sched::chain::Chain;
use crate::sched::config::{SchedulerId, PER_CPU};
use crate::sched::node::{node_destroy, node_initialize, NodeState, SchedulerNode, DEFAULT_TIME_SLICE};
use crate::sched::priority::{compare_edf, is_higher, CompareFn, Priority};
use crate::sched::smp::heir::{update_heir, InterProcessorInterrupt};
use crate::sched::trait_def::CpuId;
use crate::thread::ThreadId;

pub const MAX_NODES: usize = 64;

pub struct EdfScheduler {
    id: SchedulerId,
    cpu: CpuId,
    nodes: [SchedulerNode; MAX_NODES],
    ready: Chain,
    compare: CompareFn,
}

impl EdfScheduler {
    pub fn new(id: SchedulerId, cpu: CpuId) -> Self {
        PER_CPU.bind_scheduler(cpu, id);
        EdfScheduler {
            id,
            cpu,
            nodes: [SchedulerNode::uninitialized(0); MAX_NODES],
            ready: Chain::new(),
            compare: compare_edf,
        }
    }

    pub fn id(&self) -> SchedulerId {
        self.id
    }

    pub fn node_initialize(&mut self, thread: ThreadId, deadline_key: Priority) {
        node_initialize(&mut self.nodes[thread], thread, deadline_key);
    }

    pub fn node_destroy(&mut self, thread: ThreadId) {
        node_destroy(&mut self.nodes[thread]);
    }

    fn order(&self, a: ThreadId, b: ThreadId) -> bool {
        let (pa, pb) = (self.nodes[a].priority, self.nodes[b].priority);
        is_higher(self.compare, pa, pb)
    }

    fn insert_sorted(&mut self, thread: ThreadId) {
        let nodes = &mut self.nodes;
        let order = |a: ThreadId, b: ThreadId| {
            is_higher(compare_edf, nodes[a].priority, nodes[b].priority)
        };
        self.ready.insert_ordered(&mut self.nodes, thread, order);
    }

    fn promote_leftmost(&mut self, ipi: &dyn InterProcessorInterrupt) {
        if let Some(leftmost) = self.ready.head() {
            let promote = match PER_CPU.heir(self.cpu) {
                None => true,
                Some(current) => self.order(leftmost, current),
            };
            if promote {
                update_heir(self.cpu, self.cpu, leftmost, ipi);
            }
        }
    }

    pub fn unblock(&mut self, thread: ThreadId, ipi: &dyn InterProcessorInterrupt) {
        debug_assert_eq!(self.nodes[thread].state, NodeState::Blocked);
        self.nodes[thread].set_state(NodeState::Ready);
        self.insert_sorted(thread);
        self.promote_leftmost(ipi);
    }

    pub fn block(&mut self, thread: ThreadId, ipi: &dyn InterProcessorInterrupt) {
        self.ready.extract(&mut self.nodes, thread);
        self.nodes[thread].set_state(NodeState::Blocked);
        if PER_CPU.heir(self.cpu) == Some(thread) {
            self.promote_leftmost(ipi);
        }
    }

    /// Yielding always re-selects heir as the new leftmost, even when that
    /// leftmost carries the same deadline key as the thread that just
    /// yielded — unlike `unblock`/`change_priority`/`release_job`, which
    /// only promote on a strict improvement via `promote_leftmost`.
    pub fn yield_thread(&mut self, thread: ThreadId, ipi: &dyn InterProcessorInterrupt) {
        self.ready.extract(&mut self.nodes, thread);
        self.insert_sorted(thread);
        if let Some(leftmost) = self.ready.head() {
            update_heir(self.cpu, self.cpu, leftmost, ipi);
        }
    }

    pub fn change_priority(&mut self, thread: ThreadId, new: Priority, ipi: &dyn InterProcessorInterrupt) {
        self.ready.extract(&mut self.nodes, thread);
        self.nodes[thread].priority = new;
        self.insert_sorted(thread);
        self.promote_leftmost(ipi);
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

    /// Adjusts the deadline key by `length` (job length / period) and
    /// re-inserts at the new position — the EDF-specific vtable entry
    /// fixed-priority policies leave unused.
    pub fn release_job(&mut self, thread: ThreadId, length: u8, ipi: &dyn InterProcessorInterrupt) {
        self.ready.extract(&mut self.nodes, thread);
        self.nodes[thread].priority = Priority(self.nodes[thread].priority.0.wrapping_add(length));
        self.insert_sorted(thread);
        self.promote_leftmost(ipi);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::config::SchedulerId;
    use crate::sched::smp::heir::NoIpi;

    fn scheduler(cpu: usize) -> EdfScheduler {
        EdfScheduler::new(SchedulerId::from_index(1), cpu)
    }

    #[test]
    fn earlier_deadline_wins_heir() {
        let mut s = scheduler(3);
        let ipi = NoIpi;
        s.node_initialize(0, Priority(50));
        s.node_initialize(1, Priority(10));
        s.unblock(0, &ipi);
        assert_eq!(PER_CPU.heir(3), Some(0));
        s.unblock(1, &ipi);
        assert_eq!(PER_CPU.heir(3), Some(1));
    }

    #[test]
    fn ready_chain_sorted_by_deadline_ascending() {
        let mut s = scheduler(3);
        let ipi = NoIpi;
        s.node_initialize(0, Priority(30));
        s.node_initialize(1, Priority(10));
        s.node_initialize(2, Priority(20));
        s.unblock(0, &ipi);
        s.unblock(1, &ipi);
        s.unblock(2, &ipi);
        assert_eq!(s.ready.head(), Some(1));
        assert_eq!(s.ready.tail(), Some(0));
    }
}
