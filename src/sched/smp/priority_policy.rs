//! Concrete multiprocessor fixed-priority policy built on the SMP
//! skeleton in `super`. Ready set is bucketed by priority level with a
//! bitmap, same trick as the uniprocessor policy; the Scheduled set is a
//! single chain kept in priority order (highest at head, lowest at tail).

use core::cmp::Ordering;

use crate::sched::chain::Chain;
use crate::sched::config::{SchedulerId, MAX_CPUS};
use crate::sched::node::{node_destroy, node_initialize, NodeState, SchedulerNode, DEFAULT_TIME_SLICE};
use crate::sched::priority::{compare_numeric_desc, is_higher, CompareFn, Priority};
use crate::sched::trait_def::CpuId;
use crate::thread::ThreadId;

use super::heir::InterProcessorInterrupt;
use super::SmpPolicy;

pub const MAX_NODES: usize = 64;
const LEVELS: usize = 256;
const BITMAP_WORDS: usize = LEVELS / 64;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    Lifo,
    Fifo,
}

pub struct SmpPriorityContext {
    id: SchedulerId,
    self_cpu: CpuId,
    owned_cpus: [bool; MAX_CPUS],
    nodes: [SchedulerNode; MAX_NODES],
    ready_chains: [Chain; LEVELS],
    ready_bitmap: [u64; BITMAP_WORDS],
    scheduled: Chain,
    cpu_of: [Option<CpuId>; MAX_NODES],
    tie_break: TieBreak,
    compare: CompareFn,
}

impl SmpPriorityContext {
    pub fn new(id: SchedulerId, self_cpu: CpuId, tie_break: TieBreak) -> Self {
        SmpPriorityContext {
            id,
            self_cpu,
            owned_cpus: [false; MAX_CPUS],
            nodes: [SchedulerNode::uninitialized(0); MAX_NODES],
            ready_chains: [Chain::new(); LEVELS],
            ready_bitmap: [0; BITMAP_WORDS],
            scheduled: Chain::new(),
            cpu_of: [None; MAX_NODES],
            tie_break,
            compare: compare_numeric_desc,
        }
    }

    pub fn own_cpu(&mut self, cpu: CpuId) {
        self.owned_cpus[cpu] = true;
        crate::sched::config::PER_CPU.bind_scheduler(cpu, self.id);
    }

    pub fn node_initialize(&mut self, thread: ThreadId, priority: Priority) {
        node_initialize(&mut self.nodes[thread], thread, priority);
    }

    pub fn node_destroy(&mut self, thread: ThreadId) {
        node_destroy(&mut self.nodes[thread]);
    }

    fn mark_ready(&mut self, level: u8) {
        let (w, b) = (level as usize / 64, level as usize % 64);
        self.ready_bitmap[w] |= 1 << b;
    }

    fn unmark_ready_if_empty(&mut self, level: u8) {
        if self.ready_chains[level as usize].is_empty() {
            let (w, b) = (level as usize / 64, level as usize % 64);
            self.ready_bitmap[w] &= !(1 << b);
        }
    }

    fn highest_ready_level(&self) -> Option<u8> {
        for (w, word) in self.ready_bitmap.iter().enumerate().rev() {
            if *word != 0 {
                let bit = 63 - word.leading_zeros() as usize;
                return Some((w * 64 + bit) as u8);
            }
        }
        None
    }

    /// Decrements the executing thread's remaining time-slice. A node with
    /// `time_slice == 0` is not budget-enforced and is left alone. On
    /// expiry, re-arms the quantum and yields the thread — the `ipi`
    /// parameter exists only to keep this call site uniform with the other
    /// policies'; the SMP `yield_thread` template never needs to raise one.
    pub fn tick(&mut self, thread: ThreadId, _ipi: &dyn InterProcessorInterrupt) {
        if self.nodes[thread].time_slice == 0 {
            return;
        }
        self.nodes[thread].time_slice -= 1;
        if self.nodes[thread].time_slice == 0 {
            self.nodes[thread].time_slice = DEFAULT_TIME_SLICE;
            super::yield_thread(self, thread);
        }
    }
}

impl SmpPolicy for SmpPriorityContext {
    fn compare(&self) -> CompareFn {
        self.compare
    }

    fn order(&self, candidate: ThreadId, other: ThreadId) -> bool {
        match (self.compare)(self.nodes[candidate].priority, self.nodes[other].priority) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.tie_break == TieBreak::Lifo,
        }
    }

    fn insert_ready(&mut self, node: ThreadId) {
        let level = self.nodes[node].priority.0;
        let prepend = self.tie_break == TieBreak::Lifo;
        if prepend {
            self.ready_chains[level as usize].push_front(&mut self.nodes, node);
        } else {
            self.ready_chains[level as usize].push_back(&mut self.nodes, node);
        }
        self.mark_ready(level);
    }

    fn insert_scheduled(&mut self, node: ThreadId) {
        let nodes = &self.nodes;
        let order = |a: ThreadId, b: ThreadId| {
            let cmp = compare_numeric_desc(nodes[a].priority, nodes[b].priority);
            match cmp {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => self.tie_break == TieBreak::Lifo,
            }
        };
        self.scheduled.insert_ordered(&mut self.nodes, node, order);
    }

    fn extract_from_ready(&mut self, node: ThreadId) {
        let level = self.nodes[node].priority.0;
        self.ready_chains[level as usize].extract(&mut self.nodes, node);
        self.unmark_ready_if_empty(level);
    }

    fn extract_from_scheduled(&mut self, node: ThreadId) {
        self.scheduled.extract(&mut self.nodes, node);
    }

    fn move_from_scheduled_to_ready(&mut self, node: ThreadId) {
        self.extract_from_scheduled(node);
        self.insert_ready(node);
    }

    fn move_from_ready_to_scheduled(&mut self, node: ThreadId) {
        self.extract_from_ready(node);
        self.insert_scheduled(node);
    }

    fn get_highest_ready(&self) -> Option<ThreadId> {
        self.highest_ready_level().and_then(|lvl| self.ready_chains[lvl as usize].head())
    }

    fn get_lowest_scheduled(&self) -> Option<ThreadId> {
        self.scheduled.tail()
    }

    fn priority_of(&self, node: ThreadId) -> Priority {
        self.nodes[node].priority
    }

    fn set_priority(&mut self, node: ThreadId, new: Priority) {
        self.nodes[node].priority = new;
    }

    fn cpu_of(&self, node: ThreadId) -> Option<CpuId> {
        self.cpu_of[node]
    }

    fn set_cpu_of(&mut self, node: ThreadId, cpu: CpuId) {
        self.cpu_of[node] = Some(cpu);
    }

    fn set_state(&mut self, node: ThreadId, state: NodeState) {
        self.nodes[node].set_state(state);
    }

    fn state_of(&self, node: ThreadId) -> NodeState {
        self.nodes[node].state
    }

    fn self_cpu(&self) -> CpuId {
        self.self_cpu
    }

    fn scheduler_id(&self) -> SchedulerId {
        self.id
    }

    fn owns_cpu(&self, cpu: CpuId) -> bool {
        self.owned_cpus[cpu]
    }
}
