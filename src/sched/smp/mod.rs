//! SMP scheduler skeleton: shared scaffolding for any multiprocessor
//! policy. The enqueue/block/yield/change-priority templates are
//! parameterized over a concrete policy's insert/extract/move/order/
//! allocate-processor callbacks through the `SmpPolicy` trait; none of
//! this module picks a concrete ready structure itself.

pub mod affinity;
pub mod heir;
pub mod priority_policy;

use crate::sched::config::SchedulerId;
use crate::sched::node::NodeState;
use crate::sched::priority::{CompareFn, Priority};
use crate::sched::trait_def::CpuId;
use crate::thread::ThreadId;
use heir::{update_heir, InterProcessorInterrupt};

/// Capability set a concrete SMP policy supplies to the templates below.
/// `order(a, b)` is the strict ordering predicate used both to decide
/// promotion eligibility and, at equal priority, the LIFO/FIFO tie-break.
pub trait SmpPolicy {
    fn compare(&self) -> CompareFn;
    fn order(&self, candidate: ThreadId, other: ThreadId) -> bool;
    fn insert_ready(&mut self, node: ThreadId);
    fn insert_scheduled(&mut self, node: ThreadId);
    fn extract_from_ready(&mut self, node: ThreadId);
    fn extract_from_scheduled(&mut self, node: ThreadId);
    fn move_from_scheduled_to_ready(&mut self, node: ThreadId);
    fn move_from_ready_to_scheduled(&mut self, node: ThreadId);
    fn get_highest_ready(&self) -> Option<ThreadId>;
    fn get_lowest_scheduled(&self) -> Option<ThreadId>;
    fn priority_of(&self, node: ThreadId) -> Priority;
    fn set_priority(&mut self, node: ThreadId, new: Priority);
    fn cpu_of(&self, node: ThreadId) -> Option<CpuId>;
    fn set_cpu_of(&mut self, node: ThreadId, cpu: CpuId);
    fn set_state(&mut self, node: ThreadId, state: NodeState);
    fn state_of(&self, node: ThreadId) -> NodeState;
    fn self_cpu(&self) -> CpuId;
    fn scheduler_id(&self) -> SchedulerId;
    fn owns_cpu(&self, cpu: CpuId) -> bool;
}

/// The incoming `scheduled` node may already be executing on a CPU we own
/// (no-op reassignment: refresh that CPU's heir to itself and stop), or on
/// a CPU owned by a different scheduler instance (forced migration onto
/// one of ours, alongside `victim`'s CPU).
pub fn allocate_processor(
    policy: &mut dyn SmpPolicy,
    scheduled: ThreadId,
    victim: ThreadId,
    ipi: &dyn InterProcessorInterrupt,
) {
    let self_cpu = policy.self_cpu();
    policy.set_state(scheduled, NodeState::Scheduled);

    if let Some(cpu) = policy.cpu_of(scheduled) {
        if policy.owns_cpu(cpu) {
            update_heir(self_cpu, cpu, scheduled, ipi);
            return;
        }
    }

    let victim_cpu = policy.cpu_of(victim).unwrap_or(self_cpu);
    if scheduled != victim {
        policy.set_cpu_of(scheduled, victim_cpu);
        update_heir(self_cpu, victim_cpu, scheduled, ipi);
    }
}

pub fn schedule_highest_ready(policy: &mut dyn SmpPolicy, ipi: &dyn InterProcessorInterrupt, victim: ThreadId) {
    if let Some(highest) = policy.get_highest_ready() {
        allocate_processor(policy, highest, victim, ipi);
        policy.move_from_ready_to_scheduled(highest);
    }
}

/// Enqueue a node arriving from Blocked or Ready.
pub fn enqueue_ordered(policy: &mut dyn SmpPolicy, ipi: &dyn InterProcessorInterrupt, node: ThreadId) {
    let lowest = policy.get_lowest_scheduled();
    debug_assert!(lowest.is_some(), "scheduled set must never be empty — idle threads fill it");
    let lowest = lowest.unwrap();

    if policy.order(node, lowest) {
        policy.set_state(lowest, NodeState::Ready);
        allocate_processor(policy, node, lowest, ipi);
        policy.insert_scheduled(node);
        policy.move_from_scheduled_to_ready(lowest);
    } else {
        policy.set_state(node, NodeState::Ready);
        policy.insert_ready(node);
    }
}

/// Re-examine a node that was already Scheduled (after a priority change).
pub fn enqueue_scheduled_ordered(policy: &mut dyn SmpPolicy, ipi: &dyn InterProcessorInterrupt, node: ThreadId) {
    let highest_ready = policy.get_highest_ready();
    let outranked = match highest_ready {
        Some(highest) => !policy.order(node, highest),
        None => false,
    };

    if !outranked {
        policy.insert_scheduled(node);
        return;
    }

    let highest = highest_ready.unwrap();
    policy.set_state(node, NodeState::Ready);
    allocate_processor(policy, highest, node, ipi);
    policy.insert_ready(node);
    policy.move_from_ready_to_scheduled(highest);
}

pub fn block(policy: &mut dyn SmpPolicy, ipi: &dyn InterProcessorInterrupt, node: ThreadId) {
    let was_scheduled = policy.state_of(node) == NodeState::Scheduled;
    policy.set_state(node, NodeState::Blocked);
    if was_scheduled {
        policy.extract_from_scheduled(node);
        schedule_highest_ready(policy, ipi, node);
    } else {
        policy.extract_from_ready(node);
    }
}

pub fn unblock(policy: &mut dyn SmpPolicy, ipi: &dyn InterProcessorInterrupt, node: ThreadId) {
    policy.set_state(node, NodeState::Ready);
    enqueue_ordered(policy, ipi, node);
}

/// FIFO rotation among equal-priority peers; the node's Scheduled/Ready
/// status does not change, only its chain position.
pub fn yield_thread(policy: &mut dyn SmpPolicy, node: ThreadId) {
    match policy.state_of(node) {
        NodeState::Scheduled => {
            policy.extract_from_scheduled(node);
            policy.insert_scheduled(node);
        }
        NodeState::Ready => {
            policy.extract_from_ready(node);
            policy.insert_ready(node);
        }
        NodeState::Blocked => {}
    }
}

pub fn change_priority(
    policy: &mut dyn SmpPolicy,
    ipi: &dyn InterProcessorInterrupt,
    node: ThreadId,
    new: Priority,
) {
    match policy.state_of(node) {
        NodeState::Scheduled => {
            policy.extract_from_scheduled(node);
            policy.set_priority(node, new);
            enqueue_scheduled_ordered(policy, ipi, node);
        }
        NodeState::Ready => {
            policy.extract_from_ready(node);
            policy.set_priority(node, new);
            enqueue_ordered(policy, ipi, node);
        }
        NodeState::Blocked => {
            policy.set_priority(node, new);
        }
    }
}
