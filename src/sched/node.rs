//! Per-thread scheduler node: the embedded record binding a thread to
//! exactly one scheduler instance at a time.

use crate::thread::ThreadId;
use super::priority::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Blocked,
    Ready,
    Scheduled,
}

fn state_index(s: NodeState) -> usize {
    match s {
        NodeState::Blocked => 0,
        NodeState::Ready => 1,
        NodeState::Scheduled => 2,
    }
}

/// All six off-diagonal transitions between the three states are legal;
/// nothing transitions to itself through `set_state`.
const VALID_TRANSITIONS: [[bool; 3]; 3] = [
    [false, true, true],
    [true, false, true],
    [true, true, false],
];

/// Default round-robin quantum, in `tick()` calls, for a freshly initialized
/// node. Re-armed to this value every time the time-slice expires.
pub const DEFAULT_TIME_SLICE: u8 = 10;

#[derive(Debug, Clone, Copy)]
pub struct SchedulerNode {
    pub owner: ThreadId,
    pub state: NodeState,
    pub priority: Priority,
    pub prev: Option<ThreadId>,
    pub next: Option<ThreadId>,
    /// Ticks remaining before a forced yield; 0 means time-slicing is not
    /// enforced for this node.
    pub time_slice: u8,
    initialized: bool,
}

impl SchedulerNode {
    pub const fn uninitialized(owner: ThreadId) -> Self {
        SchedulerNode {
            owner,
            state: NodeState::Blocked,
            priority: Priority(0),
            prev: None,
            next: None,
            time_slice: 0,
            initialized: false,
        }
    }

    pub fn set_state(&mut self, new_state: NodeState) {
        if self.state != new_state {
            debug_assert!(
                VALID_TRANSITIONS[state_index(self.state)][state_index(new_state)],
                "illegal scheduler node state transition"
            );
        }
        self.state = new_state;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Storage is already embedded in the owning thread; this just establishes
/// the initial Blocked state and priority copy.
pub fn node_initialize(node: &mut SchedulerNode, owner: ThreadId, priority: Priority) {
    debug_assert!(!node.initialized, "scheduler node double-initialized");
    node.owner = owner;
    node.state = NodeState::Blocked;
    node.priority = priority;
    node.prev = None;
    node.next = None;
    node.time_slice = DEFAULT_TIME_SLICE;
    node.initialized = true;
}

/// Must be called exactly once per `node_initialize`, and only while Blocked.
pub fn node_destroy(node: &mut SchedulerNode) {
    debug_assert!(node.initialized, "scheduler node destroyed without init");
    debug_assert_eq!(node.state, NodeState::Blocked, "node must be blocked before destruction");
    node.initialized = false;
}
