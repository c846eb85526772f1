//! Thread scheduler abstraction layer: the indirection through which all
//! policy methods are invoked, the per-thread node lifecycle, one
//! uniprocessor priority policy, one EDF policy, and the SMP skeleton a
//! concrete multiprocessor policy is built on.

pub mod api;
pub mod chain;
pub mod config;
pub mod metrics;
pub mod node;
pub mod ops;
pub mod policy;
pub mod priority;
pub mod smp;
pub mod trait_def;

pub use api::{
    block, change_priority, change_if_higher, compare, get_affinity, highest_of_two, is_higher,
    is_lower, release_job, schedule, set, set_affinity, set_if_higher, start_idle, tick,
    unblock, update_priority, yield_thread, SchedulerTable, DEFAULT_IPI, SCHEDULERS,
};
pub use config::{SchedulerConfig, SchedulerId};
pub use metrics::{SchedulerMetrics, SchedulerMetricsSnapshot, METRICS};
pub use node::{NodeState, SchedulerNode};
pub use ops::SchedulerInstance;
pub use priority::Priority;
pub use trait_def::{priority as priority_levels, CpuId};
