//! Heir update protocol: write the heir field first, issue a sequentially
//! consistent fence, then conditionally raise `dispatch_necessary` and
//! conditionally poke the remote processor. The fence order is load-bearing
//! on weakly-ordered hardware — a release/acquire pair is not enough because
//! both sides of the protocol are writers to distinct fields.

use portable_atomic::{fence, Ordering};

use crate::sched::config::PER_CPU;
use crate::sched::metrics::METRICS;
use crate::sched::trait_def::CpuId;
use crate::thread::ThreadId;

pub trait InterProcessorInterrupt {
    fn send(&self, target: CpuId);
}

/// Used where no real interrupt controller is wired up (uniprocessor, tests).
pub struct NoIpi;

impl InterProcessorInterrupt for NoIpi {
    fn send(&self, _target: CpuId) {}
}

/// `self_cpu` is the processor running this update; `target_cpu` is the one
/// receiving a new heir, which may be the same processor.
pub fn update_heir(
    self_cpu: CpuId,
    target_cpu: CpuId,
    new_heir: ThreadId,
    ipi: &dyn InterProcessorInterrupt,
) {
    {
        let mut table = PER_CPU.cpus.lock();
        table[target_cpu].heir = Some(new_heir);
    }
    METRICS.record_heir_change();

    fence(Ordering::SeqCst);

    let became_necessary = {
        let mut table = PER_CPU.cpus.lock();
        if table[target_cpu].dispatch_necessary {
            false
        } else {
            table[target_cpu].dispatch_necessary = true;
            true
        }
    };

    if became_necessary && target_cpu != self_cpu {
        ipi.send(target_cpu);
    }
}
