//! Backward-compatible facade over the scheduler engine in [`crate::sched`].
//!
//! This is the boundary the rest of the crate (`preemption`, `sync`, the
//! thread entry trampoline) dispatches through. It owns the thread table —
//! storing thread objects is out of the engine's scope — and installs a
//! single fixed-priority scheduler instance bound to CPU 0, forwarding every
//! state transition to it so `PER_CPU`'s heir/dispatch_necessary bookkeeping
//! stays authoritative. Callers still only see `ThreadId`s in and out; the
//! scheduler instance and its node bookkeeping live behind this facade.

use crate::error::{ThreadError, ThreadResult};
use crate::sched::policy::priority::PriorityScheduler;
use crate::sched::smp::heir::NoIpi;
use crate::sched::trait_def::CpuId;
use crate::sched::{SchedulerId, SchedulerInstance};
use crate::thread::{Thread, ThreadId, ThreadState};
use core::cell::UnsafeCell;

const MAX_THREADS: usize = 32;
const DEFAULT_CPU: CpuId = 0;
const DEFAULT_SCHEDULER: SchedulerId = SchedulerId::from_index(0);

/// No interrupt controller wired up here; callers that need real cross-CPU
/// delivery install their own scheduler through [`crate::sched::api`] and
/// supply a real [`crate::sched::smp::heir::InterProcessorInterrupt`] there.
static IPI: NoIpi = NoIpi;

pub struct Scheduler {
    threads: [Option<Thread>; MAX_THREADS],
    current_thread: Option<ThreadId>,
    next_thread_id: ThreadId,
    installed: bool,
}

pub struct SchedulerCell(UnsafeCell<Scheduler>);

unsafe impl Sync for SchedulerCell {}

impl Default for SchedulerCell {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerCell {
    pub const fn new() -> Self {
        SchedulerCell(UnsafeCell::new(Scheduler::new()))
    }

    /// # Safety
    /// Returns mutable reference to scheduler. Caller must ensure thread safety.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn get(&self) -> &mut Scheduler {
        &mut *self.0.get()
    }
}

pub static SCHEDULER: SchedulerCell = SchedulerCell::new();

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub const fn new() -> Self {
        Scheduler {
            threads: [const { None }; MAX_THREADS],
            current_thread: None,
            next_thread_id: 0,
            installed: false,
        }
    }

    fn ensure_scheduler(&mut self) {
        if !self.installed {
            crate::sched::SCHEDULERS.install(
                DEFAULT_SCHEDULER.index(),
                SchedulerInstance::Priority(PriorityScheduler::new(DEFAULT_SCHEDULER, DEFAULT_CPU)),
            );
            self.installed = true;
        }
    }

    pub fn spawn_thread(
        &mut self,
        stack: &'static mut [u8],
        entry_point: fn(),
        priority: u8,
    ) -> ThreadResult<ThreadId> {
        self.ensure_scheduler();

        let thread_id = self.next_thread_id;
        if thread_id >= MAX_THREADS {
            return Err(ThreadError::MaxThreadsReached);
        }

        let mut thread = Thread::new(thread_id, stack, entry_point, priority);
        crate::sched::set(DEFAULT_SCHEDULER, &mut thread, &IPI)?;
        self.threads[thread_id] = Some(thread);
        self.next_thread_id += 1;

        Ok(thread_id)
    }

    /// Registers the CPU's idle thread: lowest priority (0), never blocks.
    /// Without one, `block()` leaves a CPU's heir stale once every other
    /// thread has blocked, since the ready set is then empty and there's
    /// nothing left to fall back to. Matches `_Scheduler_Start_idle`'s own
    /// shape in the original — system init calls this once per CPU, it
    /// isn't invoked automatically by `spawn_thread`/`ensure_scheduler`.
    pub fn start_idle(&mut self, stack: &'static mut [u8], entry_point: fn()) -> ThreadResult<ThreadId> {
        self.ensure_scheduler();

        let thread_id = self.next_thread_id;
        if thread_id >= MAX_THREADS {
            return Err(ThreadError::MaxThreadsReached);
        }

        let mut thread = Thread::new(thread_id, stack, entry_point, 0);
        thread.scheduler_id = Some(DEFAULT_SCHEDULER);
        crate::sched::SCHEDULERS.with(DEFAULT_SCHEDULER, |s| {
            s.node_initialize(thread_id, crate::sched::Priority(0))
        })?;
        crate::sched::start_idle(&mut thread, DEFAULT_CPU, &IPI)?;
        self.threads[thread_id] = Some(thread);
        self.next_thread_id += 1;

        Ok(thread_id)
    }

    /// Re-evaluates who should run. If the currently executing thread is
    /// still marked `Running`, it is rotated back through the engine —
    /// extracted, then re-enqueued at the tail of its priority level —
    /// before the heir is read back. That rotation is what lets
    /// same-priority threads round-robin while a strictly higher-priority
    /// thread keeps its claim on the CPU across repeated calls.
    pub fn schedule(&mut self) -> Option<ThreadId> {
        if let Some(current) = self.current_thread {
            if let Some(thread) = &mut self.threads[current] {
                if thread.state == ThreadState::Running {
                    thread.state = ThreadState::Ready;
                    let _ = crate::sched::block(thread, &IPI);
                    let _ = crate::sched::unblock(thread, false, &IPI);
                }
            }
        }

        self.schedule_with_priority()
    }

    fn schedule_with_priority(&mut self) -> Option<ThreadId> {
        if !crate::sched::config::PER_CPU.take_dispatch_necessary(DEFAULT_CPU) {
            return None;
        }
        crate::sched::config::PER_CPU.heir(DEFAULT_CPU)
    }

    pub fn get_current_thread(&self) -> Option<ThreadId> {
        self.current_thread
    }

    pub fn set_current_thread(&mut self, thread_id: Option<ThreadId>) {
        if let Some(old_id) = self.current_thread {
            if let Some(thread) = &mut self.threads[old_id] {
                if thread.state == ThreadState::Running {
                    thread.state = ThreadState::Ready;
                }
            }
        }

        self.current_thread = thread_id;

        if let Some(new_id) = thread_id {
            if let Some(thread) = &mut self.threads[new_id] {
                thread.state = ThreadState::Running;
            }
        }
    }

    pub fn exit_current_thread(&mut self) {
        if let Some(current) = self.current_thread {
            let mut waiters_to_wake = [None; 4];

            if let Some(thread) = &mut self.threads[current] {
                let _ = crate::sched::block(thread, &IPI);
                thread.state = ThreadState::Finished;
                waiters_to_wake = thread.join_waiters;
            }

            // Wake up any threads waiting to join this one
            for waiter in waiters_to_wake.iter().flatten() {
                if let Some(waiter_thread) = &mut self.threads[*waiter] {
                    if waiter_thread.state == ThreadState::Blocked {
                        waiter_thread.state = ThreadState::Ready;
                        let _ = crate::sched::unblock(waiter_thread, false, &IPI);
                    }
                }
            }
        }
    }

    pub fn join_thread(&mut self, target_id: ThreadId, current_id: ThreadId) -> ThreadResult<()> {
        if target_id >= MAX_THREADS {
            return Err(ThreadError::InvalidThreadId);
        }

        if let Some(target_thread) = &mut self.threads[target_id] {
            if target_thread.state == ThreadState::Finished {
                return Ok(()); // Already finished
            }

            // Add current thread to join waiters
            for slot in &mut target_thread.join_waiters {
                if slot.is_none() {
                    *slot = Some(current_id);

                    // Block current thread
                    if let Some(current_thread) = &mut self.threads[current_id] {
                        let _ = crate::sched::block(current_thread, &IPI);
                        current_thread.state = ThreadState::Blocked;
                    }

                    return Ok(());
                }
            }

            Err(ThreadError::SchedulerFull)
        } else {
            Err(ThreadError::InvalidThreadId)
        }
    }

    pub fn get_thread(&self, thread_id: ThreadId) -> Option<&Thread> {
        self.threads[thread_id].as_ref()
    }

    pub fn get_thread_mut(&mut self, thread_id: ThreadId) -> Option<&mut Thread> {
        self.threads[thread_id].as_mut()
    }

    pub fn switch_context(&mut self, from_id: ThreadId, to_id: ThreadId) -> ThreadResult<()> {
        if let Some(from_thread) = self.get_thread(from_id) {
            if from_thread.check_stack_overflow() {
                return Err(ThreadError::StackOverflow);
            }
        }

        let from_thread = self.get_thread_mut(from_id);
        let from_context = if let Some(thread) = from_thread {
            &mut thread.context as *mut _
        } else {
            return Err(ThreadError::InvalidThreadId);
        };

        let to_thread = self.get_thread_mut(to_id);
        let to_context = if let Some(thread) = to_thread {
            &thread.context as *const _
        } else {
            return Err(ThreadError::InvalidThreadId);
        };

        unsafe {
            crate::context::switch_context(from_context, to_context);
        }

        Ok(())
    }
}
