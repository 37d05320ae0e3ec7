//! Running work on the host's main context.
//!
//! Hosts come in two flavours: a classic server with one main thread and a
//! task scheduler, and a region-partitioned server whose global region
//! scheduler replaces the main thread. The flavour is picked once at
//! startup with [`select_main_context`]; callers only see [`MainContext`].

use std::sync::Arc;

/// A unit of work handed to the host.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Capability to run a task on the host's main context.
pub trait MainContext: Send + Sync {
    fn run_on_main_context(&self, task: Task);
}

/// Scheduler of a single-main-thread host.
pub trait HostScheduler: Send + Sync {
    /// True when called from the main thread.
    fn is_primary_thread(&self) -> bool;
    /// Queue `task` for the next tick of the main thread.
    fn run_task(&self, task: Task);
}

/// Global region scheduler of a region-partitioned host.
pub trait RegionScheduler: Send + Sync {
    fn execute(&self, task: Task);
}

/// Main context of a single-main-thread host. Runs inline when already on
/// the main thread, otherwise schedules.
pub struct SingleSchedulerContext {
    scheduler: Arc<dyn HostScheduler>,
}

impl SingleSchedulerContext {
    pub fn new(scheduler: Arc<dyn HostScheduler>) -> Self {
        Self { scheduler }
    }
}

impl MainContext for SingleSchedulerContext {
    fn run_on_main_context(&self, task: Task) {
        if self.scheduler.is_primary_thread() {
            task();
        } else {
            self.scheduler.run_task(task);
        }
    }
}

/// Main context of a region-partitioned host.
pub struct RegionSchedulerContext {
    scheduler: Arc<dyn RegionScheduler>,
}

impl RegionSchedulerContext {
    pub fn new(scheduler: Arc<dyn RegionScheduler>) -> Self {
        Self { scheduler }
    }
}

impl MainContext for RegionSchedulerContext {
    fn run_on_main_context(&self, task: Task) {
        self.scheduler.execute(task);
    }
}

/// What the host offers, as detected at startup.
pub enum HostSchedulers {
    Single(Arc<dyn HostScheduler>),
    RegionPartitioned(Arc<dyn RegionScheduler>),
}

pub fn select_main_context(host: HostSchedulers) -> Arc<dyn MainContext> {
    match host {
        HostSchedulers::Single(scheduler) => Arc::new(SingleSchedulerContext::new(scheduler)),
        HostSchedulers::RegionPartitioned(scheduler) => {
            Arc::new(RegionSchedulerContext::new(scheduler))
        }
    }
}
