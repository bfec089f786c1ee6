pub mod builders;
pub mod flaky_store;
pub mod scripted_oracle;

use std::sync::{Arc, Once};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use taskmaster::clock::ManualClock;
use taskmaster::engine::EngineContext;
use taskmaster::service::TaskService;
use taskmaster::store::{MemoryTaskStore, TaskStore};
use tracing_subscriber::{fmt, EnvFilter};

pub use builders::{ConfigFileBuilder, TaskBuilder};
pub use flaky_store::FlakyStore;
pub use scripted_oracle::{Reply, ScriptedOracle};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Fixed reference instant used by builders and harnesses: 2025-01-01T00:00:00Z.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

/// Store, oracle and clock wired into an `EngineContext`.
pub struct Harness<S: TaskStore + 'static = MemoryTaskStore> {
    pub store: Arc<S>,
    pub oracle: Arc<ScriptedOracle>,
    pub clock: Arc<ManualClock>,
    pub ctx: EngineContext,
}

impl Harness<MemoryTaskStore> {
    /// Empty memory store, default scripted oracle, clock at [`t0`].
    pub fn new() -> Self {
        Self::with_store(MemoryTaskStore::new())
    }

    pub fn with_tasks(tasks: impl IntoIterator<Item = taskmaster::task::Task>) -> Self {
        Self::with_store(MemoryTaskStore::with_tasks(tasks).expect("seed tasks"))
    }
}

impl<S: TaskStore + 'static> Harness<S> {
    pub fn with_store(store: S) -> Self {
        let store = Arc::new(store);
        let oracle = Arc::new(ScriptedOracle::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let ctx = EngineContext::new(store.clone(), oracle.clone(), clock.clone())
            .with_oracle_timeout(Duration::from_millis(200));
        Self {
            store,
            oracle,
            clock,
            ctx,
        }
    }

    pub fn service(&self) -> TaskService {
        TaskService::new(self.ctx.clone())
    }

    /// Current stored copy of `id`; panics if absent.
    pub fn task(&self, id: &str) -> taskmaster::task::Task {
        self.store
            .get(id)
            .expect("store read")
            .unwrap_or_else(|| panic!("task {id} not in store"))
    }
}
