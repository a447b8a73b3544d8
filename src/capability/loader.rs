//! Single-flight, lazily initialized capability loader.
//!
//! ```text
//!            ensure_loaded()                 init Ok
//! Unloaded ─────────────────▶ Loading(fut) ───────────▶ Loaded(handle)
//!     ▲                          │   ▲
//!     └──────── init Err ────────┘   └── concurrent callers await the same fut
//! ```
//!
//! Only the `Unloaded → Loading` transition starts work. Every caller that
//! arrives while an initialization is in flight clones the same
//! [`Shared`] future, so the initializer runs once no matter how many
//! conversions start at the same time. A successful load is final for the
//! life of the loader; a failed one returns the loader to `Unloaded` so the
//! next call can try again.

use super::endpoint::{EndpointConfig, WorkerEndpoint};
use super::pdfium::PdfiumInitializer;
use super::CapabilityHandle;
use crate::error::Pdf2ImgError;
use futures::future::{BoxFuture, FutureExt, Shared};
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

type InitResult = Result<CapabilityHandle, Pdf2ImgError>;
type PendingInit = Shared<BoxFuture<'static, InitResult>>;

/// Produces the capability for a chosen endpoint.
///
/// `initialize` must be lazy: the loader calls it while holding its state
/// lock and only polls the returned future afterwards.
pub trait CapabilityInitializer: Send + Sync + 'static {
    fn initialize(&self, endpoint: WorkerEndpoint) -> BoxFuture<'static, InitResult>;
}

impl<F> CapabilityInitializer for F
where
    F: Fn(WorkerEndpoint) -> BoxFuture<'static, InitResult> + Send + Sync + 'static,
{
    fn initialize(&self, endpoint: WorkerEndpoint) -> BoxFuture<'static, InitResult> {
        self(endpoint)
    }
}

enum LoaderState {
    Unloaded,
    Loading { attempt: u64, pending: PendingInit },
    Loaded(CapabilityHandle),
}

/// Memoizes one [`CapabilityHandle`] for its whole lifetime.
pub struct CapabilityLoader {
    endpoints: EndpointConfig,
    initializer: Box<dyn CapabilityInitializer>,
    state: Mutex<LoaderState>,
    loading: AtomicBool,
    attempts: AtomicU64,
}

static GLOBAL: Lazy<Arc<CapabilityLoader>> = Lazy::new(|| {
    Arc::new(CapabilityLoader::new(
        EndpointConfig::from_env(),
        PdfiumInitializer::default(),
    ))
});

impl CapabilityLoader {
    pub fn new(endpoints: EndpointConfig, initializer: impl CapabilityInitializer) -> Self {
        Self {
            endpoints,
            initializer: Box::new(initializer),
            state: Mutex::new(LoaderState::Unloaded),
            loading: AtomicBool::new(false),
            attempts: AtomicU64::new(0),
        }
    }

    /// The process-wide PDFium loader, configured from the environment.
    pub fn global() -> Arc<CapabilityLoader> {
        Arc::clone(&GLOBAL)
    }

    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    /// True while an initialization is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(*self.lock_state(), LoaderState::Loaded(_))
    }

    /// Number of initializations started so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Return the loaded capability, initializing it on first use.
    pub async fn ensure_loaded(&self) -> InitResult {
        let (attempt, pending) = {
            let mut state = self.lock_state();
            match &*state {
                LoaderState::Loaded(handle) => return Ok(Arc::clone(handle)),
                LoaderState::Loading { attempt, pending } => {
                    debug!("Engine initialization already in flight; joining it");
                    (*attempt, pending.clone())
                }
                LoaderState::Unloaded => {
                    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    let endpoint = self.endpoints.select();
                    info!("Loading PDF engine from {}", endpoint);

                    let pending = self.initializer.initialize(endpoint).shared();
                    self.loading.store(true, Ordering::SeqCst);
                    *state = LoaderState::Loading {
                        attempt,
                        pending: pending.clone(),
                    };
                    (attempt, pending)
                }
            }
        };

        let outcome = pending.await;
        self.settle(attempt, &outcome);
        outcome
    }

    /// Record the outcome of `attempt` unless a later attempt already did.
    fn settle(&self, attempt: u64, outcome: &InitResult) {
        let mut state = self.lock_state();
        let current = matches!(&*state, LoaderState::Loading { attempt: a, .. } if *a == attempt);
        if !current {
            return;
        }

        *state = match outcome {
            Ok(handle) => {
                info!("PDF engine ready ({})", handle.worker_endpoint());
                LoaderState::Loaded(Arc::clone(handle))
            }
            Err(e) => {
                warn!("PDF engine initialization failed: {}", e);
                LoaderState::Unloaded
            }
        };
        self.loading.store(false, Ordering::SeqCst);
    }

    fn lock_state(&self) -> MutexGuard<'_, LoaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
