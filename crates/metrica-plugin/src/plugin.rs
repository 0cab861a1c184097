// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The plugin object the host shell talks to.
//
// Commands arrive as an action name plus JSON arguments, are decoded on the
// caller's thread, and run on the serial worker. Pause/resume run directly
// on the caller's thread; they share the session lock with the worker but
// are not ordered against commands still waiting in the queue.

use std::sync::{Arc, Mutex, mpsc};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use metrica_bridge::MetricaSdk;
use metrica_core::error::{MetricaError, Result};
use metrica_core::{ActivationConfig, Command, PluginSettings};

use crate::session::{self, ActivationState, Session, SharedSession};
use crate::worker::SerialExecutor;

/// Observer of successful activations.
pub type ConfigListener = Arc<dyn Fn(&ActivationConfig) + Send + Sync + 'static>;

type Listeners = Arc<Mutex<Vec<ConfigListener>>>;

/// Delivers a command result to the host exactly once.
///
/// If the reply is dropped without being sent (the task never ran, or
/// panicked part-way) the host still hears back, with `WorkerStopped`.
struct Reply<F>
where
    F: FnOnce(Result<()>),
{
    callback: Option<F>,
}

impl<F> Reply<F>
where
    F: FnOnce(Result<()>),
{
    fn new(callback: F) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    fn send(mut self, result: Result<()>) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }
}

impl<F> Drop for Reply<F>
where
    F: FnOnce(Result<()>),
{
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback(Err(MetricaError::WorkerStopped));
        }
    }
}

/// Pending result of a submitted command.
#[must_use = "a receipt does nothing unless waited on"]
pub struct Receipt {
    receiver: mpsc::Receiver<Result<()>>,
}

impl Receipt {
    fn channel() -> (mpsc::Sender<Result<()>>, Self) {
        let (sender, receiver) = mpsc::channel();
        (sender, Self { receiver })
    }

    /// Block until the command has run.
    pub fn wait(self) -> Result<()> {
        self.receiver
            .recv()
            .unwrap_or(Err(MetricaError::WorkerStopped))
    }
}

/// Bridge between the host shell and the native analytics SDK.
pub struct MetricaPlugin {
    session: SharedSession,
    listeners: Listeners,
    executor: SerialExecutor,
}

impl MetricaPlugin {
    /// Create a plugin with default settings.
    pub fn new(sdk: Box<dyn MetricaSdk>) -> Result<Self> {
        Self::with_settings(sdk, &PluginSettings::default())
    }

    /// Create a plugin, spawning its worker thread.
    pub fn with_settings(sdk: Box<dyn MetricaSdk>, settings: &PluginSettings) -> Result<Self> {
        let executor = SerialExecutor::spawn(&settings.worker_thread_name)?;
        debug!(platform = sdk.platform_name(), "metrica plugin created");
        Ok(Self {
            session: Session::shared(sdk),
            listeners: Arc::new(Mutex::new(Vec::new())),
            executor,
        })
    }

    // -- Command surface ----------------------------------------------------

    /// Run a host command and report its outcome through `callback`.
    ///
    /// Decoding happens here, so unknown actions and malformed arguments are
    /// reported immediately on the caller's thread. Decoded commands run on
    /// the worker and report from there. A rejected call can therefore be
    /// answered before earlier commands still waiting in the queue: callback
    /// order follows submission order only among accepted commands.
    #[instrument(skip(self, args, callback))]
    pub fn execute<F>(&self, action: &str, args: &[Value], callback: F)
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        match Command::decode(action, args) {
            Ok(command) => self.enqueue(command, callback),
            Err(e) => {
                debug!(error = %e, "command rejected");
                callback(Err(e));
            }
        }
    }

    /// Run a host command and hand back a [`Receipt`] for its result.
    pub fn submit(&self, action: &str, args: &[Value]) -> Receipt {
        let (sender, receipt) = Receipt::channel();
        self.execute(action, args, move |result| {
            let _ = sender.send(result);
        });
        receipt
    }

    /// Activate from native code with an already-typed configuration.
    ///
    /// Same semantics and ordering as the `activate` command.
    pub fn activate_with_config(&self, config: ActivationConfig) -> Receipt {
        let (sender, receipt) = Receipt::channel();
        self.enqueue(Command::Activate(config), move |result| {
            let _ = sender.send(result);
        });
        receipt
    }

    fn enqueue<F>(&self, command: Command, callback: F)
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let reply = Reply::new(callback);
        let session = Arc::clone(&self.session);
        let listeners = Arc::clone(&self.listeners);

        let submitted = self.executor.submit(move || {
            debug!(action = command.action(), "running command");
            session::lock(&session).apply(&command);

            // Listeners run outside the session lock.
            if let Command::Activate(config) = &command {
                notify(&listeners, config);
            }
            reply.send(Ok(()));
        });
        if let Err(e) = submitted {
            // The rejected task, and the reply inside it, has already been
            // dropped, which told the host.
            warn!(error = %e, "command not queued");
        }
    }

    // -- Lifecycle hooks ----------------------------------------------------

    /// Host activity went to the background. Runs on the caller's thread.
    pub fn on_pause(&self) {
        session::lock(&self.session).pause();
    }

    /// Host activity came to the foreground. Runs on the caller's thread.
    ///
    /// If an `activate` is still queued this resume is not forwarded, but the
    /// foreground flag is recorded and the activation catches up on it.
    pub fn on_resume(&self) {
        session::lock(&self.session).resume();
    }

    /// The host was re-opened with a new intent. Queued behind commands.
    pub fn on_new_intent(&self) {
        let session = Arc::clone(&self.session);
        if let Err(e) = self.executor.submit(move || {
            session::lock(&session).reopen();
        }) {
            warn!(error = %e, "new-intent notification not queued");
        }
    }

    // -- Status -------------------------------------------------------------

    pub fn is_activated(&self) -> bool {
        session::lock(&self.session).is_activated()
    }

    /// When the first activation happened, if it has.
    pub fn activated_since(&self) -> Option<DateTime<Utc>> {
        match session::lock(&self.session).activation() {
            ActivationState::Activated { since } => Some(since),
            ActivationState::NotActivated => None,
        }
    }

    pub fn is_paused(&self) -> bool {
        session::lock(&self.session).is_paused()
    }

    pub fn platform_name(&self) -> String {
        session::lock(&self.session).platform_name().to_owned()
    }

    /// Register a listener for every successful activation, first or not.
    /// Listeners run on the worker thread, after the SDK call. A listener may
    /// register further listeners; those see the next activation onwards.
    pub fn on_configuration_update<L>(&self, listener: L)
    where
        L: Fn(&ActivationConfig) + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Arc::new(listener));
    }

    /// Stop accepting work and wait for queued commands to finish.
    pub fn shutdown(self) {
        self.executor.shutdown();
    }
}

fn notify(listeners: &Listeners, config: &ActivationConfig) {
    // Snapshot, so listeners run without the list locked.
    let snapshot: Vec<ConfigListener> = listeners
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone();
    for listener in &snapshot {
        listener(config);
    }
}
