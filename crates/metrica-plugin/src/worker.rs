// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Serial task queue on a dedicated thread.
//
// Tasks run one at a time in submission order. The queue is unbounded and
// tasks are never cancelled: dropping the executor closes the queue, the
// worker drains what is left, and the drop waits for it to finish.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc;
use std::thread::JoinHandle;

use tracing::{debug, error, info};

use metrica_core::error::{MetricaError, Result};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// A single worker thread fed by a FIFO channel.
pub struct SerialExecutor {
    sender: Option<mpsc::Sender<Task>>,
    handle: Option<JoinHandle<()>>,
}

impl SerialExecutor {
    /// Spawn the worker thread under the given name.
    pub fn spawn(name: &str) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<Task>();
        let thread_name = name.to_owned();

        let handle = std::thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                info!(worker = %thread_name, "command worker started");
                // Ends once every sender is gone and the queue is empty.
                while let Ok(task) = receiver.recv() {
                    // A panicking task must not take the queue down with it.
                    if catch_unwind(AssertUnwindSafe(task)).is_err() {
                        error!(worker = %thread_name, "task panicked; continuing");
                    }
                }
                info!(worker = %thread_name, "command worker stopped");
            })?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Queue a task behind everything already submitted.
    ///
    /// On failure the task is dropped without running.
    pub fn submit<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(MetricaError::WorkerStopped)?;
        sender
            .send(Box::new(task))
            .map_err(|_| MetricaError::WorkerStopped)
    }

    /// Close the queue and wait for the worker to drain it.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            // Joining ourselves would deadlock; the worker exits on its own
            // once this drop returns and the queue is drained.
            if handle.thread().id() == std::thread::current().id() {
                debug!("executor dropped on its own worker thread");
                return;
            }
            if handle.join().is_err() {
                error!("command worker thread panicked");
            }
        }
    }
}

impl Drop for SerialExecutor {
    fn drop(&mut self) {
        self.close();
    }
}
