use std::{
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use tokio::sync::oneshot;

pub mod helpers;
pub mod repositories;

pub use repositories::appointments::AppointmentRepository;

use crate::models::{Appointment, Campaign, Client, ReminderRule};

/// The mock database: plain vectors owned by the store worker thread.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub clients: Vec<Client>,
    pub appointments: Vec<Appointment>,
    pub campaigns: Vec<Campaign>,
    pub segments: Vec<String>,
    pub reminder_rules: Vec<ReminderRule>,
}

type StoreTask = Box<dyn FnOnce(&mut Tables) + Send + 'static>;

enum StoreCommand {
    Execute(StoreTask),
    Shutdown,
}

struct StoreInner {
    sender: mpsc::Sender<StoreCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(StoreCommand::Shutdown) {
                error!("Failed to send shutdown to store thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join store thread: {join_err:?}");
            }
        }
    }
}

/// In-memory store. Every operation runs serially on one worker thread, so a
/// task sees and mutates the tables atomically. Clones share the worker.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    pub fn new() -> Result<Self> {
        Self::with_tables(Tables::default())
    }

    pub fn with_tables(tables: Tables) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::channel::<StoreCommand>();
        let client_count = tables.clients.len();
        let appointment_count = tables.appointments.len();

        let worker = thread::Builder::new()
            .name("agenda-store".into())
            .spawn(move || {
                let mut tables = tables;
                while let Ok(command) = command_rx.recv() {
                    match command {
                        StoreCommand::Execute(task) => task(&mut tables),
                        StoreCommand::Shutdown => break,
                    }
                }

                info!("Store thread shutting down");
            })
            .with_context(|| "failed to spawn store worker thread")?;

        info!(
            "Store initialized with {} clients and {} appointments",
            client_count, appointment_count
        );

        Ok(Self {
            inner: Arc::new(StoreInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Tables) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = StoreCommand::Execute(Box::new(move |tables| {
            let result = task(tables);
            if reply_tx.send(result).is_err() {
                error!("Store caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to store thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("store thread terminated unexpectedly"))?
    }

    /// Copy of every table, mostly for inspection in tests.
    pub async fn snapshot(&self) -> Result<Tables> {
        self.execute(|tables| Ok(tables.clone())).await
    }
}
