use std::thread;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info};

use crate::{
    core::store::{MaterialStore, StoreError},
    material::{Material, MaterialDraft},
    persist::MaterialBackend,
    types::MaterialId,
};

use super::events::MaterialEvent;

/// Failure of a handle call.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The store rejected the command.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The writer has shut down.
    #[error("inventory writer is gone")]
    ChannelClosed,
    /// The writer thread could not be spawned.
    #[error("failed to start inventory writer: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Writer runtime tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Commands that may wait for the writer before senders block.
    pub command_queue_bound: usize,
    /// Events buffered per subscriber before the slowest lags.
    pub event_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_capacity: 1024,
        }
    }
}

/// Cloneable async front for a store owned by one writer thread.
///
/// Commands are applied strictly one at a time in arrival order, so read-modify-write
/// operations such as [`InventoryHandle::increment`] never lose updates.
#[derive(Clone)]
pub struct InventoryHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<MaterialEvent>,
}

type Reply<T> = oneshot::Sender<Result<T, StoreError>>;

enum Command {
    List {
        resp: Reply<Vec<Material>>,
    },
    Get {
        id: MaterialId,
        resp: Reply<Material>,
    },
    LowStock {
        resp: Reply<Vec<Material>>,
    },
    Create {
        draft: MaterialDraft,
        resp: Reply<MaterialId>,
    },
    Update {
        material: Material,
        resp: Reply<()>,
    },
    Remove {
        id: MaterialId,
        resp: Reply<()>,
    },
    SetQuantity {
        id: MaterialId,
        quantity: i64,
        resp: Reply<()>,
    },
    Increment {
        id: MaterialId,
        resp: Reply<i64>,
    },
    Decrement {
        id: MaterialId,
        resp: Reply<i64>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Moves `store` onto a dedicated writer thread and returns its handle.
///
/// The store should already be initialized; otherwise every command fails with
/// [`StoreError::StorageUnavailable`].
pub fn spawn_inventory<B>(
    store: MaterialStore<B>,
    config: RuntimeConfig,
) -> Result<InventoryHandle, RuntimeError>
where
    B: MaterialBackend + 'static,
{
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound.max(1));
    let (events_tx, _) = broadcast::channel::<MaterialEvent>(config.event_capacity.max(1));

    let events_tx_loop = events_tx.clone();
    thread::Builder::new()
        .name("inventory-writer".to_string())
        .spawn(move || {
            let mut store = store;
            info!("inventory writer started");
            while let Some(cmd) = cmd_rx.blocking_recv() {
                if handle_command(cmd, &mut store, &events_tx_loop) {
                    break;
                }
            }
            info!("inventory writer stopped");
        })
        .map_err(RuntimeError::Spawn)?;

    Ok(InventoryHandle { cmd_tx, events_tx })
}

impl InventoryHandle {
    /// Receives every [`MaterialEvent`] emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<MaterialEvent> {
        self.events_tx.subscribe()
    }

    /// See [`MaterialStore::list`].
    pub async fn list(&self) -> Result<Vec<Material>, RuntimeError> {
        self.request(|resp| Command::List { resp }).await
    }

    /// See [`MaterialStore::get`].
    pub async fn get(&self, id: MaterialId) -> Result<Material, RuntimeError> {
        self.request(|resp| Command::Get { id, resp }).await
    }

    /// See [`MaterialStore::low_stock`].
    pub async fn low_stock(&self) -> Result<Vec<Material>, RuntimeError> {
        self.request(|resp| Command::LowStock { resp }).await
    }

    /// See [`MaterialStore::create`].
    pub async fn create(&self, draft: MaterialDraft) -> Result<MaterialId, RuntimeError> {
        self.request(|resp| Command::Create { draft, resp }).await
    }

    /// See [`MaterialStore::update`].
    pub async fn update(&self, material: Material) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Update { material, resp }).await
    }

    /// See [`MaterialStore::remove`].
    pub async fn remove(&self, id: MaterialId) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Remove { id, resp }).await
    }

    /// See [`MaterialStore::set_quantity`].
    pub async fn set_quantity(&self, id: MaterialId, quantity: i64) -> Result<(), RuntimeError> {
        self.request(|resp| Command::SetQuantity { id, quantity, resp })
            .await
    }

    /// See [`MaterialStore::increment`].
    pub async fn increment(&self, id: MaterialId) -> Result<i64, RuntimeError> {
        self.request(|resp| Command::Increment { id, resp }).await
    }

    /// See [`MaterialStore::decrement`].
    pub async fn decrement(&self, id: MaterialId) -> Result<i64, RuntimeError> {
        self.request(|resp| Command::Decrement { id, resp }).await
    }

    /// Stops the writer after every command queued before this one has run.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Shutdown { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        let out = rx.await.map_err(|_| RuntimeError::ChannelClosed)?;
        Ok(out?)
    }
}

fn handle_command<B: MaterialBackend>(
    cmd: Command,
    store: &mut MaterialStore<B>,
    events_tx: &broadcast::Sender<MaterialEvent>,
) -> bool {
    match cmd {
        Command::List { resp } => {
            let _ = resp.send(store.list());
        }
        Command::Get { id, resp } => {
            let _ = resp.send(store.get(id));
        }
        Command::LowStock { resp } => {
            let _ = resp.send(store.low_stock());
        }
        Command::Create { draft, resp } => {
            let res = store.create(draft);
            if let Ok(id) = &res {
                let _ = events_tx.send(MaterialEvent::Created { id: *id });
            }
            let _ = resp.send(res);
        }
        Command::Update { material, resp } => {
            let id = material.id;
            let res = store.update(material);
            if res.is_ok() {
                let _ = events_tx.send(MaterialEvent::Updated { id });
            }
            let _ = resp.send(res);
        }
        Command::Remove { id, resp } => {
            let res = store.remove(id);
            if res.is_ok() {
                let _ = events_tx.send(MaterialEvent::Removed { id });
            }
            let _ = resp.send(res);
        }
        Command::SetQuantity { id, quantity, resp } => {
            let res = store.set_quantity(id, quantity);
            if res.is_ok() {
                let _ = events_tx.send(MaterialEvent::QuantityChanged { id, quantity });
            }
            let _ = resp.send(res);
        }
        Command::Increment { id, resp } => {
            let res = store.increment(id);
            if let Ok(quantity) = &res {
                let _ = events_tx.send(MaterialEvent::QuantityChanged {
                    id,
                    quantity: *quantity,
                });
            }
            let _ = resp.send(res);
        }
        Command::Decrement { id, resp } => {
            let before = store.get(id).map(|m| m.quantity);
            let res = before.and_then(|before| store.decrement(id).map(|after| (before, after)));
            if let Ok((before, after)) = &res {
                if before != after {
                    let _ = events_tx.send(MaterialEvent::QuantityChanged {
                        id,
                        quantity: *after,
                    });
                }
            }
            let _ = resp.send(res.map(|(_, after)| after));
        }
        Command::Shutdown { resp } => {
            debug!("inventory writer shutting down");
            let _ = resp.send(());
            return true;
        }
    }

    false
}
