// Debug logging module for asynchronous game state logging
//
// Fire-and-forget async logging so the game loop never waits on disk.
// Each tick's pre-move state and chosen move is written to a JSONL file,
// which the replay tool can rebuild a bot from.

use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::grid::Grid;
use crate::types::Direction;

/// One logged tick: the state the bot searched from and what it chose
///
/// `body` (tail to head), `heading` and `foods` are captured before the
/// move; `new_food` is the food the host added on this tick.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogEntry {
    pub turn: u64,
    pub chosen_move: Direction,
    pub grid: Grid,
    pub body: Vec<usize>,
    pub heading: Direction,
    pub foods: Vec<usize>,
    pub new_food: Option<usize>,
    pub search_depth: usize,
    pub timestamp: String,
}

/// Shared debug logger state
/// Uses Arc<Mutex<File>> to allow concurrent async writes from multiple tasks
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    pending: Arc<parking_lot::Mutex<Vec<JoinHandle<()>>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        // Initialize the log file
        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    pending: Arc::new(parking_lot::Mutex::new(Vec::new())),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            pending: Arc::new(parking_lot::Mutex::new(Vec::new())),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs a tick asynchronously (fire-and-forget)
    /// Spawns a tokio task on the current runtime; outside a runtime the
    /// entry is dropped with an error.
    pub fn log_move(&self, entry: LogEntry) {
        if !self.enabled {
            return;
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!("Debug log entry for turn {} dropped: {}", entry.turn, e);
                return;
            }
        };

        let file_handle = self.file.clone();
        let task = handle.spawn(async move {
            Self::log_move_internal(file_handle, entry).await;
        });
        let mut pending = self.pending.lock();
        pending.retain(|h| !h.is_finished());
        pending.push(task);
    }

    /// Waits for every entry logged so far to reach the file
    pub async fn flush(&self) {
        let tasks: Vec<JoinHandle<()>> = self.pending.lock().drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                error!("Debug log task failed: {}", e);
            }
        }
    }

    /// Internal async function that performs the actual file write
    async fn log_move_internal(file_handle: Arc<Mutex<Option<File>>>, entry: LogEntry) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write debug log entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush debug log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize debug log entry: {}", e);
                }
            }
        }
    }
}

/// Current time in the format written to `LogEntry::timestamp`
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}
