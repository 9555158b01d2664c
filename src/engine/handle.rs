//! Engine lifecycle.

use std::fmt;

use tracing::{debug, info};

use super::CodecEngine;
use crate::error::{Error, Result};

/// Lifecycle state of an [`EngineHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Created but not yet initialized.
    Uninitialized,
    /// Initialized and accepting work.
    Ready,
    /// Shut down; cannot be reused.
    ShutDown,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Ready => write!(f, "ready"),
            Self::ShutDown => write!(f, "shut down"),
        }
    }
}

/// Owned engine with an explicit init/ready/shutdown lifecycle.
///
/// Only a `Ready` handle hands out access to the engine. A pipeline run
/// borrows the handle mutably for its whole duration, so two runs can never
/// drive the same engine at once; share a handle across tasks by wrapping
/// it in a `tokio::sync::Mutex`, which makes later runs wait their turn.
pub struct EngineHandle<E> {
    engine: E,
    state: EngineState,
}

impl<E: CodecEngine> EngineHandle<E> {
    /// Wrap an engine without initializing it.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: EngineState::Uninitialized,
        }
    }

    /// Wrap and initialize an engine.
    pub async fn start(engine: E) -> Result<Self> {
        let mut handle = Self::new(engine);
        handle.init().await?;
        Ok(handle)
    }

    /// Initialize the engine. Calling this on a ready handle does nothing.
    pub async fn init(&mut self) -> Result<()> {
        match self.state {
            EngineState::Ready => Ok(()),
            EngineState::ShutDown => Err(Error::EngineNotReady {
                state: self.state.to_string(),
            }),
            EngineState::Uninitialized => {
                self.engine.initialize().await?;
                self.state = EngineState::Ready;
                info!("{} engine ready", self.engine.name());
                Ok(())
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Mutable access to a ready engine.
    pub fn engine_mut(&mut self) -> Result<&mut E> {
        if self.state == EngineState::Ready {
            Ok(&mut self.engine)
        } else {
            Err(Error::EngineNotReady {
                state: self.state.to_string(),
            })
        }
    }

    /// Read-only access to the engine in any state.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Shut the engine down. Repeated calls are no-ops.
    pub async fn shutdown(&mut self) -> Result<()> {
        match self.state {
            EngineState::ShutDown => Ok(()),
            EngineState::Uninitialized => {
                self.state = EngineState::ShutDown;
                Ok(())
            }
            EngineState::Ready => {
                self.state = EngineState::ShutDown;
                debug!("shutting down {} engine", self.engine.name());
                self.engine.shutdown().await
            }
        }
    }
}
