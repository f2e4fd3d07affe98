//! App lock command handlers.

use crate::commands::Out;
use crate::error::LedgerError;
use crate::lock::{disable_lock, enable_lock, AppLockGate, Authenticator, LockState, Mode};
use crate::{Config, Result};
use serde::Serialize;
use tracing::debug;

/// Whether the app lock is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockStatus {
    pub enabled: bool,
}

pub async fn lock_status(config: Config) -> Result<Out<LockStatus>> {
    let enabled = config.repository().lock_enabled().await?;
    let message = if enabled {
        "App Lock is enabled"
    } else {
        "App Lock is disabled"
    };
    Ok(Out::new(message, LockStatus { enabled }))
}

pub async fn lock_enable(config: Config, mode: Mode) -> Result<Out<LockStatus>> {
    enable_lock(&config.repository(), mode.authenticator().as_ref()).await?;
    Ok(Out::new(
        "App Lock has been enabled.",
        LockStatus { enabled: true },
    ))
}

pub async fn lock_disable(config: Config) -> Result<Out<LockStatus>> {
    disable_lock(&config.repository()).await?;
    Ok(Out::new(
        "App Lock has been disabled.",
        LockStatus { enabled: false },
    ))
}

/// Starts the gate and, if the app is locked, makes one authentication attempt. Fails with
/// `LedgerError::Locked` if the gate stays closed.
pub async fn unlock(config: &Config, mode: Mode) -> Result<()> {
    unlock_with(config, mode.authenticator().as_ref()).await
}

async fn unlock_with(config: &Config, authenticator: &dyn Authenticator) -> Result<()> {
    let mut gate = AppLockGate::start(&config.repository()).await?;
    if gate.authenticate(authenticator).await? == LockState::LockedPendingAuth {
        return Err(LedgerError::Locked.into());
    }
    debug!("The app is unlocked");
    Ok(())
}
