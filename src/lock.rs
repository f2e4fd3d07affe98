//! The app lock: a persisted on/off flag plus the gate that every cold start passes through.
//!
//! When the flag is on, the gate starts locked and only a successful `Authenticator` prompt opens
//! it. There is no retry limit. Turning the flag on requires authentication hardware with an
//! enrolled credential; turning it off only affects the next start.

use crate::error::LedgerError;
use crate::repository::TransactionRepository;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::{debug, info};

/// The message shown by the authentication prompt.
pub const UNLOCK_PROMPT: &str = "Please authenticate to unlock the app";

/// Environment variable that, when set and non-empty, switches the CLI to a scripted
/// authenticator instead of the device.
pub const TEST_MODE_ENV: &str = "LEDGER_IN_TEST_MODE";

/// Environment variable that holds the scripted outcome in test mode: `success`, `failure` or
/// `cancel`.
pub const TEST_AUTH_ENV: &str = "LEDGER_TEST_AUTH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthOutcome {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "failure")]
    Failure,
    #[serde(rename = "cancel")]
    Cancelled,
}

serde_plain::derive_display_from_serialize!(AuthOutcome);
serde_plain::derive_fromstr_from_deserialize!(AuthOutcome);

/// The device capability behind the app lock.
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    async fn has_hardware(&self) -> Result<bool>;

    async fn is_enrolled(&self) -> Result<bool>;

    async fn authenticate(&self, prompt: &str) -> Result<AuthOutcome>;
}

/// A host with no authentication hardware, such as a plain terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBiometrics;

#[async_trait::async_trait]
impl Authenticator for NoBiometrics {
    async fn has_hardware(&self) -> Result<bool> {
        Ok(false)
    }

    async fn is_enrolled(&self) -> Result<bool> {
        Ok(false)
    }

    async fn authenticate(&self, _prompt: &str) -> Result<AuthOutcome> {
        Ok(AuthOutcome::Failure)
    }
}

/// An authenticator with fixed capabilities that answers prompts from a queue. Once the queue is
/// empty every prompt gets `fallback`.
///
/// Note: this is compiled even in the "production" version of this app so that the lock can be
/// exercised from the command line with `LEDGER_IN_TEST_MODE`.
#[derive(Debug)]
pub struct ScriptedAuthenticator {
    hardware: bool,
    enrolled: bool,
    outcomes: Mutex<VecDeque<AuthOutcome>>,
    fallback: AuthOutcome,
    prompts: AtomicUsize,
}

impl ScriptedAuthenticator {
    pub fn new(hardware: bool, enrolled: bool, fallback: AuthOutcome) -> Self {
        Self {
            hardware,
            enrolled,
            outcomes: Mutex::new(VecDeque::new()),
            fallback,
            prompts: AtomicUsize::new(0),
        }
    }

    /// Capable, enrolled and always answering `outcome`.
    pub fn always(outcome: AuthOutcome) -> Self {
        Self::new(true, true, outcome)
    }

    /// Queues `outcomes` to be returned in order before `fallback`.
    pub fn with_outcomes(mut self, outcomes: impl IntoIterator<Item = AuthOutcome>) -> Self {
        if let Ok(queue) = self.outcomes.get_mut() {
            queue.extend(outcomes);
        }
        self
    }

    /// How many times a prompt was shown.
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Authenticator for ScriptedAuthenticator {
    async fn has_hardware(&self) -> Result<bool> {
        Ok(self.hardware)
    }

    async fn is_enrolled(&self) -> Result<bool> {
        Ok(self.enrolled)
    }

    async fn authenticate(&self, prompt: &str) -> Result<AuthOutcome> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        let next = match self.outcomes.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(_) => None,
        };
        let outcome = next.unwrap_or(self.fallback);
        debug!("Scripted answer to '{prompt}': {outcome}");
        Ok(outcome)
    }
}

/// Which authenticator the CLI talks to.
///
/// `Test` exists for scripted runs of the CLI only. With `LEDGER_IN_TEST_MODE` set, every unlock
/// prompt gets the outcome from `LEDGER_TEST_AUTH` (`success` when unset), so anyone who can set
/// environment variables can open an enabled lock. It is not a security boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The host device. On a terminal this is `NoBiometrics`.
    Device,
    /// A scripted authenticator that always answers with the given outcome.
    Test(AuthOutcome),
}

impl Mode {
    /// Reads `LEDGER_IN_TEST_MODE` and `LEDGER_TEST_AUTH`. An unset or unreadable outcome means
    /// `success`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(v) if !v.is_empty() => {
                let outcome = std::env::var(TEST_AUTH_ENV)
                    .ok()
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(AuthOutcome::Success);
                Mode::Test(outcome)
            }
            _ => Mode::Device,
        }
    }

    pub fn authenticator(&self) -> Box<dyn Authenticator> {
        match self {
            Mode::Device => Box::new(NoBiometrics),
            Mode::Test(outcome) => Box::new(ScriptedAuthenticator::always(*outcome)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Unlocked,
    LockedPendingAuth,
}

/// The gate a session passes before it may touch the ledger.
#[derive(Debug, Clone)]
pub struct AppLockGate {
    state: LockState,
}

impl AppLockGate {
    /// Reads the persisted flag: locked if it is on, otherwise unlocked.
    pub async fn start(repo: &TransactionRepository) -> Result<Self> {
        let state = if repo.lock_enabled().await? {
            LockState::LockedPendingAuth
        } else {
            LockState::Unlocked
        };
        debug!("App lock gate started as {state:?}");
        Ok(Self { state })
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == LockState::LockedPendingAuth
    }

    /// Prompts once if locked and returns the resulting state. An unlocked gate does not prompt.
    pub async fn authenticate(&mut self, authenticator: &dyn Authenticator) -> Result<LockState> {
        if !self.is_locked() {
            return Ok(self.state);
        }
        match authenticator.authenticate(UNLOCK_PROMPT).await? {
            AuthOutcome::Success => {
                self.state = LockState::Unlocked;
                debug!("Authentication succeeded, the app is unlocked");
            }
            outcome => debug!("Authentication ended with {outcome}, the app stays locked"),
        }
        Ok(self.state)
    }

    /// Fails with `LedgerError::Locked` unless the gate is open.
    pub fn ensure_unlocked(&self) -> Result<()> {
        if self.is_locked() {
            return Err(LedgerError::Locked.into());
        }
        Ok(())
    }
}

/// Turns the app lock on. Nothing is persisted unless the device has authentication hardware and
/// an enrolled credential.
pub async fn enable_lock(
    repo: &TransactionRepository,
    authenticator: &dyn Authenticator,
) -> Result<()> {
    if !authenticator.has_hardware().await? {
        return Err(LedgerError::DeviceCapability(
            "Your device does not support biometric authentication.".to_string(),
        )
        .into());
    }
    if !authenticator.is_enrolled().await? {
        return Err(LedgerError::DeviceCapability(
            "You have not set up a fingerprint, PIN or face ID on your device. Please set one up \
             in your device settings."
                .to_string(),
        )
        .into());
    }
    repo.set_lock_enabled(true).await?;
    info!("App lock enabled");
    Ok(())
}

/// Turns the app lock off for the next start. A gate that is already running is not changed.
pub async fn disable_lock(repo: &TransactionRepository) -> Result<()> {
    repo.set_lock_enabled(false).await?;
    info!("App lock disabled");
    Ok(())
}
