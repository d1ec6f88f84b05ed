use std::sync::atomic::{AtomicBool, Ordering};

use {chanrelay_common::UserId, tracing::info};

/// Outcome of a permitted [`RelayGate::set_active`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateChange {
    /// State flipped to the requested value.
    Applied,
    /// State was already the requested value.
    Unchanged,
}

/// A gate mutation was requested by someone other than the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("user {requester} is not the relay owner")]
pub struct Unauthorized {
    pub requester: UserId,
}

/// The active/paused switch. Starts active; lives for the whole process.
#[derive(Debug)]
pub struct RelayGate {
    active: AtomicBool,
    owner: UserId,
}

impl RelayGate {
    #[must_use]
    pub fn new(owner: UserId) -> Self {
        Self {
            active: AtomicBool::new(true),
            owner,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_owner(&self, user: UserId) -> bool {
        user == self.owner
    }

    /// Set the gate on behalf of `requester`. Only the owner may change it.
    pub fn set_active(
        &self,
        active: bool,
        requester: UserId,
    ) -> Result<GateChange, Unauthorized> {
        if !self.is_owner(requester) {
            return Err(Unauthorized { requester });
        }
        let previous = self.active.swap(active, Ordering::SeqCst);
        if previous == active {
            return Ok(GateChange::Unchanged);
        }
        info!(
            active,
            requester = requester.0,
            "relay gate set to {}",
            if active { "ACTIVE" } else { "PAUSED" }
        );
        Ok(GateChange::Applied)
    }
}
