//! Optimistic update flow: apply locally, commit, compensate on failure.
//!
//! A view implementing [`Reconcile`] hands its mutation to
//! [`apply_optimistic`]. The mutation runs immediately, then the view's
//! state is committed to the backend. If the commit fails the view is
//! re-synchronized from the server; if that also fails the snapshot taken
//! before the mutation is restored. Both compensations replace state
//! wholesale, so running one twice leaves the same result.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::DeskError;

#[async_trait]
pub trait Reconcile: Send + Sync {
    type Snapshot: Send;

    fn snapshot(&self) -> Self::Snapshot;

    fn restore(&mut self, snapshot: Self::Snapshot);

    /// Persist the current local state.
    async fn commit(&self) -> Result<(), DeskError>;

    /// Fetch the authoritative state from the server.
    async fn refetch(&self) -> Result<Self::Snapshot, DeskError>;
}

/// How an optimistic action ended.
#[derive(Debug)]
pub enum CommitOutcome {
    /// The server accepted the change.
    Committed,
    /// The commit failed; local state was replaced by the server's.
    Resynced { error: DeskError },
    /// Commit and re-fetch both failed; the pre-action snapshot is back.
    Restored {
        error: DeskError,
        refetch_error: DeskError,
    },
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }

    /// The commit error, if the action did not stick.
    pub fn error(&self) -> Option<&DeskError> {
        match self {
            Self::Committed => None,
            Self::Resynced { error } | Self::Restored { error, .. } => Some(error),
        }
    }

    pub fn into_result(self) -> Result<(), DeskError> {
        match self {
            Self::Committed => Ok(()),
            Self::Resynced { error } | Self::Restored { error, .. } => Err(error),
        }
    }
}

/// Run `mutate` against `target` and commit the result.
///
/// An `Err` from `mutate` aborts before anything is sent; the target is
/// restored to its prior snapshot and the error is returned.
pub async fn apply_optimistic<R, F>(target: &mut R, mutate: F) -> Result<CommitOutcome, DeskError>
where
    R: Reconcile,
    F: FnOnce(&mut R) -> Result<(), DeskError>,
{
    let before = target.snapshot();
    if let Err(err) = mutate(target) {
        target.restore(before);
        return Err(err);
    }

    let error = match target.commit().await {
        Ok(()) => {
            debug!("optimistic change committed");
            return Ok(CommitOutcome::Committed);
        }
        Err(error) => error,
    };

    warn!(error = %error, "commit failed, re-fetching server state");
    match target.refetch().await {
        Ok(fresh) => {
            target.restore(fresh);
            Ok(CommitOutcome::Resynced { error })
        }
        Err(refetch_error) => {
            warn!(error = %refetch_error, "re-fetch failed, restoring local snapshot");
            target.restore(before);
            Ok(CommitOutcome::Restored {
                error,
                refetch_error,
            })
        }
    }
}
