//! Contexto de cancelación que acompaña cada operación contra el substrate.
use chrono::{DateTime, Duration, Utc};
use tokio_util::sync::CancellationToken;

use crate::errors::StoreError;

/// Señal de cancelación + deadline opcional.
///
/// Clonar un `Context` comparte la señal. Los contextos derivados
/// (`with_timeout`, `with_deadline`) usan un token hijo: cancelar el padre
/// los cancela, cancelar el derivado no afecta al padre.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<DateTime<Utc>>,
}

impl Context {
    /// Contexto sin deadline ni cancelación.
    pub fn background() -> Self {
        Self::default()
    }

    /// Copia que además expira dentro de `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Utc::now() + timeout)
    }

    /// Copia con deadline; se conserva el más cercano.
    pub fn with_deadline(&self, deadline: DateTime<Utc>) -> Self {
        let deadline = match self.deadline {
            Some(d) if d < deadline => d,
            _ => deadline,
        };
        Self { token: self.token.child_token(),
               deadline: Some(deadline) }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// `Err` si la operación debe abortar.
    pub fn check(&self) -> Result<(), StoreError> {
        if self.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        match self.deadline {
            Some(d) if Utc::now() >= d => Err(StoreError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_shared_between_clones() {
        let ctx = Context::background();
        let child = ctx.with_timeout(Duration::seconds(60));
        assert!(child.check().is_ok());
        ctx.cancel();
        assert_eq!(child.check(), Err(StoreError::Cancelled));
    }

    #[test]
    fn cancelling_a_derived_context_leaves_the_parent_running() {
        let ctx = Context::background();
        let same = ctx.clone();
        let child = ctx.with_timeout(Duration::seconds(60));
        child.cancel();
        assert_eq!(child.check(), Err(StoreError::Cancelled));
        assert!(ctx.check().is_ok());

        same.cancel();
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn expired_deadline_is_reported() {
        let ctx = Context::background().with_deadline(Utc::now() - Duration::seconds(1));
        assert_eq!(ctx.check(), Err(StoreError::DeadlineExceeded));
    }

    #[test]
    fn nearest_deadline_wins() {
        let near = Utc::now() + Duration::seconds(5);
        let ctx = Context::background().with_deadline(near);
        let child = ctx.with_timeout(Duration::seconds(3600));
        assert_eq!(child.deadline(), Some(near));
    }
}
