use crate::domain::events::Notice;

/// Receives bench log lines, one per notice, in the order they happen.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}
