//! Delivery of unlock codes to locked-out users.

use crate::models::NotifyError;
use chrono::{DateTime, Utc};

/// Sends a freshly issued unlock code to the account owner (usually by email).
pub trait UnlockNotifier: Send + Sync {
    fn send_unlock_code(
        &self,
        account_key: &str,
        unlock_code: &str,
        locked_until: DateTime<Utc>,
    ) -> Result<(), NotifyError>;
}

/// Notifier that only writes to the log. Used when no mail transport is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl UnlockNotifier for LogNotifier {
    fn send_unlock_code(
        &self,
        account_key: &str,
        _unlock_code: &str,
        locked_until: DateTime<Utc>,
    ) -> Result<(), NotifyError> {
        log::info!(
            "Unlock code issued for {} (locked until {})",
            account_key,
            locked_until.format("%Y-%m-%d %H:%M:%S UTC")
        );
        Ok(())
    }
}
