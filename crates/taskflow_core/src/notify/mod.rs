use crate::error::AppError;
use time::OffsetDateTime;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

mod registry;
pub use registry::{DeliveryFailure, DeliveryOutcome, RegistryDelivery, deliver_due};

pub const DISABLE_ENV_VAR: &str = "TASKFLOW_DISABLE_NOTIFICATIONS";

/// Where reminder scheduling decisions land. Implementations must keep at
/// most one request pending per identifier: scheduling replaces any existing
/// request under the same id rather than appending.
pub trait NotificationDelivery {
    fn schedule_one_shot(
        &mut self,
        id: &str,
        at: OffsetDateTime,
        title: &str,
        body: &str,
    ) -> Result<(), AppError>;

    fn schedule_repeating_daily(
        &mut self,
        id: &str,
        hour: u8,
        minute: u8,
        title: &str,
        body: &str,
    ) -> Result<(), AppError>;

    fn cancel(&mut self, id: &str) -> Result<(), AppError>;
}

/// Shows a notification on screen right now. The scheduling side lives in
/// [`NotificationDelivery`]; this is the platform-facing end used when a
/// pending request comes due.
pub trait Notifier {
    fn show(&self, title: &str, body: &str) -> Result<(), AppError>;
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn show(&self, _title: &str, _body: &str) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn notifier_from_env() -> Result<Box<dyn Notifier>, AppError> {
    if std::env::var(DISABLE_ENV_VAR).is_ok() {
        return Ok(Box::new(NoopNotifier));
    }

    match platform_notifier() {
        Ok(notifier) => Ok(notifier),
        Err(err) => match err {
            AppError::InvalidData(_) => Ok(Box::new(NoopNotifier)),
            other => Err(other),
        },
    }
}

/// One-shot permission probe. Denial is persisted by the caller; there is no
/// automatic retry.
pub fn permission_granted() -> bool {
    if std::env::var(DISABLE_ENV_VAR).is_ok() {
        return false;
    }
    platform_notifier().is_ok()
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}
