use crate::error::AppError;
use crate::notify::Notifier;
use notify_rust::Notification;

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn show(&self, title: &str, body: &str) -> Result<(), AppError> {
        Notification::new()
            .summary(title)
            .body(body)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
