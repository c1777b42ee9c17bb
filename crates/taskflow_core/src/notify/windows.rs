use crate::error::AppError;
use crate::notify::Notifier;
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn show(&self, title: &str, body: &str) -> Result<(), AppError> {
        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(title)
            .text1(body)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
