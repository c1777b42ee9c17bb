use crate::dates;
use crate::error::AppError;
use crate::notify::{NotificationDelivery, Notifier};
use crate::storage::pending::{self, PendingRequest, Trigger};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// File-backed [`NotificationDelivery`]. Every operation re-reads the
/// registry file, so repeated reconciles are idempotent and a given
/// identifier never holds more than one pending request.
pub struct RegistryDelivery {
    path: PathBuf,
}

impl RegistryDelivery {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn replace(&self, id: &str, request: Option<PendingRequest>) -> Result<(), AppError> {
        let mut requests = pending::load_requests(&self.path)?;
        requests.retain(|existing| existing.id != id);
        if let Some(request) = request {
            requests.push(request);
        }
        pending::save_requests(&self.path, &requests)
    }
}

impl NotificationDelivery for RegistryDelivery {
    fn schedule_one_shot(
        &mut self,
        id: &str,
        at: OffsetDateTime,
        title: &str,
        body: &str,
    ) -> Result<(), AppError> {
        let fire_at = dates::format_instant(at)?;
        self.replace(
            id,
            Some(PendingRequest {
                id: id.to_string(),
                title: title.to_string(),
                body: body.to_string(),
                trigger: Trigger::OneShot { fire_at },
            }),
        )
    }

    fn schedule_repeating_daily(
        &mut self,
        id: &str,
        hour: u8,
        minute: u8,
        title: &str,
        body: &str,
    ) -> Result<(), AppError> {
        // Re-scheduling the same daily request keeps its last-fired date so
        // a foreground re-sync cannot make it fire twice in one day.
        let requests = pending::load_requests(&self.path)?;
        let last_fired = requests.iter().find_map(|existing| {
            if existing.id != id {
                return None;
            }
            match &existing.trigger {
                Trigger::Daily { last_fired, .. } => last_fired.clone(),
                Trigger::OneShot { .. } => None,
            }
        });

        self.replace(
            id,
            Some(PendingRequest {
                id: id.to_string(),
                title: title.to_string(),
                body: body.to_string(),
                trigger: Trigger::Daily {
                    hour,
                    minute,
                    last_fired,
                },
            }),
        )
    }

    fn cancel(&mut self, id: &str) -> Result<(), AppError> {
        self.replace(id, None)
    }
}

#[derive(Debug)]
pub struct DeliveryOutcome {
    pub fired: Vec<PendingRequest>,
    pub failures: Vec<DeliveryFailure>,
}

#[derive(Debug)]
pub struct DeliveryFailure {
    pub id: String,
    pub error: AppError,
}

/// Fires every request that has come due: one-shots are removed once shown,
/// daily requests fire at most once per calendar day. A request whose
/// notifier call fails stays in the registry for the next pass.
pub fn deliver_due(
    path: &Path,
    now: OffsetDateTime,
    notifier: &dyn Notifier,
) -> Result<DeliveryOutcome, AppError> {
    let requests = pending::load_requests(path)?;
    let today = dates::format_date(now.date())?;

    let mut kept = Vec::new();
    let mut fired = Vec::new();
    let mut failures = Vec::new();

    for mut request in requests {
        match request.trigger.clone() {
            Trigger::OneShot { fire_at } => {
                let due = match dates::parse_instant(&fire_at) {
                    Ok(at) => at <= now,
                    // Corrupt fire time: drop the request, it can never fire.
                    Err(_) => {
                        continue;
                    }
                };
                if !due {
                    kept.push(request);
                    continue;
                }
                match notifier.show(&request.title, &request.body) {
                    Ok(()) => fired.push(request),
                    Err(error) => {
                        failures.push(DeliveryFailure {
                            id: request.id.clone(),
                            error,
                        });
                        kept.push(request);
                    }
                }
            }
            Trigger::Daily {
                hour,
                minute,
                last_fired,
            } => {
                let due_today = dates::at_time_of_day(now.date(), hour, minute, now.offset())
                    .is_some_and(|at| at <= now);
                let already_fired = last_fired.as_deref() == Some(today.as_str());

                if due_today && !already_fired {
                    match notifier.show(&request.title, &request.body) {
                        Ok(()) => {
                            request.trigger = Trigger::Daily {
                                hour,
                                minute,
                                last_fired: Some(today.clone()),
                            };
                            fired.push(request.clone());
                        }
                        Err(error) => failures.push(DeliveryFailure {
                            id: request.id.clone(),
                            error,
                        }),
                    }
                }
                kept.push(request);
            }
        }
    }

    pending::save_requests(path, &kept)?;
    Ok(DeliveryOutcome { fired, failures })
}
