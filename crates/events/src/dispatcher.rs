//! Event-to-notification dispatch engine.
//!
//! [`NotificationDispatcher`] subscribes to the event bus and, for each
//! domain event, resolves the affected recipients, builds a batch of
//! [`NotificationJob`]s, and attempts every job exactly once. Jobs are
//! isolated from one another: a failed send is logged and recorded in the
//! [`DispatchSummary`], but it neither aborts the remaining jobs nor
//! surfaces to the mutation that published the event, which has already
//! committed. There is no retry policy: a failed send is terminal for
//! that job.

use rollcall_core::channels::{CHANNEL_EMAIL, CHANNEL_IN_APP, CHANNEL_WEBHOOK};
use rollcall_core::types::DbId;
use rollcall_db::repositories::{AttendanceRepo, LeaveRepo, NotificationRepo, UserRepo};
use rollcall_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::{
    DomainEvent, EVENT_ATTENDANCE_MARKED, EVENT_LEAVE_REVIEWED, EVENT_LEAVE_SUBMITTED,
};
use crate::delivery::email::EmailDelivery;
use crate::delivery::webhook::WebhookDelivery;

// ---------------------------------------------------------------------------
// NotificationJob
// ---------------------------------------------------------------------------

/// One unit of outbound communication. Ephemeral: exists only for the
/// duration of a single dispatch.
#[derive(Debug)]
pub struct NotificationJob {
    /// Target channel: `in_app`, `email`, or `webhook`.
    pub channel: &'static str,
    /// Target user for in-app notifications.
    pub user_id: Option<DbId>,
    /// Email address or webhook URL.
    pub address: Option<String>,
    /// Event type the job originates from.
    pub event_type: String,
    /// Template key handed to the email channel.
    pub template_key: &'static str,
    /// Event-specific data rendered by the channel.
    pub payload: serde_json::Value,
}

impl NotificationJob {
    /// Build an in-app job for a user.
    pub fn in_app(user_id: DbId, event_type: &str, payload: serde_json::Value) -> Self {
        Self {
            channel: CHANNEL_IN_APP,
            user_id: Some(user_id),
            address: None,
            event_type: event_type.to_string(),
            template_key: "",
            payload,
        }
    }

    /// Build an email job for an address.
    pub fn email(
        address: impl Into<String>,
        event_type: &str,
        template_key: &'static str,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            channel: CHANNEL_EMAIL,
            user_id: None,
            address: Some(address.into()),
            event_type: event_type.to_string(),
            template_key,
            payload,
        }
    }

    /// Build a webhook job for a URL.
    pub fn webhook(url: impl Into<String>, event_type: &str, payload: serde_json::Value) -> Self {
        Self {
            channel: CHANNEL_WEBHOOK,
            user_id: None,
            address: Some(url.into()),
            event_type: event_type.to_string(),
            template_key: "",
            payload,
        }
    }

    /// Human-readable recipient label used in outcome reporting.
    pub fn recipient(&self) -> String {
        match (self.user_id, self.address.as_deref()) {
            (Some(id), _) => format!("user:{id}"),
            (None, Some(addr)) => addr.to_string(),
            (None, None) => "<unaddressed>".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch outcome types
// ---------------------------------------------------------------------------

/// Per-job delivery outcome.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub recipient: String,
    pub channel: &'static str,
    pub success: bool,
    pub reason: Option<String>,
}

/// Aggregate result of one dispatch batch.
#[derive(Debug, Clone)]
pub struct DispatchSummary {
    pub success_count: usize,
    pub total_count: usize,
    pub outcomes: Vec<JobOutcome>,
}

// ---------------------------------------------------------------------------
// NotificationDispatcher
// ---------------------------------------------------------------------------

/// Routes domain events to notification jobs and delivers them.
pub struct NotificationDispatcher {
    pool: DbPool,
    email: Option<EmailDelivery>,
    webhook: WebhookDelivery,
    /// Optional operations webhook; when unset, no webhook jobs are built.
    webhook_url: Option<String>,
}

impl NotificationDispatcher {
    /// Create a new dispatcher.
    ///
    /// `email` is `None` when SMTP is not configured; email jobs then fail
    /// individually instead of being dropped. `webhook_url` is an optional
    /// integration — no webhook jobs are built without it.
    pub fn new(pool: DbPool, email: Option<EmailDelivery>, webhook_url: Option<String>) -> Self {
        Self {
            pool,
            email,
            webhook: WebhookDelivery::new(),
            webhook_url,
        }
    }

    /// Run the main dispatch loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification dispatcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Build and dispatch the job batch for a single event.
    async fn route_event(
        &self,
        event: &DomainEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match event.event_type.as_str() {
            EVENT_ATTENDANCE_MARKED => self.handle_attendance_marked(event).await,
            EVENT_LEAVE_SUBMITTED => self.handle_leave_submitted(event).await,
            EVENT_LEAVE_REVIEWED => self.handle_leave_reviewed(event).await,
            // Remaining event types are persisted for audit but carry no
            // notifications.
            _ => Ok(()),
        }
    }

    /// attendance.marked → student in-app + parent email.
    async fn handle_attendance_marked(
        &self,
        event: &DomainEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Some(student_id) = payload_id(event, "student_id") else {
            return Ok(());
        };
        let student = UserRepo::find_by_id(&self.pool, student_id).await?;

        let mut jobs = vec![NotificationJob::in_app(
            student_id,
            &event.event_type,
            event.payload.clone(),
        )];

        let parent_job = student.and_then(|s| s.parent_email).map(|addr| {
            jobs.push(NotificationJob::email(
                addr,
                &event.event_type,
                "attendance_marked",
                event.payload.clone(),
            ));
            jobs.len() - 1
        });

        self.push_webhook_job(&mut jobs, event);

        let summary = self.dispatch(jobs).await;

        // The parent-notified flag on the record flips only after a
        // confirmed send.
        if let (Some(idx), Some(record_id)) = (parent_job, payload_id(event, "record_id")) {
            if summary.outcomes[idx].success {
                AttendanceRepo::mark_parent_notified(&self.pool, record_id).await?;
            }
        }

        Ok(())
    }

    /// leave.submitted → addressed teacher in-app, or all admins when the
    /// request names no teacher.
    async fn handle_leave_submitted(
        &self,
        event: &DomainEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut jobs = Vec::new();

        let reviewer_jobs: Vec<usize> = match payload_id(event, "teacher_id") {
            Some(teacher_id) => {
                jobs.push(NotificationJob::in_app(
                    teacher_id,
                    &event.event_type,
                    event.payload.clone(),
                ));
                vec![jobs.len() - 1]
            }
            None => {
                let mut indices = Vec::new();
                for admin_id in UserRepo::list_admin_ids(&self.pool).await? {
                    jobs.push(NotificationJob::in_app(
                        admin_id,
                        &event.event_type,
                        event.payload.clone(),
                    ));
                    indices.push(jobs.len() - 1);
                }
                indices
            }
        };

        self.push_webhook_job(&mut jobs, event);

        let summary = self.dispatch(jobs).await;

        let any_reviewer_notified = reviewer_jobs
            .iter()
            .any(|&idx| summary.outcomes[idx].success);
        if any_reviewer_notified {
            if let Some(request_id) = payload_id(event, "request_id") {
                LeaveRepo::mark_teacher_notified(&self.pool, request_id).await?;
            }
        }

        Ok(())
    }

    /// leave.reviewed → student in-app + parent email.
    async fn handle_leave_reviewed(
        &self,
        event: &DomainEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Some(student_id) = payload_id(event, "student_id") else {
            return Ok(());
        };
        let student = UserRepo::find_by_id(&self.pool, student_id).await?;

        let mut jobs = vec![NotificationJob::in_app(
            student_id,
            &event.event_type,
            event.payload.clone(),
        )];

        let parent_job = student.and_then(|s| s.parent_email).map(|addr| {
            jobs.push(NotificationJob::email(
                addr,
                &event.event_type,
                "leave_reviewed",
                event.payload.clone(),
            ));
            jobs.len() - 1
        });

        self.push_webhook_job(&mut jobs, event);

        let summary = self.dispatch(jobs).await;

        if let (Some(idx), Some(request_id)) = (parent_job, payload_id(event, "request_id")) {
            if summary.outcomes[idx].success {
                LeaveRepo::mark_parent_notified(&self.pool, request_id).await?;
            }
        }

        Ok(())
    }

    /// Append a webhook job when an operations webhook is configured.
    fn push_webhook_job(&self, jobs: &mut Vec<NotificationJob>, event: &DomainEvent) {
        if let Some(url) = &self.webhook_url {
            let payload = serde_json::json!({
                "event_type": event.event_type,
                "payload": event.payload,
                "timestamp": event.timestamp,
            });
            jobs.push(NotificationJob::webhook(
                url.clone(),
                &event.event_type,
                payload,
            ));
        }
    }

    /// Attempt every job in the batch, each exactly once.
    ///
    /// One recipient's failure never aborts another recipient's attempt.
    /// Failures are logged and reported in the summary; nothing is retried
    /// or requeued.
    pub async fn dispatch(&self, jobs: Vec<NotificationJob>) -> DispatchSummary {
        let total_count = jobs.len();
        let mut outcomes = Vec::with_capacity(total_count);
        let mut success_count = 0;

        for job in &jobs {
            let recipient = job.recipient();
            match self.attempt(job).await {
                Ok(()) => {
                    success_count += 1;
                    outcomes.push(JobOutcome {
                        recipient,
                        channel: job.channel,
                        success: true,
                        reason: None,
                    });
                }
                Err(reason) => {
                    tracing::warn!(
                        recipient = %recipient,
                        channel = job.channel,
                        event_type = %job.event_type,
                        reason = %reason,
                        "Notification job failed"
                    );
                    outcomes.push(JobOutcome {
                        recipient,
                        channel: job.channel,
                        success: false,
                        reason: Some(reason),
                    });
                }
            }
        }

        tracing::info!(success_count, total_count, "Notification batch dispatched");

        DispatchSummary {
            success_count,
            total_count,
            outcomes,
        }
    }

    /// Deliver a single job through its channel.
    async fn attempt(&self, job: &NotificationJob) -> Result<(), String> {
        match job.channel {
            CHANNEL_IN_APP => {
                let user_id = job.user_id.ok_or("in-app job is missing a user id")?;
                let id = NotificationRepo::create(
                    &self.pool,
                    user_id,
                    &job.event_type,
                    CHANNEL_IN_APP,
                    &job.payload,
                )
                .await
                .map_err(|e| e.to_string())?;
                NotificationRepo::mark_delivered(&self.pool, id)
                    .await
                    .map_err(|e| e.to_string())
            }
            CHANNEL_EMAIL => {
                let address = job
                    .address
                    .as_deref()
                    .ok_or("email job is missing an address")?;
                let mailer = self
                    .email
                    .as_ref()
                    .ok_or("email delivery is not configured")?;
                mailer
                    .deliver(address, job.template_key, &job.payload)
                    .await
                    .map_err(|e| e.to_string())
            }
            CHANNEL_WEBHOOK => {
                let url = job
                    .address
                    .as_deref()
                    .ok_or("webhook job is missing a URL")?;
                self.webhook
                    .deliver(url, &job.payload)
                    .await
                    .map_err(|e| e.to_string())
            }
            other => Err(format!("unknown channel '{other}'")),
        }
    }
}

/// Extract a numeric id field from an event payload.
fn payload_id(event: &DomainEvent, key: &str) -> Option<DbId> {
    event.payload.get(key).and_then(|v| v.as_i64())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_app_job_recipient_is_user_id() {
        let job = NotificationJob::in_app(7, EVENT_ATTENDANCE_MARKED, serde_json::json!({}));
        assert_eq!(job.recipient(), "user:7");
        assert_eq!(job.channel, CHANNEL_IN_APP);
    }

    #[test]
    fn email_job_recipient_is_address() {
        let job = NotificationJob::email(
            "parent@example.com",
            EVENT_LEAVE_REVIEWED,
            "leave_reviewed",
            serde_json::json!({}),
        );
        assert_eq!(job.recipient(), "parent@example.com");
        assert_eq!(job.channel, CHANNEL_EMAIL);
    }

    #[test]
    fn payload_id_reads_numeric_fields() {
        let event = DomainEvent::new(EVENT_ATTENDANCE_MARKED)
            .with_payload(serde_json::json!({"record_id": 42, "status": "present"}));
        assert_eq!(payload_id(&event, "record_id"), Some(42));
        assert_eq!(payload_id(&event, "status"), None);
        assert_eq!(payload_id(&event, "missing"), None);
    }
}
