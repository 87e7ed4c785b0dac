//! Admin notifications for new submissions.
//!
//! Publishing only enqueues. A background worker delivers with retries.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use placement_core::{AlumniExperience, Config, Resource, ShowcaseProject};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const EXPERIENCE_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

/// Records that produce an admin notification once persisted.
pub trait Notify {
    fn notification(&self) -> Notification;
}

impl Notify for ShowcaseProject {
    fn notification(&self) -> Notification {
        Notification {
            subject: format!("New Project Submission: {}", self.title),
            body: format!(
                "A new project has been submitted for review:\n\n\
                 Project: {}\nSubmitted By: {} ({})\nTechnologies: {}\n\n\
                 Review it in your admin dashboard.",
                self.title,
                self.submitted_by.name,
                self.submitted_by.email,
                self.technologies.join(", ")
            ),
        }
    }
}

impl Notify for AlumniExperience {
    fn notification(&self) -> Notification {
        let snippet: String = self.experience.chars().take(EXPERIENCE_SNIPPET_CHARS).collect();
        Notification {
            subject: format!("New Alumni Experience Submission: {}", self.alumni_name),
            body: format!(
                "A new alumni experience has been submitted for review:\n\n\
                 Alumni Name: {}\nBatch: {}\nCompany: {}\nRole: {}\nExperience: {}...",
                self.alumni_name, self.batch, self.company, self.role, snippet
            ),
        }
    }
}

impl Notify for Resource {
    fn notification(&self) -> Notification {
        Notification {
            subject: format!("New Resource Published: {}", self.file.original_name),
            body: format!(
                "A new placement resource has been published:\n\n\
                 File: {}\nCategory: {}\nUploaded By: {}\nSize: {} bytes",
                self.file.original_name, self.category, self.uploaded_by, self.file.size_bytes
            ),
        }
    }
}

/// Delivery channel for notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), String>;
}

/// Sends notifications to the admin address over SMTP.
#[derive(Clone)]
pub struct SmtpNotifier {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
    to: String,
}

impl SmtpNotifier {
    /// Returns `None` if notifications are disabled or SMTP is not configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        if !config.email_notifications_enabled() {
            tracing::debug!("Email notifications disabled (EMAIL_NOTIFICATIONS_ENABLED=false)");
            return None;
        }
        let host = config.smtp_host()?;
        let from = config.smtp_from()?.to_string();
        let to = config.admin_email()?.to_string();
        let port = config.smtp_port().unwrap_or(587);
        let credentials = match (config.smtp_user(), config.smtp_password()) {
            (Some(u), Some(p)) => Some(Credentials::new(u.to_string(), p.to_string())),
            _ => None,
        };

        let mailer = if config.smtp_tls() {
            let b = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .ok()?
                .port(port);
            let b = match credentials {
                Some(c) => b.credentials(c),
                None => b,
            };
            tracing::info!(host = %host, port = port, "Email notifier initialized (SMTP with STARTTLS)");
            b.build()
        } else {
            let b = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port);
            let b = match credentials {
                Some(c) => b.credentials(c),
                None => b,
            };
            tracing::info!(host = %host, port = port, "Email notifier initialized (SMTP)");
            b.build()
        };

        Some(Self {
            mailer: Arc::new(mailer),
            from,
            to,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<(), String> {
        let from: Mailbox = self
            .from
            .parse()
            .map_err(|e| format!("Invalid SMTP_FROM: {}", e))?;
        let to: Mailbox = self
            .to
            .parse()
            .map_err(|e| format!("Invalid ADMIN_EMAIL: {}", e))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(notification.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .map_err(|e| e.to_string())?;

        self.mailer.send(email).await.map_err(|e| e.to_string())?;
        tracing::info!(subject = %notification.subject, "Notification email sent");
        Ok(())
    }
}

/// Writes notifications to the log. Used when SMTP is not configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<(), String> {
        tracing::info!(subject = %notification.subject, "Notification (email delivery not configured)");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NotificationOutboxConfig {
    pub capacity: usize,
    pub max_attempts: u32,
    pub retry_base: Duration,
}

impl Default for NotificationOutboxConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            max_attempts: 3,
            retry_base: Duration::from_millis(500),
        }
    }
}

impl NotificationOutboxConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            capacity: config.notification_queue_capacity(),
            max_attempts: config.notification_max_attempts(),
            retry_base: config.notification_retry_base(),
        }
    }
}

/// Bounded queue in front of a [`Notifier`], drained by a background worker.
#[derive(Clone)]
pub struct NotificationOutbox {
    tx: mpsc::Sender<Notification>,
    shutdown_tx: mpsc::Sender<()>,
}

impl NotificationOutbox {
    /// Spawn the delivery worker. Must be called inside a tokio runtime.
    pub fn start(notifier: Arc<dyn Notifier>, config: NotificationOutboxConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.capacity.max(1));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        tokio::spawn(async move {
            Self::worker_loop(notifier, config, rx, shutdown_rx).await;
        });

        Self { tx, shutdown_tx }
    }

    /// Queue a notification. Never blocks; a full queue drops the message with a warning.
    pub fn enqueue(&self, notification: Notification) {
        if let Err(e) = self.tx.try_send(notification) {
            let subject = match &e {
                mpsc::error::TrySendError::Full(n) | mpsc::error::TrySendError::Closed(n) => {
                    n.subject.clone()
                }
            };
            tracing::warn!(error = %e, subject = %subject, "Dropping notification");
        }
    }

    async fn worker_loop(
        notifier: Arc<dyn Notifier>,
        config: NotificationOutboxConfig,
        mut rx: mpsc::Receiver<Notification>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!(
            capacity = config.capacity,
            max_attempts = config.max_attempts,
            "Notification outbox started"
        );

        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(notification) => {
                        Self::deliver_with_retry(notifier.as_ref(), &config, &notification).await;
                    }
                    None => break,
                },
                _ = shutdown_rx.recv() => {
                    tracing::info!("Notification outbox shutting down");
                    break;
                }
            }
        }
    }

    async fn deliver_with_retry(
        notifier: &dyn Notifier,
        config: &NotificationOutboxConfig,
        notification: &Notification,
    ) {
        let attempts = config.max_attempts.max(1);
        for attempt in 1..=attempts {
            match notifier.deliver(notification).await {
                Ok(()) => return,
                Err(e) if attempt < attempts => {
                    let delay = config.retry_base * 2u32.saturating_pow(attempt - 1);
                    tracing::warn!(
                        error = %e,
                        attempt = attempt,
                        retry_in_ms = delay.as_millis() as u64,
                        subject = %notification.subject,
                        "Notification delivery failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        attempts = attempts,
                        subject = %notification.subject,
                        "Notification delivery failed, giving up"
                    );
                }
            }
        }
    }

    /// Stop the worker after the notification currently in flight.
    pub async fn shutdown(&self) {
        if let Err(e) = self.shutdown_tx.send(()).await {
            tracing::warn!(
                error = %e,
                "Failed to send shutdown signal to notification outbox"
            );
        }
    }
}
