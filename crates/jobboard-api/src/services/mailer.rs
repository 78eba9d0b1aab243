//! Application-confirmation mail via an HTTP relay.
//!
//! Delivery is best-effort: a mail failure is logged but never fails
//! the request that triggered it.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct MailPayload<'a> {
    to: &'a str,
    subject: String,
    body: String,
}

/// Client for the mail relay service. When no relay URL is configured
/// the mailer degrades to a no-op.
#[derive(Debug, Clone)]
pub struct Mailer {
    http: reqwest::Client,
    relay_url: Option<String>,
}

impl Mailer {
    pub fn new(relay_url: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { http, relay_url })
    }

    /// Notify an applicant that their application was received.
    pub async fn notify_application_submitted(&self, to: &str, job_title: &str) {
        let Some(relay_url) = self.relay_url.as_deref() else {
            debug!(to, "mail relay not configured, skipping notification");
            return;
        };

        let payload = MailPayload {
            to,
            subject: format!("Application received: {}", job_title),
            body: format!(
                "Your application for \"{}\" has been submitted. \
                 The recruiter will contact you if you are shortlisted.",
                job_title
            ),
        };

        match self.http.post(relay_url).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(to, job_title, "application notification sent");
            }
            Ok(resp) => {
                warn!(
                    to,
                    status = %resp.status(),
                    "mail relay rejected notification"
                );
            }
            Err(err) => {
                warn!(to, error = %err, "failed to reach mail relay");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_notification_posts_to_relay() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .and(body_partial_json(serde_json::json!({
                "to": "candidate@example.com"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mailer = Mailer::new(Some(format!("{}/send", server.uri()))).unwrap();
        mailer
            .notify_application_submitted("candidate@example.com", "Backend Engineer")
            .await;
    }

    #[tokio::test]
    async fn test_relay_failure_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mailer = Mailer::new(Some(server.uri())).unwrap();
        // Must not panic or propagate the failure
        mailer
            .notify_application_submitted("candidate@example.com", "Backend Engineer")
            .await;
    }

    #[tokio::test]
    async fn test_unconfigured_mailer_is_noop() {
        let mailer = Mailer::new(None).unwrap();
        mailer
            .notify_application_submitted("candidate@example.com", "Backend Engineer")
            .await;
    }
}
