use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

/// Transactional email sender. Call sites treat delivery as best-effort:
/// failures are logged, never surfaced to the client.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingEmail) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct SendGridMailer {
    http: reqwest::Client,
    api_key: String,
    from_email: String,
    from_name: String,
    reply_to: Option<String>,
}

impl SendGridMailer {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("SENDGRID_API_KEY").map_err(|_| missing_env("SENDGRID_API_KEY"))?;
        let from_email = std::env::var("FROM_EMAIL").map_err(|_| missing_env("FROM_EMAIL"))?;
        let from_name = std::env::var("FROM_NAME").map_err(|_| missing_env("FROM_NAME"))?;
        let reply_to = std::env::var("REPLY_TO_EMAIL").ok();

        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            from_email,
            from_name,
            reply_to,
        })
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, mail: OutgoingEmail) -> anyhow::Result<()> {
        let url = "https://api.sendgrid.com/v3/mail/send";

        let mut content = vec![SgContent {
            r#type: "text/plain".into(),
            value: mail.text,
        }];
        if let Some(html) = mail.html {
            content.push(SgContent {
                r#type: "text/html".into(),
                value: html,
            });
        }

        let body = SgMail {
            personalizations: vec![SgPersonalization {
                to: vec![SgEmail {
                    email: mail.to,
                    name: None,
                }],
                subject: Some(mail.subject),
            }],
            from: SgEmail {
                email: self.from_email.clone(),
                name: Some(self.from_name.clone()),
            },
            reply_to: self.reply_to.as_ref().map(|e| SgEmail {
                email: e.clone(),
                name: None,
            }),
            content,
        };

        let res = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        // SendGrid success = 202 Accepted
        if res.status() == reqwest::StatusCode::ACCEPTED {
            tracing::info!("email sent");
            Ok(())
        } else {
            let code = res.status().as_u16();
            let text = res.text().await.unwrap_or_default();
            anyhow::bail!("sendgrid failed: status={code} body={text}")
        }
    }
}

fn missing_env(var: &'static str) -> anyhow::Error {
    anyhow::anyhow!("missing env var: {var}")
}

/// Fallback when no SendGrid key is configured: log the message and move on.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, mail: OutgoingEmail) -> anyhow::Result<()> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "mailer not configured, email skipped");
        Ok(())
    }
}

pub fn from_env() -> Arc<dyn Mailer> {
    match SendGridMailer::from_env() {
        Ok(mailer) => Arc::new(mailer),
        Err(err) => {
            tracing::warn!(error = %err, "falling back to no-op mailer");
            Arc::new(NoopMailer)
        }
    }
}

fn frontend_url() -> String {
    std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string())
}

pub fn account_verification(name: &str, email: &str, token: &str) -> OutgoingEmail {
    let link = format!("{}/auth/verify/{}", frontend_url(), token);
    OutgoingEmail {
        to: email.to_string(),
        subject: "Confirm your account".to_string(),
        text: format!("Hi {name}, confirm your account at {link}"),
        html: Some(format!(
            "<p>Hi {name},</p><p>Confirm your account by following \
             <a href=\"{link}\">this link</a>.</p>"
        )),
    }
}

pub fn password_reset(name: &str, email: &str, token: &str) -> OutgoingEmail {
    let link = format!("{}/auth/forgot-password/{}", frontend_url(), token);
    OutgoingEmail {
        to: email.to_string(),
        subject: "Reset your password".to_string(),
        text: format!("Hi {name}, choose a new password at {link}"),
        html: Some(format!(
            "<p>Hi {name},</p><p>We received a request to reset your password. \
             Choose a new one <a href=\"{link}\">here</a>. If this wasn't you, \
             ignore this email.</p>"
        )),
    }
}

pub fn appointment_created(name: &str, email: &str, date: &str, time: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: email.to_string(),
        subject: "Appointment confirmed".to_string(),
        text: format!("Hi {name}, your appointment on {date} at {time} is confirmed."),
        html: Some(format!(
            "<p>Hi {name},</p><p>Your appointment on <strong>{date}</strong> at \
             <strong>{time}</strong> is confirmed.</p>"
        )),
    }
}

pub fn appointment_updated(name: &str, email: &str, date: &str, time: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: email.to_string(),
        subject: "Appointment rescheduled".to_string(),
        text: format!("Hi {name}, your appointment was moved to {date} at {time}."),
        html: Some(format!(
            "<p>Hi {name},</p><p>Your appointment was moved to <strong>{date}</strong> \
             at <strong>{time}</strong>.</p>"
        )),
    }
}

pub fn appointment_cancelled(name: &str, email: &str, date: &str, time: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: email.to_string(),
        subject: "Appointment cancelled".to_string(),
        text: format!("Hi {name}, your appointment on {date} at {time} was cancelled."),
        html: Some(format!(
            "<p>Hi {name},</p><p>Your appointment on <strong>{date}</strong> at \
             <strong>{time}</strong> was cancelled.</p>"
        )),
    }
}

#[derive(Serialize)]
struct SgMail {
    personalizations: Vec<SgPersonalization>,
    from: SgEmail,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<SgEmail>,
    content: Vec<SgContent>,
}

#[derive(Serialize)]
struct SgPersonalization {
    to: Vec<SgEmail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
}

#[derive(Serialize)]
struct SgEmail {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Serialize)]
struct SgContent {
    #[serde(rename = "type")]
    r#type: String,
    value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_email_links_the_token() {
        let mail = account_verification("Ann", "ann@example.com", "abc123");
        assert_eq!(mail.to, "ann@example.com");
        assert!(mail.text.contains("/auth/verify/abc123"));
        assert!(mail.html.as_deref().unwrap().contains("abc123"));
    }

    #[test]
    fn reset_email_links_the_token() {
        let mail = password_reset("Ann", "ann@example.com", "tok-9");
        assert!(mail.text.contains("/auth/forgot-password/tok-9"));
    }

    #[test]
    fn lifecycle_emails_carry_date_and_time() {
        for mail in [
            appointment_created("Ann", "ann@example.com", "01/03/2026", "10:30"),
            appointment_updated("Ann", "ann@example.com", "01/03/2026", "10:30"),
            appointment_cancelled("Ann", "ann@example.com", "01/03/2026", "10:30"),
        ] {
            assert!(mail.text.contains("01/03/2026"));
            assert!(mail.text.contains("10:30"));
        }
    }
}
