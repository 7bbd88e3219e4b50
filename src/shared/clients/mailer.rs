use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::shared::config::MailSettings;

/// 메일 종류
/// Kind of transactional email
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    Confirmation,
    InstructorInvite,
    PasswordReset,
    /// 가입되지 않은 주소로 재설정 요청이 들어온 경우의 안내 메일
    PasswordResetUnknownAccount,
}

/// 발송할 메일
/// Email handed to the mail transport
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub kind: EmailKind,
    pub subject: String,
    pub body: String,
    /// 메일에 포함된 링크 (토큰 포함)
    pub action_url: Option<String>,
}

/// 메일 발송 인터페이스
/// Mail delivery collaborator
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}

/// 로그로만 출력하는 메일러 (개발용)
/// Mailer that only writes to the log; used when no mail API is configured
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        tracing::info!(to = %email.to, kind = ?email.kind, subject = %email.subject, "email (log only)");
        // 링크에 토큰이 들어 있으므로 debug 레벨에서만 출력
        tracing::debug!(to = %email.to, action_url = ?email.action_url, "email body:\n{}", email.body);
        Ok(())
    }
}

#[derive(Serialize)]
struct MailApiRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    tag: EmailKind,
}

/// HTTP 메일 API 클라이언트
/// Mail API client posting JSON to a transactional mail provider
pub struct HttpMailer {
    http_client: reqwest::Client,
    api_url: Url,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    // 클라이언트 생성
    // Create new mail API client
    pub fn new(api_url: Url, api_key: Option<String>, from: String) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            api_url,
            api_key,
            from,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let payload = MailApiRequest {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            text: &email.body,
            tag: email.kind,
        };

        let mut request = self
            .http_client
            .post(self.api_url.clone())
            .header("User-Agent", "academy-api/1.0")
            .json(&payload);

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .context("Failed to send request to mail API")?;

        // HTTP 상태 코드 확인
        // Check HTTP status code
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Mail API returned error: {} - {}", status, body);
        }

        tracing::info!(to = %email.to, kind = ?email.kind, "email sent");
        Ok(())
    }
}

/// 설정에 맞는 메일러 생성
/// Build the mailer selected by configuration
pub fn mailer_from_settings(settings: &MailSettings) -> Result<Arc<dyn Mailer>> {
    match &settings.api_url {
        Some(api_url) => Ok(Arc::new(HttpMailer::new(
            api_url.clone(),
            settings.api_key.clone(),
            settings.from.clone(),
        )?)),
        None => {
            tracing::warn!("MAIL_API_URL not set, emails will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}
