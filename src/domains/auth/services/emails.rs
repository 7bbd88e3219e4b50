// 인증 메일 본문 생성
// Transactional email composition for the auth domain
use url::Url;

use crate::shared::clients::{EmailKind, OutgoingEmail};

/// 프론트엔드 경로 + ?token=... 형태의 링크 생성
/// Build `<frontend>/<path>?token=<token>`
pub fn action_link(frontend_url: &Url, path: &str, token: &str) -> String {
    let mut url = frontend_url.clone();
    let base_path = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{}/{}", base_path, path.trim_start_matches('/')));
    url.query_pairs_mut().clear().append_pair("token", token);
    url.to_string()
}

pub fn confirmation(to: &str, link: String) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        kind: EmailKind::Confirmation,
        subject: "Confirm your email address".to_string(),
        body: format!(
            "Welcome!\n\nPlease confirm your email address by opening the link below:\n\n{}\n\n\
             If you did not sign up, you can ignore this email.",
            link
        ),
        action_url: Some(link),
    }
}

pub fn instructor_invite(to: &str, link: String) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        kind: EmailKind::InstructorInvite,
        subject: "You have been invited to join as an instructor".to_string(),
        body: format!(
            "You have been invited to teach on the platform.\n\n\
             Open the link below to choose a password and activate your account:\n\n{}",
            link
        ),
        action_url: Some(link),
    }
}

pub fn password_reset(to: &str, link: String) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        kind: EmailKind::PasswordReset,
        subject: "Reset your password".to_string(),
        body: format!(
            "A password reset was requested for your account.\n\n\
             Open the link below to choose a new password:\n\n{}\n\n\
             If you did not request this, you can ignore this email.",
            link
        ),
        action_url: Some(link),
    }
}

pub fn password_reset_unknown_account(to: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        kind: EmailKind::PasswordResetUnknownAccount,
        subject: "Reset your password".to_string(),
        body: "A password reset was requested for this email address, \
               but no account is registered with it.\n\n\
               If you did not request this, you can ignore this email."
            .to_string(),
        action_url: None,
    }
}
