use crate::config::MailConfig;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, Message,
    SmtpTransport, Transport,
};

const RESET_SUBJECT: &str = "MediSoft - Password reset";

pub fn reset_mail_body(link: &str) -> String {
    format!(
        "You asked to reset your MediSoft password.\n\n\
         Open the following link to choose a new one:\n{}\n\n\
         The link is valid for one hour. If you did not ask for this, ignore this message.",
        link
    )
}

/// Blocking send; call it from `web::block`.
pub fn send_reset_mail(config: &MailConfig, to: &str, link: &str) -> anyhow::Result<()> {
    let email = Message::builder()
        .from(config.from.parse()?)
        .to(to.parse()?)
        .subject(RESET_SUBJECT)
        .header(ContentType::TEXT_PLAIN)
        .body(reset_mail_body(link))?;

    let mut transport = SmtpTransport::starttls_relay(&config.host)?.port(config.port);
    if let (Some(user), Some(password)) = (&config.user, &config.password) {
        transport = transport.credentials(Credentials::new(user.clone(), password.clone()));
    }
    transport.build().send(&email)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_contains_link() {
        let body = reset_mail_body("http://127.0.0.1:8080/account/reset_password?token=abc");
        assert!(body.contains("token=abc"));
        assert!(body.contains("one hour"));
    }

    #[test]
    fn bad_sender_is_rejected_before_connecting() {
        let config = MailConfig {
            host: "localhost".to_string(),
            port: 2525,
            from: "not-an-address".to_string(),
            user: None,
            password: None,
        };
        assert!(send_reset_mail(&config, "ana@clinic.co", "http://x").is_err());
    }
}
