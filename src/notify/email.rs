//! SMTP email sink.
//!
//! Sends one HTML message per event. With `use_tls` the connection is
//! upgraded with STARTTLS; credentials are only sent when both username and
//! password are configured.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::NotificationEvent;
use crate::config::{EmailConfig, NOTIFY_TIMEOUT};
use crate::error_handling::{ConfigError, NotifyError};

#[derive(Debug, Clone)]
pub struct EmailSink {
    server: String,
    port: u16,
    use_tls: bool,
    credentials: Option<(String, String)>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSink {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEmailAddress` when either address does
    /// not parse.
    pub fn from_config(config: &EmailConfig) -> Result<Self, ConfigError> {
        let mailbox = |address: &str| {
            address
                .trim()
                .parse::<Mailbox>()
                .map_err(|_| ConfigError::InvalidEmailAddress(address.to_string()))
        };
        let credentials = match (&config.username, &config.password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Some((user.clone(), pass.clone()))
            }
            _ => None,
        };
        Ok(Self {
            server: config.smtp_server.trim().to_string(),
            port: config.smtp_port,
            use_tls: config.use_tls,
            credentials,
            from: mailbox(&config.from_address)?,
            to: mailbox(&config.to_address)?,
        })
    }

    pub async fn send(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(event.headline())
            .header(ContentType::TEXT_HTML)
            .body(html_body(event))?;

        let mut transport = if self.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.server)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.server)
        }
        .port(self.port);
        if let Some((user, pass)) = &self.credentials {
            transport = transport.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        let mailer = transport.build();

        tokio::time::timeout(NOTIFY_TIMEOUT, mailer.send(message))
            .await
            .map_err(|_| NotifyError::Timeout(NOTIFY_TIMEOUT))??;
        Ok(())
    }
}

/// HTML body: headline, message, item list and a link to the tracker.
fn html_body(event: &NotificationEvent) -> String {
    let items: String = event
        .items()
        .iter()
        .map(|item| {
            format!(
                "<li><a href=\"{}\">{}</a> ({})</li>",
                escape_html(&item.url),
                escape_html(&item.title),
                escape_html(&item.source)
            )
        })
        .collect();
    let list = if items.is_empty() {
        String::new()
    } else {
        format!("<ul>{}</ul>", items)
    };
    format!(
        "<html><body><h2>{headline}</h2><p>{message}</p>{list}\
         <p><a href=\"{url}\">Open the tracker page</a></p><hr>\
         <p><small>Tracker Monitor - {time}</small></p></body></html>",
        headline = escape_html(&event.headline()),
        message = escape_html(&event.message),
        list = list,
        url = escape_html(&event.action_url),
        time = event.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::tests::alpha;
    use crate::scan::ScanItem;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn config(port: u16) -> EmailConfig {
        EmailConfig {
            enabled: true,
            smtp_server: "127.0.0.1".to_string(),
            smtp_port: port,
            use_tls: false,
            from_address: "monitor@example.org".to_string(),
            to_address: "ops@example.org".to_string(),
            ..EmailConfig::default()
        }
    }

    /// Minimal SMTP server for one session; returns the DATA section.
    async fn smtp_server() -> (u16, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read, mut write) = stream.into_split();
            let mut lines = BufReader::new(read).lines();
            write.write_all(b"220 localhost ESMTP\r\n").await.unwrap();
            let mut data = String::new();
            let mut in_data = false;
            while let Ok(Some(line)) = lines.next_line().await {
                if in_data {
                    if line == "." {
                        in_data = false;
                        write.write_all(b"250 OK queued\r\n").await.unwrap();
                    } else {
                        data.push_str(&line);
                        data.push('\n');
                    }
                    continue;
                }
                let command = line.to_ascii_uppercase();
                let reply: &[u8] = if command.starts_with("EHLO") || command.starts_with("HELO") {
                    b"250 localhost\r\n"
                } else if command.starts_with("DATA") {
                    in_data = true;
                    b"354 End data with <CR><LF>.<CR><LF>\r\n"
                } else if command.starts_with("QUIT") {
                    let _ = write.write_all(b"221 Bye\r\n").await;
                    break;
                } else {
                    b"250 OK\r\n"
                };
                write.write_all(reply).await.unwrap();
            }
            data
        });
        (port, handle)
    }

    #[tokio::test]
    async fn test_email_delivered_over_smtp() {
        let (port, server) = smtp_server().await;
        let sink = EmailSink::from_config(&config(port)).unwrap();

        sink.send(&NotificationEvent::opened(&alpha()))
            .await
            .expect("delivery should succeed");

        let data = server.await.unwrap();
        assert!(data.contains("monitor@example.org"));
        assert!(data.contains("ops@example.org"));
        assert!(data.to_ascii_lowercase().contains("content-type: text/html"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let sink = EmailSink::from_config(&config(port)).unwrap();
        let result = sink.send(&NotificationEvent::opened(&alpha())).await;
        assert!(matches!(result, Err(NotifyError::Smtp(_))));
    }

    #[test]
    fn test_invalid_address_is_config_error() {
        let mut bad = config(25);
        bad.to_address = "not an address".to_string();
        assert_eq!(
            EmailSink::from_config(&bad).unwrap_err(),
            ConfigError::InvalidEmailAddress("not an address".to_string())
        );
    }

    #[test]
    fn test_credentials_need_both_fields() {
        let mut cfg = config(25);
        cfg.username = Some("monitor".to_string());
        assert!(EmailSink::from_config(&cfg).unwrap().credentials.is_none());
        cfg.password = Some("secret".to_string());
        assert!(EmailSink::from_config(&cfg).unwrap().credentials.is_some());
    }

    #[test]
    fn test_html_body_lists_items_escaped() {
        let items = vec![ScanItem::new("forum.example", "<b>AlphaTracker</b> invites", "https://forum.example/t?a=1&b=2")];
        let body = html_body(&NotificationEvent::invites_found(&alpha(), items));
        assert!(body.contains("<h2>🎟️ AlphaTracker - Invites Found!</h2>"));
        assert!(body.contains("&lt;b&gt;AlphaTracker&lt;/b&gt; invites"));
        assert!(body.contains("https://forum.example/t?a=1&amp;b=2"));
        assert!(body.contains("Tracker Monitor - "));
    }
}
