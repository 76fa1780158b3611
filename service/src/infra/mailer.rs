//! [`Mailer`] implementations.

use std::time::Duration;

use common::operations::Deliver;
use derive_more::{Display, Error as StdError, From};
use reqwest::StatusCode;
use serde::Serialize;
use tracerr::Traced;
use tracing as log;

/// Transport of outgoing emails.
pub use common::Handler as Mailer;

/// Outgoing email.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Email {
    /// Address of the recipient.
    pub to: String,

    /// Subject line.
    pub subject: String,

    /// Plain text body.
    pub text: String,
}

/// [`Relay`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Address emails are sent from.
    pub sender: String,

    /// URL of the HTTP relay accepting emails.
    ///
    /// Emails are only logged if [`None`].
    pub endpoint: Option<String>,

    /// Timeout of a single relay request.
    pub timeout: Duration,
}

/// [`Mailer`] handing [`Email`]s over to an HTTP relay.
#[derive(Clone, Debug)]
pub struct Relay {
    /// Client performing requests.
    client: reqwest::Client,

    /// URL of the relay, if any.
    endpoint: Option<String>,

    /// Address emails are sent from.
    sender: String,
}

impl Relay {
    /// Creates a new [`Relay`] with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the HTTP client cannot be initialized.
    pub fn new(conf: &Config) -> Result<Self, Traced<Error>> {
        let client = reqwest::Client::builder()
            .timeout(conf.timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        Ok(Self {
            client,
            endpoint: conf.endpoint.clone(),
            sender: conf.sender.clone(),
        })
    }
}

/// Body of a relay request.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    /// Sender address.
    from: &'a str,

    /// Delivered [`Email`].
    #[serde(flatten)]
    email: &'a Email,
}

impl Mailer<Deliver<Email>> for Relay {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Deliver(email): Deliver<Email>,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(endpoint) = &self.endpoint else {
            log::info!(
                to = %email.to,
                subject = %email.subject,
                "no mail relay configured, email is not sent",
            );
            return Ok(());
        };

        let resp = self
            .client
            .post(endpoint)
            .json(&Envelope {
                from: &self.sender,
                email: &email,
            })
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        if !resp.status().is_success() {
            return Err(tracerr::new!(Error::Status(resp.status())));
        }

        log::debug!(to = %email.to, subject = %email.subject, "email sent");
        Ok(())
    }
}

/// [`Mailer`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Request to the relay failed to be performed.
    #[display("Relay request failed: {_0}")]
    Request(reqwest::Error),

    /// Relay responded with a non-success [`StatusCode`].
    #[display("Relay responded with `{_0}`")]
    #[from(ignore)]
    Status(#[error(not(source))] StatusCode),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::operations::Deliver;

    use super::{Config, Email, Envelope, Mailer as _, Relay};

    fn email() -> Email {
        Email {
            to: "amaka@example.com".into(),
            subject: "Loan Application Submitted".into(),
            text: "Dear Amaka".into(),
        }
    }

    #[test]
    fn envelope_carries_sender() {
        let email = email();
        let json = serde_json::to_value(Envelope {
            from: "loans@example.com",
            email: &email,
        })
        .unwrap();

        assert_eq!(json["from"], "loans@example.com");
        assert_eq!(json["to"], "amaka@example.com");
        assert_eq!(json["subject"], "Loan Application Submitted");
        assert_eq!(json["text"], "Dear Amaka");
    }

    #[tokio::test]
    async fn logs_without_relay() {
        let relay = Relay::new(&Config {
            sender: "loans@example.com".into(),
            endpoint: None,
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        relay.execute(Deliver(email())).await.unwrap();
    }
}
