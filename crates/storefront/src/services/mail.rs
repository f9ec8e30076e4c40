//! Order notification mail.
//!
//! Every order sends two multipart (text + HTML) emails through the SMTP
//! relay: a confirmation to the customer and a notification to the store
//! operator. Both are rendered from Askama templates.
//!
//! Handlers only see the [`OrderNotifier`] trait so tests can swap in a
//! recording fake and an unconfigured store can run with [`DisabledNotifier`].

use askama::Template;
use async_trait::async_trait;
use aura_core::{CheckoutData, ContactInfo, LineItem};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use thiserror::Error;

use crate::config::MailConfig;

/// Subject line of the customer confirmation.
pub const CUSTOMER_SUBJECT: &str = "Your Order Confirmation - Aura Sentiments";

/// Errors that can occur when dispatching order mail.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// No mail relay is configured.
    #[error("mail relay is not configured")]
    NotConfigured,

    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Sends order notifications.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Dispatch the customer confirmation and the operator notification.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if either message cannot be rendered or sent.
    async fn notify_order(&self, order: &CheckoutData) -> Result<(), NotifyError>;
}

/// Notifier used when no relay is configured; every dispatch fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl OrderNotifier for DisabledNotifier {
    async fn notify_order(&self, _order: &CheckoutData) -> Result<(), NotifyError> {
        Err(NotifyError::NotConfigured)
    }
}

/// One line of an order as printed in mail.
pub struct MailLine {
    pub name: String,
    pub qty: u32,
    pub unit_price: String,
}

impl From<&LineItem> for MailLine {
    fn from(item: &LineItem) -> Self {
        Self {
            name: item.name.clone(),
            qty: item.qty,
            unit_price: item.price.display(),
        }
    }
}

/// HTML template for the customer confirmation.
#[derive(Template)]
#[template(path = "email/order_customer.html")]
struct CustomerEmailHtml<'a> {
    first_name: &'a str,
    lines: &'a [MailLine],
    total: &'a str,
}

/// Plain text template for the customer confirmation.
#[derive(Template)]
#[template(path = "email/order_customer.txt")]
struct CustomerEmailText<'a> {
    first_name: &'a str,
    lines: &'a [MailLine],
    total: &'a str,
}

/// HTML template for the operator notification.
#[derive(Template)]
#[template(path = "email/order_operator.html")]
struct OperatorEmailHtml<'a> {
    contact: &'a ContactInfo,
    full_name: &'a str,
    address: &'a str,
    lines: &'a [MailLine],
    total: &'a str,
}

/// Plain text template for the operator notification.
#[derive(Template)]
#[template(path = "email/order_operator.txt")]
struct OperatorEmailText<'a> {
    contact: &'a ContactInfo,
    full_name: &'a str,
    address: &'a str,
    lines: &'a [MailLine],
    total: &'a str,
}

/// A rendered email, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Subject line of the operator notification.
#[must_use]
pub fn operator_subject(contact: &ContactInfo) -> String {
    format!("New Order from {} - Aura Sentiments", contact.first_name.trim())
}

/// Full postal address: street, apartment when present, city, postal code.
#[must_use]
pub fn postal_address(contact: &ContactInfo) -> String {
    let mut parts = vec![contact.address.trim()];
    if let Some(apartment) = contact.apartment() {
        parts.push(apartment);
    }
    parts.push(contact.city.trim());
    parts.push(contact.postal_code.trim());
    parts.join(", ")
}

/// Render the customer confirmation.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn render_customer_email(order: &CheckoutData) -> Result<RenderedEmail, askama::Error> {
    let lines: Vec<MailLine> = order.cart.iter().map(MailLine::from).collect();
    let total = order.total.display();
    let first_name = order.contact_info.first_name.trim();

    Ok(RenderedEmail {
        subject: CUSTOMER_SUBJECT.to_string(),
        text: CustomerEmailText {
            first_name,
            lines: &lines,
            total: &total,
        }
        .render()?,
        html: CustomerEmailHtml {
            first_name,
            lines: &lines,
            total: &total,
        }
        .render()?,
    })
}

/// Render the operator notification.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn render_operator_email(order: &CheckoutData) -> Result<RenderedEmail, askama::Error> {
    let lines: Vec<MailLine> = order.cart.iter().map(MailLine::from).collect();
    let total = order.total.display();
    let contact = &order.contact_info;
    let full_name = contact.full_name();
    let address = postal_address(contact);

    Ok(RenderedEmail {
        subject: operator_subject(contact),
        text: OperatorEmailText {
            contact,
            full_name: &full_name,
            address: &address,
            lines: &lines,
            total: &total,
        }
        .render()?,
        html: OperatorEmailHtml {
            contact,
            full_name: &full_name,
            address: &address,
            lines: &lines,
            total: &total,
        }
        .render()?,
    })
}

/// SMTP-backed notifier.
#[derive(Clone)]
pub struct MailRelay {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    customer_from: Mailbox,
    system_from: Mailbox,
    operator: Mailbox,
}

impl MailRelay {
    /// Create a relay from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host is invalid or a configured address
    /// does not parse.
    pub fn new(config: &MailConfig) -> Result<Self, NotifyError> {
        let credentials =
            Credentials::new(config.smtp_username.clone(), config.password().to_string());

        let builder = if config.smtp_secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        };
        let mailer = builder
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            customer_from: parse_mailbox(&config.customer_from)?,
            system_from: parse_mailbox(&config.system_from)?,
            operator: parse_mailbox(config.notify_address.as_str())?,
        })
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send(
        &self,
        from: Mailbox,
        to: Mailbox,
        email: RenderedEmail,
    ) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(from)
            .to(to.clone())
            .subject(email.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html),
                    ),
            )?;

        self.mailer.send(message).await?;

        tracing::info!(to = %to.email, subject = %email.subject, "Email sent successfully");
        Ok(())
    }
}

#[async_trait]
impl OrderNotifier for MailRelay {
    async fn notify_order(&self, order: &CheckoutData) -> Result<(), NotifyError> {
        let customer = parse_mailbox(&order.contact_info.email)?;

        let confirmation = render_customer_email(order)?;
        let notification = render_operator_email(order)?;

        self.send(self.customer_from.clone(), customer, confirmation)
            .await?;
        self.send(self.system_from.clone(), self.operator.clone(), notification)
            .await?;

        Ok(())
    }
}

fn parse_mailbox(raw: &str) -> Result<Mailbox, NotifyError> {
    raw.trim()
        .parse()
        .map_err(|_| NotifyError::InvalidAddress(raw.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aura_core::{OrderTotals, Price};

    use super::*;

    fn order() -> CheckoutData {
        let contact = ContactInfo {
            first_name: "Ayesha".into(),
            last_name: "Khan".into(),
            email: "ayesha@example.com".into(),
            phone: "03001234567".into(),
            address: "12 Canal Road".into(),
            apartment: Some("Flat 4".into()),
            city: "Lahore".into(),
            postal_code: "54000".into(),
        };
        let cart = vec![
            LineItem::new("rose-oud", "Rose Oud", Price::new(2599), None).with_qty(2),
            LineItem::new("cedar-noir", "Cedar Noir", Price::new(2499), None),
        ];
        let totals = OrderTotals::for_items(&cart, Price::new(99));
        CheckoutData::new(contact, cart, totals)
    }

    #[test]
    fn test_customer_email_contents() {
        let email = render_customer_email(&order()).unwrap();
        assert_eq!(email.subject, CUSTOMER_SUBJECT);
        assert!(email.html.contains("Ayesha"));
        assert!(email.html.contains("Rose Oud"));
        assert!(email.text.contains("Qty: 2 x PKR 2,599"));
        assert!(email.text.contains("PKR 7,796"));
    }

    #[test]
    fn test_operator_email_contents() {
        let email = render_operator_email(&order()).unwrap();
        assert_eq!(email.subject, "New Order from Ayesha - Aura Sentiments");
        assert!(email.text.contains("Ayesha Khan"));
        assert!(email.text.contains("ayesha@example.com"));
        assert!(email.text.contains("12 Canal Road, Flat 4, Lahore, 54000"));
        assert!(email.html.contains("03001234567"));
    }

    #[test]
    fn test_postal_address_skips_blank_apartment() {
        let mut contact = order().contact_info;
        contact.apartment = Some("   ".into());
        assert_eq!(postal_address(&contact), "12 Canal Road, Lahore, 54000");
    }

    #[tokio::test]
    async fn test_disabled_notifier_fails() {
        let err = DisabledNotifier.notify_order(&order()).await.unwrap_err();
        assert!(matches!(err, NotifyError::NotConfigured));
    }

    #[test]
    fn test_mailbox_with_display_name() {
        let mailbox = parse_mailbox("\"Aura Sentiments\" <no-reply@aurasentiments.com>").unwrap();
        assert_eq!(mailbox.email.to_string(), "no-reply@aurasentiments.com");
        assert!(parse_mailbox("not an address").is_err());
    }
}
