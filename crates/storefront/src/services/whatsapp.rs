//! Message-app deep link for relaying an order to store staff.
//!
//! After a successful submission the shopper gets a `wa.me` link with the
//! order pre-filled, which they send to the store's number by hand.

use std::fmt::Write as _;

use aura_core::CheckoutData;

/// Prefix every relay link starts with.
pub const WHATSAPP_BASE: &str = "https://wa.me/";

/// The pre-filled order message.
#[must_use]
pub fn order_message(order: &CheckoutData) -> String {
    let contact = &order.contact_info;
    let mut message = String::from("🔔 *New Order Received!*\n\n");

    let _ = writeln!(message, "*Customer:* {}", contact.full_name());
    let _ = writeln!(message, "*Phone:* {}", contact.phone.trim());
    let _ = writeln!(
        message,
        "*Address:* {}, {}",
        contact.address.trim(),
        contact.city.trim()
    );

    message.push_str("\n*Items:*\n");
    for item in &order.cart {
        let _ = writeln!(message, "- {} (x{})", item.name, item.qty);
    }

    let _ = write!(message, "\n*Total:* {}", order.total.display());
    message
}

/// Deep link to `number` carrying the order message.
#[must_use]
pub fn order_link(number: &str, order: &CheckoutData) -> String {
    format!(
        "{WHATSAPP_BASE}{number}?text={}",
        urlencoding::encode(&order_message(order))
    )
}

/// Whether `url` is a relay link the confirmation page may render.
#[must_use]
pub fn is_relay_link(url: &str) -> bool {
    url.starts_with(WHATSAPP_BASE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aura_core::{ContactInfo, LineItem, OrderTotals, Price};

    use super::*;

    fn order() -> CheckoutData {
        let contact = ContactInfo {
            first_name: "Ayesha".into(),
            last_name: "Khan".into(),
            email: "ayesha@example.com".into(),
            phone: "03001234567".into(),
            address: "12 Canal Road".into(),
            apartment: None,
            city: "Lahore".into(),
            postal_code: "54000".into(),
        };
        let cart = vec![LineItem::new("rose-oud", "Rose Oud", Price::new(2500), None)];
        CheckoutData::new(
            contact,
            cart.clone(),
            OrderTotals::for_items(&cart, Price::new(99)),
        )
    }

    #[test]
    fn test_message_layout() {
        assert_eq!(
            order_message(&order()),
            "🔔 *New Order Received!*\n\n\
             *Customer:* Ayesha Khan\n\
             *Phone:* 03001234567\n\
             *Address:* 12 Canal Road, Lahore\n\n\
             *Items:*\n\
             - Rose Oud (x1)\n\n\
             *Total:* PKR 2,599"
        );
    }

    #[test]
    fn test_link_is_encoded() {
        let link = order_link("923360303003", &order());
        assert!(link.starts_with("https://wa.me/923360303003?text="));
        assert!(!link.contains(' '));
        assert!(!link.contains('\n'));
        assert!(link.contains("Ayesha%20Khan"));
        assert!(is_relay_link(&link));
    }

    #[test]
    fn test_only_relay_links_accepted() {
        assert!(!is_relay_link("javascript:alert(1)"));
        assert!(!is_relay_link("https://evil.example/wa.me/"));
        assert!(!is_relay_link("http://wa.me/123"));
    }
}
