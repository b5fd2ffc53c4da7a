//! Display projection shared by the live preview and the print page.

use comfy_table::{Attribute, Cell, Color, Table};
use serde::Serialize;

use crate::amount::{NumberLocale, amount_due};
use crate::model::{Category, InvoiceDraft};

pub const CLIENT_PLACEHOLDER: &str = "Client name or company";
pub const FROM_PLACEHOLDER: &str = "Your business name";
pub const DESCRIPTION_PLACEHOLDER: &str = "Describe the services or products provided";
pub const DEADLINE_PLACEHOLDER: &str = "Select a due date";
pub const ADDRESS_PLACEHOLDER: &str = "Enter a wallet address";
pub const NETWORK_PLACEHOLDER: &str = "Specify the network";
pub const LINK_PLACEHOLDER: &str = "Provide a payment URL";

/// The one payment block that is shown for an invoice.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PaymentDetails {
    Crypto { address: String, network: String },
    General { link: String },
}

/// Human-readable invoice with placeholders filled in.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct InvoiceView {
    pub billed_to: String,
    pub from: String,
    pub description: String,
    pub amount_due: String,
    pub deadline: String,
    pub category_label: String,
    pub payment: PaymentDetails,
}

pub(crate) fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.is_empty() { placeholder.to_string() } else { value.to_string() }
}

impl InvoiceView {
    pub fn project(draft: &InvoiceDraft, locale: &NumberLocale) -> Self {
        let payment = match draft.category {
            Category::Crypto => PaymentDetails::Crypto {
                address: or_placeholder(&draft.crypto_address, ADDRESS_PLACEHOLDER),
                network: or_placeholder(&draft.blockchain_network, NETWORK_PLACEHOLDER),
            },
            Category::General => PaymentDetails::General {
                link: or_placeholder(&draft.payment_link, LINK_PLACEHOLDER),
            },
        };

        InvoiceView {
            billed_to: or_placeholder(&draft.client, CLIENT_PLACEHOLDER),
            from: or_placeholder(&draft.from, FROM_PLACEHOLDER),
            description: or_placeholder(&draft.description, DESCRIPTION_PLACEHOLDER),
            amount_due: amount_due(draft, locale),
            deadline: or_placeholder(&draft.deadline, DEADLINE_PLACEHOLDER),
            category_label: draft.category.label().to_string(),
            payment,
        }
    }

    /// Label/value pairs in reading order.
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        let mut rows = vec![
            ("Billed To", self.billed_to.as_str()),
            ("From", self.from.as_str()),
            ("Description", self.description.as_str()),
            ("Amount Due", self.amount_due.as_str()),
            ("Deadline", self.deadline.as_str()),
            ("Invoice Type", self.category_label.as_str()),
        ];
        match &self.payment {
            PaymentDetails::Crypto { address, network } => {
                rows.push(("Crypto Address", address.as_str()));
                rows.push(("Blockchain Network", network.as_str()));
            }
            PaymentDetails::General { link } => rows.push(("Payment Link", link.as_str())),
        }
        rows
    }
}

/// Terminal rendition of the live preview.
pub fn preview_table(view: &InvoiceView) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Invoice Preview").add_attribute(Attribute::Bold),
        Cell::new(""),
    ]);
    for (label, value) in view.rows() {
        let value_cell = if label == "Amount Due" {
            Cell::new(value).add_attribute(Attribute::Bold).fg(Color::Rgb { r: 4, g: 120, b: 87 })
        } else {
            Cell::new(value)
        };
        table.add_row(vec![Cell::new(label), value_cell]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(view: &InvoiceView) -> Vec<&'static str> {
        view.rows().into_iter().map(|(l, _)| l).collect()
    }

    #[test]
    fn general_invoice_shows_only_payment_link() {
        let draft = InvoiceDraft {
            payment_link: "https://pay.example/1".into(),
            crypto_address: "0xstale".into(),
            ..Default::default()
        };
        let view = InvoiceView::project(&draft, &NumberLocale::default());
        assert_eq!(view.payment, PaymentDetails::General { link: "https://pay.example/1".into() });
        let labels = labels(&view);
        assert!(labels.contains(&"Payment Link"));
        assert!(!labels.contains(&"Crypto Address"));
        assert!(!labels.contains(&"Blockchain Network"));
        assert!(!preview_table(&view).to_string().contains("0xstale"));
    }

    #[test]
    fn crypto_invoice_shows_wallet_fields_only() {
        let draft = InvoiceDraft {
            category: Category::Crypto,
            crypto_address: "0xabc".into(),
            blockchain_network: "Ethereum".into(),
            payment_link: "https://stale.example".into(),
            ..Default::default()
        };
        let view = InvoiceView::project(&draft, &NumberLocale::default());
        assert_eq!(
            view.payment,
            PaymentDetails::Crypto { address: "0xabc".into(), network: "Ethereum".into() }
        );
        assert_eq!(view.category_label, "Crypto");
        let rendered = preview_table(&view).to_string();
        assert!(rendered.contains("0xabc"));
        assert!(rendered.contains("Ethereum"));
        assert!(!rendered.contains("Payment Link"));
        assert!(!rendered.contains("stale.example"));
    }

    #[test]
    fn empty_draft_uses_placeholders() {
        let view = InvoiceView::project(&InvoiceDraft::default(), &NumberLocale::default());
        assert_eq!(view.billed_to, CLIENT_PLACEHOLDER);
        assert_eq!(view.from, FROM_PLACEHOLDER);
        assert_eq!(view.description, DESCRIPTION_PLACEHOLDER);
        assert_eq!(view.amount_due, "0.00");
        assert_eq!(view.deadline, DEADLINE_PLACEHOLDER);
        assert_eq!(view.category_label, "General");
        assert_eq!(view.payment, PaymentDetails::General { link: LINK_PLACEHOLDER.into() });
    }

    #[test]
    fn empty_crypto_fields_use_placeholders() {
        let draft = InvoiceDraft { category: Category::Crypto, ..Default::default() };
        let view = InvoiceView::project(&draft, &NumberLocale::default());
        assert_eq!(
            view.payment,
            PaymentDetails::Crypto { address: ADDRESS_PLACEHOLDER.into(), network: NETWORK_PLACEHOLDER.into() }
        );
    }

    #[test]
    fn projection_is_repeatable() {
        let draft = InvoiceDraft {
            client: "Acme".into(),
            amount: "1234.5".into(),
            currency: "usd".into(),
            ..Default::default()
        };
        let locale = NumberLocale::default();
        let first = InvoiceView::project(&draft, &locale);
        let second = InvoiceView::project(&draft, &locale);
        assert_eq!(first, second);
        assert_eq!(first.amount_due, "1,234.50 usd");
        assert_eq!(preview_table(&first).to_string(), preview_table(&second).to_string());
    }
}
