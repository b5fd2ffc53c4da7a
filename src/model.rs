use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Which payment-detail block an invoice carries.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Crypto,
    #[default]
    General,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Crypto, Category::General];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Crypto => "crypto",
            Category::General => "general",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Crypto => "Crypto",
            Category::General => "General",
        }
    }

    /// Anything that is not exactly "crypto" renders as a general invoice.
    pub fn from_value(value: &str) -> Self {
        if value == "crypto" { Category::Crypto } else { Category::General }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The in-progress invoice. Every value is kept exactly as typed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    #[serde(default, deserialize_with = "lenient_string")]
    pub client: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub from: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub currency: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub deadline: String,
    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Category,
    // Only one of the two payment groups is active; the other may hold stale input.
    #[serde(default, deserialize_with = "lenient_string")]
    pub crypto_address: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub blockchain_network: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub payment_link: String,
}

impl InvoiceDraft {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Client => &self.client,
            Field::From => &self.from,
            Field::Description => &self.description,
            Field::Amount => &self.amount,
            Field::Currency => &self.currency,
            Field::Deadline => &self.deadline,
            Field::Category => self.category.as_str(),
            Field::CryptoAddress => &self.crypto_address,
            Field::BlockchainNetwork => &self.blockchain_network,
            Field::PaymentLink => &self.payment_link,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Client => self.client = value,
            Field::From => self.from = value,
            Field::Description => self.description = value,
            Field::Amount => self.amount = value,
            Field::Currency => self.currency = value,
            Field::Deadline => self.deadline = value,
            Field::Category => self.category = Category::from_value(&value),
            Field::CryptoAddress => self.crypto_address = value,
            Field::BlockchainNetwork => self.blockchain_network = value,
            Field::PaymentLink => self.payment_link = value,
        }
    }
}

/// A named, editable slot of [`InvoiceDraft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Client,
    From,
    Description,
    Amount,
    Currency,
    Deadline,
    Category,
    CryptoAddress,
    BlockchainNetwork,
    PaymentLink,
}

impl Field {
    /// Form order, matching the layout of the creation wizard.
    pub const ALL: [Field; 10] = [
        Field::Client,
        Field::From,
        Field::Category,
        Field::CryptoAddress,
        Field::BlockchainNetwork,
        Field::PaymentLink,
        Field::Description,
        Field::Amount,
        Field::Currency,
        Field::Deadline,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Field::Client => "client",
            Field::From => "from",
            Field::Description => "description",
            Field::Amount => "amount",
            Field::Currency => "currency",
            Field::Deadline => "deadline",
            Field::Category => "category",
            Field::CryptoAddress => "cryptoAddress",
            Field::BlockchainNetwork => "blockchainNetwork",
            Field::PaymentLink => "paymentLink",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Client => "Client Name / Company",
            Field::From => "From",
            Field::Description => "Description",
            Field::Amount => "Amount",
            Field::Currency => "Currency",
            Field::Deadline => "Deadline",
            Field::Category => "Invoice Type",
            Field::CryptoAddress => "Crypto Address",
            Field::BlockchainNetwork => "Blockchain Network",
            Field::PaymentLink => "Payment Link",
        }
    }

    /// Hint shown inside an empty input.
    pub fn hint(self) -> &'static str {
        match self {
            Field::Client => "e.g. Acme Corp.",
            Field::From => "Your business name",
            Field::Description => "Describe the services or products provided",
            Field::Amount => "0.00",
            Field::Currency => "Currency (e.g. USD, BTC)",
            Field::Deadline => "YYYY-MM-DD",
            Field::Category => "general",
            Field::CryptoAddress => "e.g. 0x...",
            Field::BlockchainNetwork => "e.g. Ethereum, Solana",
            Field::PaymentLink => "https://",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown invoice field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.wire_name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

// Handed-off records are not validated; falsy values read as empty, the rest as text.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        other => value_text(other),
    })
}

// A numeric zero is still an amount worth formatting.
fn lenient_amount<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(Value::deserialize(deserializer)?))
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "true".to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn lenient_category<'de, D>(deserializer: D) -> Result<Category, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Category::from_value(&s),
        _ => Category::General,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_draft_is_empty_and_general() {
        let draft = InvoiceDraft::default();
        assert_eq!(draft.category, Category::General);
        for field in Field::ALL {
            if field != Field::Category {
                assert_eq!(draft.get(field), "", "{field:?} should start empty");
            }
        }
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let draft = InvoiceDraft {
            crypto_address: "0xabc".into(),
            category: Category::Crypto,
            ..Default::default()
        };
        let json: Value = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["cryptoAddress"], "0xabc");
        assert_eq!(json["category"], "crypto");
        assert_eq!(json.as_object().unwrap().len(), 10);
    }

    #[test]
    fn decodes_partial_and_odd_records() {
        let draft: InvoiceDraft =
            serde_json::from_str(r#"{"client":"Acme","amount":12.5,"from":null,"category":"bitcoin"}"#)
                .unwrap();
        assert_eq!(draft.client, "Acme");
        assert_eq!(draft.amount, "12.5");
        assert_eq!(draft.from, "");
        assert_eq!(draft.deadline, "");
        assert_eq!(draft.category, Category::General);
    }

    #[test]
    fn falsy_values_decode_as_empty() {
        let draft: InvoiceDraft =
            serde_json::from_str(r#"{"client":false,"from":0,"deadline":0.0,"description":true,"amount":0}"#)
                .unwrap();
        assert_eq!(draft.client, "");
        assert_eq!(draft.from, "");
        assert_eq!(draft.deadline, "");
        assert_eq!(draft.description, "true");
        assert_eq!(draft.amount, "0");
    }

    #[test]
    fn field_names_parse_back() {
        for field in Field::ALL {
            assert_eq!(field.wire_name().parse::<Field>(), Ok(field));
        }
        assert_eq!("total".parse::<Field>(), Err(UnknownField("total".into())));
    }

    #[test]
    fn set_category_by_text() {
        let mut draft = InvoiceDraft::default();
        draft.set(Field::Category, "crypto");
        assert_eq!(draft.category, Category::Crypto);
        draft.set(Field::Category, "anything");
        assert_eq!(draft.category, Category::General);
    }
}
