//! Payment URI encoding and parsing.
//!
//! Payment requests are shared as `solana:` URIs a wallet application can
//! scan and parse:
//!
//! ```text
//! solana:<recipient>?amount=<decimal>&token=<mint-or-native>&reference=<key>&label=<text>&memo=<text>
//! ```
//!
//! Encoding and parsing round-trip losslessly for `amount` and
//! `reference`; `label` and `memo` are percent-encoded by the [`url`]
//! crate.

use rust_decimal::Decimal;
use solana_pubkey::Pubkey;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use url::Url;

use crate::amount::parse_amount;
use crate::error::PayError;
use crate::transfer::parse_address;

/// URI scheme understood by wallet applications.
pub const PAYMENT_URI_SCHEME: &str = "solana";

/// The parsed form of a payment URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentUri {
    /// Address receiving the payment.
    pub recipient: Pubkey,
    /// Decimal amount in user units.
    pub amount: Decimal,
    /// Mint address, or the native currency's symbol.
    pub token: String,
    /// Reference key correlating the on-chain transaction.
    pub reference: Pubkey,
    /// Optional display label for the wallet UI.
    pub label: Option<String>,
    /// Optional memo to record on-chain.
    pub memo: Option<String>,
}

impl Display for PaymentUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut url = Url::parse(&format!("{PAYMENT_URI_SCHEME}:{}", self.recipient))
            .map_err(|_| std::fmt::Error)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("amount", &self.amount.to_string());
            query.append_pair("token", &self.token);
            query.append_pair("reference", &self.reference.to_string());
            if let Some(label) = &self.label {
                query.append_pair("label", label);
            }
            if let Some(memo) = &self.memo {
                query.append_pair("memo", memo);
            }
        }
        write!(f, "{url}")
    }
}

impl FromStr for PaymentUri {
    type Err = PayError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(input)
            .map_err(|e| PayError::InvalidInput(format!("malformed payment URI: {e}")))?;
        if url.scheme() != PAYMENT_URI_SCHEME {
            return Err(PayError::InvalidInput(format!(
                "unsupported URI scheme: {}",
                url.scheme()
            )));
        }
        let recipient = parse_address(url.path())?;

        let mut amount = None;
        let mut token = None;
        let mut reference = None;
        let mut label = None;
        let mut memo = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "amount" => amount = Some(parse_amount(&value)?),
                "token" => token = Some(value.into_owned()),
                "reference" => reference = Some(parse_address(&value)?),
                "label" => label = Some(value.into_owned()),
                "memo" => memo = Some(value.into_owned()),
                _ => {}
            }
        }

        Ok(Self {
            recipient,
            amount: amount
                .ok_or_else(|| PayError::InvalidInput("missing amount parameter".into()))?,
            token: token.ok_or_else(|| PayError::InvalidInput("missing token parameter".into()))?,
            reference: reference
                .ok_or_else(|| PayError::InvalidInput("missing reference parameter".into()))?,
            label,
            memo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PaymentUri {
        PaymentUri {
            recipient: Pubkey::new_unique(),
            amount: parse_amount("10.5").unwrap(),
            token: "SOL".into(),
            reference: Pubkey::new_unique(),
            label: Some("BARK Store".into()),
            memo: Some("order #7".into()),
        }
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let uri = sample();
        let encoded = uri.to_string();
        let parsed: PaymentUri = encoded.parse().unwrap();
        assert_eq!(parsed, uri);
        assert_eq!(parsed.amount.to_string(), "10.5");
    }

    #[test]
    fn test_encodes_expected_shape() {
        let uri = sample();
        let encoded = uri.to_string();
        assert!(encoded.starts_with(&format!("solana:{}?", uri.recipient)));
        assert!(encoded.contains("amount=10.5"));
        assert!(encoded.contains(&format!("reference={}", uri.reference)));
    }

    #[test]
    fn test_rejects_foreign_scheme() {
        let uri = sample().to_string().replace("solana:", "bitcoin:");
        assert!(matches!(
            uri.parse::<PaymentUri>(),
            Err(PayError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_missing_reference() {
        let recipient = Pubkey::new_unique();
        let uri = format!("solana:{recipient}?amount=1&token=SOL");
        assert!(matches!(
            uri.parse::<PaymentUri>(),
            Err(PayError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_junk_amount() {
        let recipient = Pubkey::new_unique();
        let reference = Pubkey::new_unique();
        let uri = format!("solana:{recipient}?amount=lots&token=SOL&reference={reference}");
        assert!(matches!(
            uri.parse::<PaymentUri>(),
            Err(PayError::InvalidAmount(_))
        ));
    }
}
