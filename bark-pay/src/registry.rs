//! Static token registry for the BARK ecosystem.
//!
//! Maps token symbols to mint addresses, decimal precision, and icon
//! references. Descriptors are immutable and loaded at process start; every
//! other component takes its conversion constants from here.

use std::collections::HashMap;

use solana_pubkey::{Pubkey, pubkey};

use crate::error::PayError;

/// USDC mint on Solana mainnet.
pub const USDC_MINT: Pubkey = pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");

/// BARK token mint on Solana mainnet.
pub const BARK_MINT: Pubkey = pubkey!("2NTvEssJ2i998V2cMGT4Fy3JhyFnAzHFonDo9dbAkVrg");

/// An immutable description of a supported token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDescriptor {
    /// Ticker symbol, e.g. `SOL` or `BARK`.
    pub symbol: String,
    /// Human-readable display name.
    pub name: String,
    /// Mint address. `None` for the native currency.
    pub mint: Option<Pubkey>,
    /// Decimal precision of the token's base unit.
    pub decimals: u8,
    /// Icon asset reference for UI consumers.
    pub icon: String,
}

impl TokenDescriptor {
    /// Whether this descriptor is the native currency (no mint).
    #[must_use]
    pub const fn is_native(&self) -> bool {
        self.mint.is_none()
    }

    /// The value placed in a payment URI's `token` parameter: the mint
    /// address for SPL tokens, the symbol for the native currency.
    #[must_use]
    pub fn uri_token(&self) -> String {
        self.mint
            .map_or_else(|| self.symbol.clone(), |mint| mint.to_string())
    }
}

/// Symbol-keyed registry of [`TokenDescriptor`]s.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: HashMap<String, TokenDescriptor>,
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl TokenRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokens: HashMap::new(),
        }
    }

    /// Creates a registry with the standard BARK ecosystem tokens:
    /// native SOL (9 decimals), BARK (9), and USDC (6).
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.insert(TokenDescriptor {
            symbol: "SOL".into(),
            name: "Solana".into(),
            mint: None,
            decimals: 9,
            icon: "/icons/sol.svg".into(),
        });
        registry.insert(TokenDescriptor {
            symbol: "BARK".into(),
            name: "BARK".into(),
            mint: Some(BARK_MINT),
            decimals: 9,
            icon: "/icons/bark.svg".into(),
        });
        registry.insert(TokenDescriptor {
            symbol: "USDC".into(),
            name: "USD Coin".into(),
            mint: Some(USDC_MINT),
            decimals: 6,
            icon: "/icons/usdc.svg".into(),
        });
        registry
    }

    /// Adds or replaces a descriptor.
    pub fn insert(&mut self, descriptor: TokenDescriptor) {
        self.tokens.insert(descriptor.symbol.clone(), descriptor);
    }

    /// Looks up a descriptor by symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&TokenDescriptor> {
        self.tokens.get(symbol)
    }

    /// Looks up a descriptor by symbol, failing with
    /// [`PayError::UnknownToken`] when absent.
    ///
    /// # Errors
    ///
    /// Returns [`PayError::UnknownToken`] if the symbol is not registered.
    pub fn require(&self, symbol: &str) -> Result<&TokenDescriptor, PayError> {
        self.get(symbol)
            .ok_or_else(|| PayError::UnknownToken(symbol.to_owned()))
    }

    /// Iterates over all registered descriptors.
    pub fn iter(&self) -> impl Iterator<Item = &TokenDescriptor> {
        self.tokens.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_ecosystem_tokens() {
        let registry = TokenRegistry::with_defaults();
        assert!(registry.get("SOL").unwrap().is_native());
        assert_eq!(registry.get("BARK").unwrap().decimals, 9);
        assert_eq!(registry.get("USDC").unwrap().decimals, 6);
        assert_eq!(registry.get("USDC").unwrap().mint, Some(USDC_MINT));
    }

    #[test]
    fn test_unknown_symbol_is_rejected() {
        let registry = TokenRegistry::with_defaults();
        assert!(matches!(
            registry.require("DOGE"),
            Err(PayError::UnknownToken(symbol)) if symbol == "DOGE"
        ));
    }

    #[test]
    fn test_uri_token_uses_mint_for_spl() {
        let registry = TokenRegistry::with_defaults();
        assert_eq!(registry.get("SOL").unwrap().uri_token(), "SOL");
        assert_eq!(
            registry.get("USDC").unwrap().uri_token(),
            USDC_MINT.to_string()
        );
    }
}
