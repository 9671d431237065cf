//! Instrument catalog port.
//!
//! The catalog is an external collaborator; the engine only needs symbol
//! resolution, so the port is a single lookup. A static implementation
//! backs tests and simulated trading.

use std::collections::HashMap;

use crate::domain::shared::{InstrumentId, Symbol};

/// Resolves trading symbols to tradable instrument references.
pub trait InstrumentCatalog: Send + Sync {
    /// Resolve a symbol to its instrument reference.
    ///
    /// Returns `None` for unknown or non-tradable symbols.
    fn resolve(&self, symbol: &Symbol) -> Option<InstrumentId>;
}

/// Fixed symbol table, resolved at construction.
#[derive(Debug, Default)]
pub struct StaticInstrumentCatalog {
    instruments: HashMap<Symbol, InstrumentId>,
}

impl StaticInstrumentCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from symbols, each its own instrument reference.
    #[must_use]
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let instruments = symbols
            .into_iter()
            .map(|s| {
                let symbol = Symbol::new(s);
                let id = InstrumentId::new(symbol.as_str());
                (symbol, id)
            })
            .collect();
        Self { instruments }
    }

    /// Register a symbol with an explicit instrument reference.
    pub fn register(&mut self, symbol: Symbol, instrument_id: InstrumentId) {
        self.instruments.insert(symbol, instrument_id);
    }
}

impl InstrumentCatalog for StaticInstrumentCatalog {
    fn resolve(&self, symbol: &Symbol) -> Option<InstrumentId> {
        self.instruments.get(symbol).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_symbol() {
        let catalog = StaticInstrumentCatalog::from_symbols(["AAPL", "MSFT"]);
        let id = catalog.resolve(&Symbol::new("aapl"));
        assert_eq!(id.unwrap().as_str(), "AAPL");
    }

    #[test]
    fn unknown_symbol_is_none() {
        let catalog = StaticInstrumentCatalog::from_symbols(["AAPL"]);
        assert!(catalog.resolve(&Symbol::new("TSLA")).is_none());
    }

    #[test]
    fn register_custom_reference() {
        let mut catalog = StaticInstrumentCatalog::new();
        catalog.register(Symbol::new("BTC-USD"), InstrumentId::new("crypto:BTC-USD"));

        let id = catalog.resolve(&Symbol::new("BTC-USD"));
        assert_eq!(id.unwrap().as_str(), "crypto:BTC-USD");
    }
}
