use std::collections::BTreeSet;

/// Crypto-asset services as listed in Art. 3(1)(16) MiCAR.
///
/// Variant order is the display order on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CryptoService {
    Custody,
    Transfer,
    OrderExecution,
    ExchangeFiat,
    ExchangeCrypto,
    ReceptionTransmission,
    PortfolioManagement,
    Placing,
    Advice,
    TradingPlatform,
}

impl CryptoService {
    pub const ALL: [CryptoService; 10] = [
        CryptoService::Custody,
        CryptoService::Transfer,
        CryptoService::OrderExecution,
        CryptoService::ExchangeFiat,
        CryptoService::ExchangeCrypto,
        CryptoService::ReceptionTransmission,
        CryptoService::PortfolioManagement,
        CryptoService::Placing,
        CryptoService::Advice,
        CryptoService::TradingPlatform,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CryptoService::Custody => "Custody & admin",
            CryptoService::Transfer => "Transfer services",
            CryptoService::OrderExecution => "Order execution",
            CryptoService::ExchangeFiat => "Exchange crypto/fiat",
            CryptoService::ExchangeCrypto => "Exchange crypto/crypto",
            CryptoService::ReceptionTransmission => "Reception & transmission",
            CryptoService::PortfolioManagement => "Portfolio mgmt",
            CryptoService::Placing => "Placing",
            CryptoService::Advice => "Advice",
            CryptoService::TradingPlatform => "Trading platform",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Classifies one free-text service description from the register.
    ///
    /// Rules are checked in order; the first match wins.
    pub fn classify(description: &str) -> Option<CryptoService> {
        let s = description.trim().to_lowercase();
        if s.is_empty() {
            return None;
        }

        let service = if s.contains("custody") || s.contains("administration") {
            CryptoService::Custody
        } else if s.contains("trading platform") || s.contains("operation") {
            CryptoService::TradingPlatform
        } else if s.contains("exchange") && s.contains("fund") {
            CryptoService::ExchangeFiat
        } else if s.contains("exchange") && s.contains("other") {
            CryptoService::ExchangeCrypto
        } else if s.contains("execution") {
            CryptoService::OrderExecution
        } else if s.contains("placing") {
            CryptoService::Placing
        } else if s.contains("reception") || s.contains("transmission") {
            CryptoService::ReceptionTransmission
        } else if s.contains("advice") {
            CryptoService::Advice
        } else if s.contains("portfolio") {
            CryptoService::PortfolioManagement
        } else if s.contains("transfer") {
            CryptoService::Transfer
        } else {
            return None;
        };
        Some(service)
    }
}

/// Parses a `|`-separated service list; each service appears at most once.
pub fn parse_services(codes: &str) -> BTreeSet<CryptoService> {
    codes.split('|').filter_map(CryptoService::classify).collect()
}
