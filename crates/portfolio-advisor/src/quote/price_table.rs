//! Reference prices the synthetic generator perturbs.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Used for any symbol missing from the table
pub const DEFAULT_ESTIMATED_PRICE: Decimal = dec!(150);

/// Estimated price for a symbol, or `None` when it is not tabulated
pub fn lookup(symbol: &str) -> Option<Decimal> {
    let price = match symbol {
        // Core ETFs
        "SPLG" => dec!(106.75),
        "SPY" => dec!(585.23),
        "QQQ" => dec!(508.45),
        "VTI" => dec!(278.34),
        "VOO" => dec!(538.75),
        "IVV" => dec!(587.34),
        "SCHX" => dec!(61.23),
        "ITOT" => dec!(115.67),
        "VEA" => dec!(49.87),
        "VWO" => dec!(42.15),

        // Bond ETFs
        "AGG" => dec!(98.45),
        "BND" => dec!(71.23),
        "TLT" => dec!(92.34),
        "IEF" => dec!(98.67),
        "LQD" => dec!(112.45),

        // Sector ETFs
        "IYR" => dec!(89.34),
        "VNQ" => dec!(87.23),
        "XLRE" => dec!(45.67),
        "IYZ" => dec!(78.34),
        "VOX" => dec!(89.45),
        "XLC" => dec!(67.89),
        "IYK" => dec!(145.67),
        "VDC" => dec!(198.34),
        "XLP" => dec!(78.34),
        "IYC" => dec!(89.45),
        "VCR" => dec!(234.56),
        "XLY" => dec!(167.89),
        "IYE" => dec!(45.67),
        "VDE" => dec!(98.34),
        "XLE" => dec!(89.45),
        "IYF" => dec!(67.89),
        "VFH" => dec!(89.45),
        "XLF" => dec!(43.21),
        "IYJ" => dec!(123.45),
        "VIS" => dec!(178.90),
        "XLI" => dec!(134.56),
        "IYM" => dec!(78.90),
        "VAW" => dec!(189.23),
        "XLB" => dec!(89.45),
        "IYH" => dec!(267.89),
        "VHT" => dec!(245.67),
        "XLV" => dec!(134.56),
        "IDU" => dec!(67.89),
        "VPU" => dec!(156.78),
        "XLU" => dec!(69.45),
        "IYW" => dec!(134.56),
        "VGT" => dec!(543.21),
        "XLK" => dec!(215.45),
        "ARKK" => dec!(45.67),

        // Individual stocks
        "AAPL" => dec!(233.45),
        "MSFT" => dec!(450.23),
        "GOOGL" => dec!(178.89),
        "AMZN" => dec!(218.76),
        "NVDA" => dec!(138.67),
        "META" => dec!(590.45),
        "TSLA" => dec!(381.23),
        "BRK.B" => dec!(487.90),
        "JPM" => dec!(234.56),
        "V" => dec!(289.34),
        "UNH" => dec!(634.78),
        "JNJ" => dec!(178.45),
        "WMT" => dec!(89.23),
        "PG" => dec!(167.89),
        "MA" => dec!(523.67),
        "HD" => dec!(412.34),
        "DIS" => dec!(123.89),
        "BAC" => dec!(45.67),
        "NFLX" => dec!(567.89),
        "ADBE" => dec!(634.23),
        "CRM" => dec!(345.67),
        "PYPL" => dec!(78.90),
        "INTC" => dec!(56.78),
        "AMD" => dec!(189.45),
        _ => return None,
    };
    Some(price)
}

/// Estimated price with the default applied
pub fn estimated_price(symbol: &str) -> Decimal {
    lookup(symbol).unwrap_or(DEFAULT_ESTIMATED_PRICE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_symbols() {
        assert_eq!(estimated_price("SPLG"), dec!(106.75));
        assert_eq!(estimated_price("BRK.B"), dec!(487.90));
        assert_eq!(lookup("ZZZZ"), None);
        assert_eq!(estimated_price("ZZZZ"), dec!(150));
    }
}
