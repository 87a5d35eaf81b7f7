//! Venue symbol → canonical base asset
//!
//! Each DEX spells the same perpetual differently (`BTC-PERP`,
//! `BTC-USD-PERP`, `BTCUSDT`, `BTC/USDC:USDC`). Quotes are grouped by the
//! bare base asset, so every source maps its tickers through here.

/// Quote-currency and contract suffixes, longest first.
const SUFFIXES: &[&str] = &[
    "/USDC:USDC",
    "/USDT:USDT",
    "-USDT-SWAP",
    "-USD-PERP",
    "-USDC-PERP",
    "-USDT-PERP",
    "/USDC",
    "/USDT",
    "/USD",
    "-PERP",
    "_PERP",
    "-USDC",
    "-USDT",
    "-USD",
    "_USDC",
    "_USDT",
    "_USD",
    "USDC",
    "USDT",
];

/// Map a venue ticker to its base asset, or `None` for garbage.
///
/// Multiplier prefixes (`kPEPE`, `1000PEPE`) are part of the asset and kept.
pub fn canonical_symbol(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.is_ascii() {
        return None;
    }

    let upper = trimmed.to_uppercase();
    let mut base_len = upper.len();
    for suffix in SUFFIXES {
        if upper.len() > suffix.len() && upper.ends_with(suffix) {
            base_len = upper.len() - suffix.len();
            break;
        }
    }
    let base = &trimmed[..base_len];

    if !base.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    // Hyperliquid-style "k" (thousand) prefix stays lowercase
    let mut chars = base.chars();
    match (chars.next(), chars.as_str()) {
        (Some('k'), rest)
            if !rest.is_empty()
                && rest.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) =>
        {
            Some(format!("k{}", rest))
        }
        _ => Some(base.to_uppercase()),
    }
}
