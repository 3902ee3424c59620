//! Raw token amounts and their human-readable (UI) form
//!
//! Ledger balances are raw `u64` units. Display and logging use
//! `rust_decimal` scaled by the mint's decimals so no floating-point
//! rounding ever enters an amount.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Lamports in one whole native unit
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Convert raw units to a UI amount, e.g. `1_500_000` with 6 decimals → `1.5`.
///
/// Returns `None` if `decimals` exceeds the decimal type's max scale (28).
pub fn to_ui_amount(raw: u64, decimals: u8) -> Option<Decimal> {
    Decimal::try_from_i128_with_scale(raw as i128, decimals as u32).ok()
}

/// Convert a UI amount back to raw units.
///
/// Fractional digits beyond `decimals` are truncated. Returns `None` for
/// negative values or on overflow.
pub fn from_ui_amount(ui: Decimal, decimals: u8) -> Option<u64> {
    if ui.is_sign_negative() {
        return None;
    }
    let scale = 10u64.checked_pow(decimals as u32)?;
    ui.checked_mul(Decimal::from(scale))?.trunc().to_u64()
}
