use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::asset::Pricing;
use crate::domain::booking::PricingSnapshot;

/// GST applied to every booking, in percent.
pub const GST_PERCENT: i64 = 18;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub amount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub currency: String,
}

impl PriceBreakdown {
    pub fn snapshot(&self) -> PricingSnapshot {
        PricingSnapshot {
            base_amount: self.amount,
            tax: self.tax,
            total_amount: self.total,
            currency: self.currency.clone(),
        }
    }
}

/// Prices one unit of `duration_key`. Keys without a rate price at zero.
pub fn quote_for(pricing: &Pricing, duration_key: &str) -> PriceBreakdown {
    let amount = pricing.rate_for_key(duration_key).unwrap_or(Decimal::ZERO);
    let tax = tax_on(amount);

    PriceBreakdown { amount, tax, total: amount + tax, currency: pricing.currency.clone() }
}

/// GST rounded to a whole unit, halves away from zero.
pub fn tax_on(amount: Decimal) -> Decimal {
    (amount * Decimal::new(GST_PERCENT, 2))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

pub fn currency_symbol(currency: &str) -> String {
    match currency.trim().to_ascii_uppercase().as_str() {
        "INR" => "₹".to_string(),
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        other => format!("{other} "),
    }
}

pub fn format_money(amount: Decimal, currency: &str) -> String {
    format!("{}{}", currency_symbol(currency), amount.normalize())
}

/// Headline price for a space listing: hourly, else daily, else on request.
pub fn price_label(pricing: &Pricing) -> String {
    use crate::domain::booking::BookingDuration::{Daily, Hourly};

    if let Some(hourly) = pricing.rate(Hourly) {
        return format!("{}/hr", format_money(hourly, &pricing.currency));
    }
    if let Some(daily) = pricing.rate(Daily) {
        return format!("{}/day", format_money(daily, &pricing.currency));
    }
    "Price on request".to_string()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{format_money, price_label, quote_for, tax_on};
    use crate::domain::asset::Pricing;

    fn pricing() -> Pricing {
        Pricing {
            hourly: Some(Decimal::from(500)),
            daily: Some(Decimal::from(3_000)),
            weekly: None,
            monthly: Some(Decimal::from(45_000)),
            currency: "INR".to_string(),
        }
    }

    #[test]
    fn quote_adds_eighteen_percent_gst() {
        let quote = quote_for(&pricing(), "hourly");

        assert_eq!(quote.amount, Decimal::from(500));
        assert_eq!(quote.tax, Decimal::from(90));
        assert_eq!(quote.total, Decimal::from(590));
        assert_eq!(quote.currency, "INR");
    }

    #[test]
    fn tax_rounds_half_away_from_zero() {
        // 250 * 0.18 = 45, 75 * 0.18 = 13.5, 25 * 0.18 = 4.5
        assert_eq!(tax_on(Decimal::from(250)), Decimal::from(45));
        assert_eq!(tax_on(Decimal::from(75)), Decimal::from(14));
        assert_eq!(tax_on(Decimal::from(25)), Decimal::from(5));
        assert_eq!(tax_on(Decimal::new(1999, 1)), Decimal::from(36));
    }

    #[test]
    fn unpriced_duration_quotes_zero() {
        let quote = quote_for(&pricing(), "weekly");
        assert_eq!(quote.amount, Decimal::ZERO);
        assert_eq!(quote.tax, Decimal::ZERO);
        assert_eq!(quote.total, Decimal::ZERO);

        assert_eq!(quote_for(&pricing(), "not-a-duration").total, Decimal::ZERO);
    }

    #[test]
    fn price_label_prefers_hourly_then_daily() {
        assert_eq!(price_label(&pricing()), "₹500/hr");

        let daily_only = Pricing { hourly: None, ..pricing() };
        assert_eq!(price_label(&daily_only), "₹3000/day");

        let monthly_only = Pricing { hourly: None, daily: None, ..pricing() };
        assert_eq!(price_label(&monthly_only), "Price on request");
    }

    #[test]
    fn money_formatting_drops_trailing_zeros() {
        assert_eq!(format_money(Decimal::new(59000, 2), "INR"), "₹590");
        assert_eq!(format_money(Decimal::new(1250, 1), "usd"), "$125");
        assert_eq!(format_money(Decimal::from(10), "AED"), "AED 10");
    }
}
