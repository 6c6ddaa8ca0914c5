use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::FieldError;

/// Money inputs supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentTerms {
    pub hourly_rate: Decimal,
    pub advance_payment: Decimal,
    pub extra_cost: Decimal,
}

/// Money outputs stored on the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentSummary {
    pub total_payment: Decimal,
    pub remaining_payment: Decimal,
    pub percentage_paid: Decimal,
}

/// Largest amount a `NUMERIC(10,2)` money column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl PaymentTerms {
    /// Reject amounts a money column cannot store exactly, naming the first
    /// offending field.
    pub fn validate(&self) -> Result<(), FieldError> {
        let fields = [
            ("hourly_rate", self.hourly_rate),
            ("advance_payment", self.advance_payment),
            ("extra_cost", self.extra_cost),
        ];

        for (field, value) in fields {
            if value < Decimal::ZERO {
                return Err(FieldError::new(field, "Amount cannot be negative"));
            }
            if value > MAX_AMOUNT {
                return Err(FieldError::new(
                    field,
                    format!("Amount cannot exceed {MAX_AMOUNT}"),
                ));
            }
            if value.normalize().scale() > 2 {
                return Err(FieldError::new(
                    field,
                    "Amount cannot have more than 2 decimal places",
                ));
            }
        }
        Ok(())
    }

    /// Derive the payment summary for an event lasting `total_minutes`.
    ///
    /// The rate is charged per minute so a 3h30m booking at 1000/h costs 3500.
    pub fn summarize(&self, total_minutes: i32) -> Result<PaymentSummary, FieldError> {
        self.validate()?;

        let hours = Decimal::from(total_minutes) / Decimal::from(60);
        let total_payment = self
            .hourly_rate
            .checked_mul(hours)
            .and_then(|base| base.checked_add(self.extra_cost))
            .map(round_money)
            .filter(|total| *total <= MAX_AMOUNT)
            .ok_or_else(|| {
                FieldError::new(
                    "hourly_rate",
                    format!("Total payment would exceed the maximum of {MAX_AMOUNT}"),
                )
            })?;

        if self.advance_payment > total_payment {
            return Err(FieldError::new(
                "advance_payment",
                format!("Advance payment cannot exceed the total payment of {total_payment}"),
            ));
        }

        let remaining_payment = (total_payment - self.advance_payment).max(Decimal::ZERO);
        let percentage_paid = if total_payment.is_zero() {
            Decimal::ZERO
        } else {
            self.advance_payment
                .checked_div(total_payment)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .map(round_money)
                .ok_or_else(|| {
                    FieldError::new("advance_payment", "Percentage paid is out of range")
                })?
        };

        Ok(PaymentSummary {
            total_payment,
            remaining_payment,
            percentage_paid,
        })
    }
}

/// Total payment split over the audience, `None` without an audience.
pub fn cost_per_person(total_payment: Decimal, audience_size: i32) -> Option<Decimal> {
    (audience_size > 0).then(|| round_money(total_payment / Decimal::from(audience_size)))
}
