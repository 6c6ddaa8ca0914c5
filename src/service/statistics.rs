use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::models::contracts::{self, Status};

const UPCOMING_WINDOW_DAYS: i64 = 30;

/// Aggregate figures over the active contracts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractStatistics {
    pub total_contracts: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    /// Sum of `total_payment` over contracts that are not cancelled.
    pub total_revenue: Decimal,
    pub total_advances: Decimal,
    pub average_contract_value: Decimal,
    pub average_audience: Decimal,
    pub upcoming_30_days: usize,
}

impl ContractStatistics {
    pub fn from_contracts(contracts: &[contracts::Model], today: NaiveDate) -> Self {
        let mut by_status: BTreeMap<&'static str, usize> = [
            Status::Pending,
            Status::Confirmed,
            Status::InProgress,
            Status::Completed,
            Status::Cancelled,
        ]
        .into_iter()
        .map(|status| (status.as_str(), 0))
        .collect();

        let mut total_revenue = Decimal::ZERO;
        let mut total_advances = Decimal::ZERO;
        let mut billed = 0usize;
        let mut audience_sum = 0i64;
        let mut upcoming_30_days = 0;

        for contract in contracts {
            *by_status.entry(contract.status.as_str()).or_default() += 1;
            audience_sum += i64::from(contract.audience_size);

            if contract.status != Status::Cancelled {
                total_revenue += contract.total_payment;
                total_advances += contract.advance_payment;
                billed += 1;
            }

            let days = (contract.event_date - today).num_days();
            if contract.status.blocks_schedule() && (0..=UPCOMING_WINDOW_DAYS).contains(&days) {
                upcoming_30_days += 1;
            }
        }

        Self {
            total_contracts: contracts.len(),
            by_status,
            total_revenue,
            total_advances,
            average_contract_value: average(total_revenue, billed),
            average_audience: average(Decimal::from(audience_sum), contracts.len()),
            upcoming_30_days,
        }
    }
}

fn average(sum: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (sum / Decimal::from(count)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
