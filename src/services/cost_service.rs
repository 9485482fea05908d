use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::itinerary::BudgetTier;

#[derive(Debug, Serialize, Clone, Copy)]
pub struct CostBreakdown {
    pub accommodation: u32,
    pub food: u32,
    pub activities: u32,
    pub transport: u32,
}

impl CostBreakdown {
    fn daily_total(&self) -> u32 {
        self.accommodation + self.food + self.activities + self.transport
    }
}

#[derive(Debug, Serialize, Clone, Copy)]
pub struct TierEstimate {
    pub daily: u32,
    pub total: u32,
    pub breakdown: CostBreakdown,
}

fn daily_costs(tier: BudgetTier) -> CostBreakdown {
    match tier {
        BudgetTier::Budget => CostBreakdown {
            accommodation: 30,
            food: 20,
            activities: 15,
            transport: 10,
        },
        BudgetTier::Moderate => CostBreakdown {
            accommodation: 80,
            food: 40,
            activities: 30,
            transport: 25,
        },
        BudgetTier::Luxury => CostBreakdown {
            accommodation: 200,
            food: 100,
            activities: 80,
            transport: 50,
        },
    }
}

/// Rough per-person trip cost for every tier, scaled by day count.
pub fn estimate_trip_cost(days: u32) -> BTreeMap<String, TierEstimate> {
    let mut estimates = BTreeMap::new();
    for tier in [BudgetTier::Budget, BudgetTier::Moderate, BudgetTier::Luxury] {
        let breakdown = daily_costs(tier);
        let daily = breakdown.daily_total();
        estimates.insert(
            tier.as_str().to_lowercase(),
            TierEstimate {
                daily,
                total: daily * days,
                breakdown,
            },
        );
    }
    estimates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_totals() {
        assert_eq!(daily_costs(BudgetTier::Budget).daily_total(), 75);
        assert_eq!(daily_costs(BudgetTier::Moderate).daily_total(), 175);
        assert_eq!(daily_costs(BudgetTier::Luxury).daily_total(), 430);
    }

    #[test]
    fn test_totals_scale_with_days() {
        let estimates = estimate_trip_cost(5);
        assert_eq!(estimates["budget"].total, 375);
        assert_eq!(estimates["moderate"].total, 875);
        assert_eq!(estimates["luxury"].total, 2150);
        assert_eq!(estimates.len(), 3);
    }
}
