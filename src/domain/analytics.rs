//! Analytics aggregates: revenue by product group and customer KPIs.
//!
//! The backend computes these for the real system. The same functions are
//! used by the demo backend and by views that reshape an already fetched
//! order list.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::order::Order;
use super::status::DeliveryStatus;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

impl AnalyticsQuery {
    /// Inclusive on both ends; open ends match everything
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueByGroup {
    pub group: String,
    pub revenue: Decimal,
    pub quantity: u64,
    pub orders: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerKpi {
    pub client_id: String,
    pub client_name: String,
    pub order_count: u32,
    pub revenue: Decimal,
    pub average_order_value: Decimal,
    #[serde(default)]
    pub last_order_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_revenue: Decimal,
    pub order_count: u32,
    pub average_order_value: Decimal,
    /// Delivered orders over non-cancelled orders, 0.0..=1.0
    pub delivered_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub summary: AnalyticsSummary,
    #[serde(default)]
    pub revenue_by_group: Vec<RevenueByGroup>,
    #[serde(default)]
    pub customers: Vec<CustomerKpi>,
}

fn average(total: Decimal, count: u32) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (total / Decimal::from(count)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Revenue of an order counting only non-cancelled lines
fn order_revenue(order: &Order) -> Decimal {
    if order.is_cancelled() {
        Decimal::ZERO
    } else {
        order.recompute_total()
    }
}

pub fn revenue_by_group(orders: &[Order]) -> Vec<RevenueByGroup> {
    let mut groups: HashMap<&str, RevenueByGroup> = HashMap::new();
    for order in orders.iter().filter(|o| !o.is_cancelled()) {
        let mut seen_in_order: Vec<&str> = Vec::new();
        for item in order.items.iter().filter(|i| !i.is_cancelled()) {
            let entry = groups
                .entry(item.product_group.as_str())
                .or_insert_with(|| RevenueByGroup {
                    group: item.product_group.clone(),
                    revenue: Decimal::ZERO,
                    quantity: 0,
                    orders: 0,
                });
            entry.revenue += item.line_total();
            entry.quantity += u64::from(item.quantity);
            if !seen_in_order.contains(&item.product_group.as_str()) {
                entry.orders += 1;
                seen_in_order.push(item.product_group.as_str());
            }
        }
    }
    let mut result: Vec<_> = groups.into_values().collect();
    result.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.group.cmp(&b.group)));
    result
}

pub fn customer_kpis(orders: &[Order]) -> Vec<CustomerKpi> {
    let mut customers: HashMap<&str, CustomerKpi> = HashMap::new();
    for order in orders.iter().filter(|o| !o.is_cancelled()) {
        let entry = customers
            .entry(order.client.id.as_str())
            .or_insert_with(|| CustomerKpi {
                client_id: order.client.id.clone(),
                client_name: order.client.name.clone(),
                order_count: 0,
                revenue: Decimal::ZERO,
                average_order_value: Decimal::ZERO,
                last_order_date: None,
            });
        entry.order_count += 1;
        entry.revenue += order_revenue(order);
        entry.last_order_date = entry.last_order_date.max(Some(order.delivery_date));
    }
    let mut result: Vec<_> = customers
        .into_values()
        .map(|mut kpi| {
            kpi.average_order_value = average(kpi.revenue, kpi.order_count);
            kpi
        })
        .collect();
    result.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.client_name.cmp(&b.client_name))
    });
    result
}

pub fn summarize(orders: &[Order]) -> AnalyticsSummary {
    let live: Vec<&Order> = orders.iter().filter(|o| !o.is_cancelled()).collect();
    let total_revenue: Decimal = live.iter().map(|o| order_revenue(o)).sum();
    let order_count = live.len() as u32;
    let delivered = live
        .iter()
        .filter(|o| o.delivery_status == DeliveryStatus::Delivered)
        .count();
    AnalyticsSummary {
        total_revenue,
        order_count,
        average_order_value: average(total_revenue, order_count),
        delivered_ratio: if live.is_empty() {
            0.0
        } else {
            delivered as f64 / live.len() as f64
        },
    }
}

/// Full report for the orders whose delivery date falls in the query range
pub fn build_report(orders: &[Order], query: &AnalyticsQuery) -> AnalyticsReport {
    let in_range: Vec<Order> = orders
        .iter()
        .filter(|o| query.contains(o.delivery_date))
        .cloned()
        .collect();
    AnalyticsReport {
        summary: summarize(&in_range),
        revenue_by_group: revenue_by_group(&in_range),
        customers: customer_kpis(&in_range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::tests::{item, order};
    use crate::domain::status::ProductionStatus;

    #[test]
    fn revenue_by_group_skips_cancelled_lines_and_sorts_descending() {
        let mut big = item("b", "Hot", ProductionStatus::Completed);
        big.quantity = 40;
        let orders = vec![order(vec![
            item("a", "Pastry", ProductionStatus::Pending),
            big,
            item("c", "Cold", ProductionStatus::Cancelled),
        ])];
        let groups = revenue_by_group(&orders);
        let names: Vec<_> = groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, ["Hot", "Pastry"]);
        assert_eq!(groups[0].revenue, Decimal::new(10000, 2));
        assert_eq!(groups[0].orders, 1);
    }

    #[test]
    fn customer_kpis_average_per_order() {
        let mut first = order(vec![item("a", "Hot", ProductionStatus::Pending)]);
        first.id = "o-1".into();
        let mut second = order(vec![
            item("b", "Hot", ProductionStatus::Pending),
            item("c", "Hot", ProductionStatus::Pending),
        ]);
        second.id = "o-2".into();
        second.delivery_date = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let kpis = customer_kpis(&[first, second]);
        assert_eq!(kpis.len(), 1);
        assert_eq!(kpis[0].order_count, 2);
        assert_eq!(kpis[0].revenue, Decimal::new(7500, 2));
        assert_eq!(kpis[0].average_order_value, Decimal::new(3750, 2));
        assert_eq!(kpis[0].last_order_date, NaiveDate::from_ymd_opt(2026, 4, 1));
    }

    #[test]
    fn summary_ratio_ignores_cancelled_orders() {
        let mut delivered = order(vec![item("a", "Hot", ProductionStatus::Completed)]);
        delivered.delivery_status = DeliveryStatus::Delivered;
        let open = order(vec![item("b", "Hot", ProductionStatus::Pending)]);
        let cancelled = order(vec![item("c", "Hot", ProductionStatus::Cancelled)]);
        let summary = summarize(&[delivered, open, cancelled]);
        assert_eq!(summary.order_count, 2);
        assert!((summary.delivered_ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(summarize(&[]).average_order_value, Decimal::ZERO);
    }

    #[test]
    fn query_range_is_inclusive() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let q = AnalyticsQuery {
            from: Some(day),
            to: Some(day),
        };
        assert!(q.contains(day));
        assert!(!q.contains(day.succ_opt().unwrap()));
        assert!(AnalyticsQuery::default().contains(day));
    }
}
