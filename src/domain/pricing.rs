//! Products, option items and price lists.
//!
//! A price list item overrides the base price of one option item with
//! either a fixed price or a multiplier. The backend sends both as nullable
//! fields; decoding rejects payloads that set both or neither, so
//! [`PriceRule`] can never hold an ambiguous override.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionItem {
    pub id: String,
    pub label: String,
    pub base_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOption {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<OptionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub group: String,
    pub base_price: Decimal,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub options: Vec<ProductOption>,
}

fn default_true() -> bool {
    true
}

impl Product {
    pub fn option_items(&self) -> impl Iterator<Item = &OptionItem> {
        self.options.iter().flat_map(|option| option.items.iter())
    }

    pub fn find_option_item(&self, option_item_id: &str) -> Option<&OptionItem> {
        self.option_items().find(|item| item.id == option_item_id)
    }

    /// Base price of the ordered line: the option item's price when one is chosen
    pub fn base_price_for(&self, option_item_id: Option<&str>) -> Option<Decimal> {
        match option_item_id {
            Some(id) => self.find_option_item(id).map(|item| item.base_price),
            None => Some(self.base_price),
        }
    }
}

/// Override applied to an option item's base price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceRule {
    Fixed(Decimal),
    Multiplier(Decimal),
}

impl PriceRule {
    pub fn apply(self, base: Decimal) -> Decimal {
        match self {
            PriceRule::Fixed(price) => price,
            PriceRule::Multiplier(factor) => (base * factor)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PriceListItemWire", into = "PriceListItemWire")]
pub struct PriceListItem {
    pub option_item_id: String,
    pub rule: PriceRule,
}

/// Wire shape: `price` and `multiplier` are mutually exclusive
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceListItemWire {
    option_item_id: String,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    multiplier: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceRuleError {
    #[error("price list item {0} sets both a price and a multiplier")]
    Both(String),
    #[error("price list item {0} sets neither a price nor a multiplier")]
    Neither(String),
    #[error("price list item {0} has a negative value")]
    Negative(String),
}

impl TryFrom<PriceListItemWire> for PriceListItem {
    type Error = PriceRuleError;

    fn try_from(wire: PriceListItemWire) -> Result<Self, Self::Error> {
        let rule = match (wire.price, wire.multiplier) {
            (Some(_), Some(_)) => return Err(PriceRuleError::Both(wire.option_item_id)),
            (None, None) => return Err(PriceRuleError::Neither(wire.option_item_id)),
            (Some(price), None) => PriceRule::Fixed(price),
            (None, Some(factor)) => PriceRule::Multiplier(factor),
        };
        PriceListItem::new(wire.option_item_id, rule)
    }
}

impl From<PriceListItem> for PriceListItemWire {
    fn from(item: PriceListItem) -> Self {
        let (price, multiplier) = match item.rule {
            PriceRule::Fixed(price) => (Some(price), None),
            PriceRule::Multiplier(factor) => (None, Some(factor)),
        };
        PriceListItemWire {
            option_item_id: item.option_item_id,
            price,
            multiplier,
        }
    }
}

impl PriceListItem {
    pub fn new(option_item_id: String, rule: PriceRule) -> Result<Self, PriceRuleError> {
        let value = match rule {
            PriceRule::Fixed(v) | PriceRule::Multiplier(v) => v,
        };
        if value.is_sign_negative() {
            return Err(PriceRuleError::Negative(option_item_id));
        }
        Ok(Self {
            option_item_id,
            rule,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Vec<PriceListItem>,
    /// Users (clients or distributors) this list applies to
    #[serde(default)]
    pub assigned_user_ids: Vec<String>,
}

impl PriceList {
    pub fn rule_for(&self, option_item_id: &str) -> Option<PriceRule> {
        self.items
            .iter()
            .find(|item| item.option_item_id == option_item_id)
            .map(|item| item.rule)
    }

    /// Price of an option item after this list's override, if any
    pub fn effective_price(&self, option_item_id: &str, base: Decimal) -> Decimal {
        self.rule_for(option_item_id)
            .map(|rule| rule.apply(base))
            .unwrap_or(base)
    }

    /// Insert or replace the override for one option item
    pub fn upsert(&mut self, item: PriceListItem) {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.option_item_id == item.option_item_id)
        {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    pub fn remove(&mut self, option_item_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.option_item_id != option_item_id);
        self.items.len() != before
    }
}

/// Unit price for an order line, applying an optional price list
pub fn unit_price(
    product: &Product,
    option_item_id: Option<&str>,
    price_list: Option<&PriceList>,
) -> Option<Decimal> {
    let base = product.base_price_for(option_item_id)?;
    Some(match (price_list, option_item_id) {
        (Some(list), Some(id)) => list.effective_price(id, base),
        _ => base,
    })
}

/// Payload to create a price list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPriceList {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tray() -> Product {
        Product {
            id: "p1".into(),
            name: "Canapé tray".into(),
            group: "Cold".into(),
            base_price: Decimal::new(3000, 2),
            unit: Some("tray".into()),
            active: true,
            options: vec![ProductOption {
                id: "size".into(),
                name: "Size".into(),
                items: vec![
                    OptionItem {
                        id: "small".into(),
                        label: "Small".into(),
                        base_price: Decimal::new(2000, 2),
                    },
                    OptionItem {
                        id: "large".into(),
                        label: "Large".into(),
                        base_price: Decimal::new(4550, 2),
                    },
                ],
            }],
        }
    }

    #[test]
    fn both_price_and_multiplier_is_rejected() {
        let err = serde_json::from_value::<PriceListItem>(json!({
            "optionItemId": "small", "price": 10, "multiplier": 1.2
        }))
        .unwrap_err();
        assert!(err.to_string().contains("both a price and a multiplier"));
    }

    #[test]
    fn neither_price_nor_multiplier_is_rejected() {
        let err = serde_json::from_value::<PriceListItem>(json!({
            "optionItemId": "small", "price": null
        }))
        .unwrap_err();
        assert!(err.to_string().contains("neither"));
    }

    #[test]
    fn serializes_only_the_populated_field() {
        let item = PriceListItem::new("large".into(), PriceRule::Multiplier(Decimal::new(9, 1)))
            .unwrap();
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["optionItemId"], "large");
        assert!(value["price"].is_null());
        assert!(!value["multiplier"].is_null());
    }

    #[test]
    fn multiplier_rounds_half_away_from_zero() {
        // 45.50 * 0.95 = 43.225
        let rule = PriceRule::Multiplier(Decimal::new(95, 2));
        assert_eq!(rule.apply(Decimal::new(4550, 2)), Decimal::new(4323, 2));
    }

    #[test]
    fn unit_price_uses_list_override_for_option_items() {
        let product = tray();
        let mut list = PriceList {
            id: "pl1".into(),
            name: "Wholesale".into(),
            description: None,
            items: vec![],
            assigned_user_ids: vec![],
        };
        list.upsert(PriceListItem::new("small".into(), PriceRule::Fixed(Decimal::new(1500, 2))).unwrap());
        assert_eq!(
            unit_price(&product, Some("small"), Some(&list)),
            Some(Decimal::new(1500, 2))
        );
        assert_eq!(
            unit_price(&product, Some("large"), Some(&list)),
            Some(Decimal::new(4550, 2))
        );
        assert_eq!(unit_price(&product, None, Some(&list)), Some(Decimal::new(3000, 2)));
        assert_eq!(unit_price(&product, Some("missing"), None), None);
    }

    #[test]
    fn upsert_replaces_existing_rule() {
        let mut list = PriceList {
            id: "pl1".into(),
            name: "A".into(),
            description: None,
            items: vec![],
            assigned_user_ids: vec![],
        };
        list.upsert(PriceListItem::new("x".into(), PriceRule::Fixed(Decimal::ONE)).unwrap());
        list.upsert(PriceListItem::new("x".into(), PriceRule::Multiplier(Decimal::TWO)).unwrap());
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.rule_for("x"), Some(PriceRule::Multiplier(Decimal::TWO)));
        assert!(list.remove("x"));
        assert!(!list.remove("x"));
    }
}
