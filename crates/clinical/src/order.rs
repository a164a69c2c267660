use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use medrec_core::{EntityBase, LocalId};

use crate::kinds::{DRUG_ORDER, ORDER, ORDER_FREQUENCY};

/// What an order does to the patient's active orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderAction {
    #[default]
    New,
    Revise,
    Discontinue,
    Renew,
}

/// An instruction to perform a clinical action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(flatten)]
    base: EntityBase,
    #[serde(default)]
    order_number: Option<String>,
    #[serde(default)]
    action: OrderAction,
    #[serde(default)]
    date_activated: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new() -> Self {
        Self {
            base: EntityBase::new(),
            order_number: None,
            action: OrderAction::New,
            date_activated: None,
        }
    }

    pub fn with_local_id(local_id: LocalId) -> Self {
        Self {
            base: EntityBase::with_local_id(local_id),
            ..Self::new()
        }
    }

    pub fn with_order_number(mut self, order_number: impl Into<String>) -> Self {
        self.order_number = Some(order_number.into());
        self
    }

    pub fn activated_at(mut self, when: DateTime<Utc>) -> Self {
        self.date_activated = Some(when);
        self
    }

    pub fn with_action(mut self, action: OrderAction) -> Self {
        self.action = action;
        self
    }

    pub fn order_number(&self) -> Option<&str> {
        self.order_number.as_deref()
    }

    pub fn action(&self) -> OrderAction {
        self.action
    }

    pub fn date_activated(&self) -> Option<DateTime<Utc>> {
        self.date_activated
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::new()
    }
}

impl_record!(Order, ORDER, base);

/// An order for a medication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugOrder {
    #[serde(flatten)]
    order: Order,
    #[serde(default)]
    dose: Option<f64>,
    #[serde(default)]
    dose_units: Option<String>,
    /// Local id of the [`OrderFrequency`] the dose is taken at.
    #[serde(default)]
    frequency: Option<LocalId>,
}

impl DrugOrder {
    pub fn new() -> Self {
        Self::from_order(Order::new())
    }

    pub fn with_local_id(local_id: LocalId) -> Self {
        Self::from_order(Order::with_local_id(local_id))
    }

    pub fn from_order(order: Order) -> Self {
        Self {
            order,
            dose: None,
            dose_units: None,
            frequency: None,
        }
    }

    pub fn with_dose(mut self, dose: f64, units: impl Into<String>) -> Self {
        self.dose = Some(dose);
        self.dose_units = Some(units.into());
        self
    }

    pub fn taken_at(mut self, frequency: LocalId) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// The order part of this record.
    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn dose(&self) -> Option<f64> {
        self.dose
    }

    pub fn dose_units(&self) -> Option<&str> {
        self.dose_units.as_deref()
    }

    pub fn frequency(&self) -> Option<LocalId> {
        self.frequency
    }
}

impl Default for DrugOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl_record!(DrugOrder, DRUG_ORDER, order.base);

/// How often a medication is taken, e.g. "twice daily".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFrequency {
    #[serde(flatten)]
    base: EntityBase,
    #[serde(default)]
    frequency_per_day: Option<f64>,
}

impl OrderFrequency {
    pub fn new() -> Self {
        Self {
            base: EntityBase::new(),
            frequency_per_day: None,
        }
    }

    pub fn per_day(mut self, frequency_per_day: f64) -> Self {
        self.frequency_per_day = Some(frequency_per_day);
        self
    }

    pub fn frequency_per_day(&self) -> Option<f64> {
        self.frequency_per_day
    }
}

impl Default for OrderFrequency {
    fn default() -> Self {
        Self::new()
    }
}

impl_record!(OrderFrequency, ORDER_FREQUENCY, base);

#[cfg(test)]
mod tests {
    use medrec_core::{Entity, Record};

    use super::*;

    fn id(raw: u32) -> LocalId {
        LocalId::new(raw).unwrap()
    }

    #[test]
    fn order_and_drug_order_with_same_uuid_are_equal_both_ways() {
        let order = Order::with_local_id(id(21));
        let mut drug = DrugOrder::with_local_id(id(21));
        drug.set_uuid(order.uuid().map(str::to_owned));

        assert_eq!(drug, order);
        assert_eq!(order, drug);
    }

    #[test]
    fn order_and_frequency_with_same_uuid_differ_both_ways() {
        let order = Order::with_local_id(id(21));
        let mut frequency = OrderFrequency::new();
        frequency.set_uuid(order.uuid().map(str::to_owned));

        assert_ne!(frequency, order);
        assert_ne!(order, frequency);
    }

    #[test]
    fn drug_order_reports_its_own_kind() {
        let drug = DrugOrder::new().with_dose(500.0, "mg").taken_at(id(3));
        assert_eq!(drug.kind().name(), "DrugOrder");
        assert_eq!(drug.kind().parent().map(|k| k.name()), Some("Order"));
        assert_eq!(drug.dose(), Some(500.0));
        assert_eq!(drug.dose_units(), Some("mg"));
        assert_eq!(drug.frequency(), Some(id(3)));
    }

    #[test]
    fn drug_order_renders_with_subtype_name() {
        let mut drug = DrugOrder::new();
        drug.set_uuid(Some("abc".to_string()));
        assert!(drug.to_string().starts_with("DrugOrder[hashCode="));
        assert!(drug.to_string().ends_with(",uuid=abc]"));
    }

    #[test]
    fn order_builder_sets_details() {
        let when = Utc::now();
        let order = Order::new()
            .with_order_number("ORD-1")
            .with_action(OrderAction::Renew)
            .activated_at(when);

        assert_eq!(order.order_number(), Some("ORD-1"));
        assert_eq!(order.action(), OrderAction::Renew);
        assert_eq!(order.date_activated(), Some(when));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: an order and a drug order agree on equality in both directions,
            /// and an order frequency never equals either.
            #[test]
            fn hierarchy_equality_is_symmetric(
                left in "[a-f0-9]{8}",
                right in "[a-f0-9]{8}",
            ) {
                let mut order = Order::new();
                order.set_uuid(Some(left.clone()));
                let mut drug = DrugOrder::new();
                drug.set_uuid(Some(right.clone()));
                let mut frequency = OrderFrequency::new();
                frequency.set_uuid(Some(left.clone()));

                prop_assert_eq!(order == drug, drug == order);
                prop_assert_eq!(order == drug, left == right);
                prop_assert!(order != frequency);
                prop_assert!(frequency != order);
            }
        }
    }
}
