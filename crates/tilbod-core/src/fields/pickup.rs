//! Pickup and delivery detection from offer keywords

use crate::models::PickupDelivery;

const PICKUP_TERMS: &[&str] = &[
    "sækja",
    "sækir",
    "sótt",
    "afhending",
    "pickup",
    "pick-up",
    "take away",
    "takeaway",
    "collection",
];

const DELIVERY_TERMS: &[&str] = &[
    "heimsending",
    "heimsent",
    "sending",
    "sent heim",
    "delivery",
    "delivered",
];

/// Whether the offer is for pickup, delivery or both
pub fn extract_pickup_delivery(text: &str) -> Option<PickupDelivery> {
    let lower = text.to_lowercase();
    let pickup = PICKUP_TERMS.iter().any(|term| lower.contains(term));
    let delivery = DELIVERY_TERMS.iter().any(|term| lower.contains(term));

    match (pickup, delivery) {
        (true, true) => Some(PickupDelivery::Both),
        (true, false) => Some(PickupDelivery::Pickup),
        (false, true) => Some(PickupDelivery::Delivery),
        (false, false) => None,
    }
}
