//! Reference to something that can be bought.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{CourseId, JourneyId, Money};

use super::{Course, Journey};

/// A purchasable catalog entry: a single course or a journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CatalogItem {
    Course(CourseId),
    Journey(JourneyId),
}

impl CatalogItem {
    /// Storage/wire name of the item kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogItem::Course(_) => "course",
            CatalogItem::Journey(_) => "journey",
        }
    }

    /// The raw identifier as a UUID string.
    pub fn id_string(&self) -> String {
        match self {
            CatalogItem::Course(id) => id.to_string(),
            CatalogItem::Journey(id) => id.to_string(),
        }
    }
}

impl fmt::Display for CatalogItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id_string())
    }
}

/// Snapshot of a catalog item at the moment it was priced.
///
/// Carts and payments keep this snapshot so later catalog edits do not change
/// what the buyer agreed to pay or what access they receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedItem {
    pub item: CatalogItem,
    pub title: String,
    pub unit_price: Money,
    pub access_days: Option<u32>,
}

impl From<&Course> for PricedItem {
    fn from(course: &Course) -> Self {
        Self {
            item: CatalogItem::Course(course.id),
            title: course.title.clone(),
            unit_price: course.price.clone(),
            access_days: course.access_days,
        }
    }
}

impl From<&Journey> for PricedItem {
    fn from(journey: &Journey) -> Self {
        Self {
            item: CatalogItem::Journey(journey.id),
            title: journey.title.clone(),
            unit_price: journey.price.clone(),
            access_days: journey.access_days,
        }
    }
}
