//! # Station Routing
//!
//! Maps menu categories to the station that prepares them.
//!
//! ## How Routing Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Category tree                     Station                              │
//! │                                                                         │
//! │  drinks ──────────────────────────► Barista                            │
//! │  ├── hot drinks ──────────────────► Barista (inherited)                │
//! │  └── fresh juices ────────────────► Barista (inherited)                │
//! │  shisha ──────────────────────────► Shisha                             │
//! │  food ────────────────────────────► Kitchen                            │
//! │  └── sandwiches ──────────────────► Kitchen (inherited)                │
//! │                                                                         │
//! │  The category → station map is computed ONCE from the category table   │
//! │  and looked up per item. No tree walk happens per ticket line.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Category;

// =============================================================================
// Station
// =============================================================================

/// A preparation or service station with its own printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum Station {
    /// Front desk: receipts, reports, cash drawer.
    Cashier,
    /// Drinks of every kind.
    Barista,
    /// Shisha preparation.
    Shisha,
    /// Food.
    Kitchen,
}

impl Station {
    /// Lowercase label as stored and displayed.
    pub fn as_str(&self) -> &'static str {
        match self {
            Station::Cashier => "cashier",
            Station::Barista => "barista",
            Station::Shisha => "shisha",
            Station::Kitchen => "kitchen",
        }
    }

    /// Ticket heading for kitchen/cancellation tickets.
    pub fn ticket_heading(&self) -> &'static str {
        match self {
            Station::Cashier => "CASHIER",
            Station::Barista => "BARISTA ORDER",
            Station::Shisha => "SHISHA ORDER",
            Station::Kitchen => "KITCHEN ORDER",
        }
    }

    fn for_category_name(name: &str) -> Option<Station> {
        match name.trim().to_ascii_lowercase().as_str() {
            "drinks" => Some(Station::Barista),
            "shisha" => Some(Station::Shisha),
            "food" => Some(Station::Kitchen),
            _ => None,
        }
    }
}

// =============================================================================
// Station Map
// =============================================================================

/// Precomputed category-id → station lookup.
///
/// Built once from the full category table; subcategories inherit the
/// station of the nearest ancestor whose name is a routing root
/// (`drinks`, `shisha`, `food`, case-insensitive).
#[derive(Debug, Clone, Default)]
pub struct StationMap {
    by_category: HashMap<String, Station>,
}

impl StationMap {
    /// Builds the map from the category table.
    pub fn build(categories: &[Category]) -> Self {
        let by_id: HashMap<&str, &Category> =
            categories.iter().map(|c| (c.id.as_str(), c)).collect();

        let mut by_category = HashMap::new();

        for category in categories {
            let mut current = Some(*by_id.get(category.id.as_str()).unwrap_or(&category));
            // Walk toward the root; depth guard in case of a parent cycle.
            let mut hops = 0;
            while let Some(cat) = current {
                if let Some(station) = Station::for_category_name(&cat.name) {
                    by_category.insert(category.id.clone(), station);
                    break;
                }
                hops += 1;
                if hops > categories.len() {
                    break;
                }
                current = cat
                    .parent_id
                    .as_deref()
                    .and_then(|pid| by_id.get(pid).copied());
            }
        }

        StationMap { by_category }
    }

    /// Resolves the station for one category id.
    pub fn station_for_category(&self, category_id: &str) -> Option<Station> {
        self.by_category.get(category_id).copied()
    }

    /// Resolves the station for a product from its category ids.
    ///
    /// The first routable category wins; products with no routable
    /// category produce no kitchen ticket.
    pub fn station_for(&self, category_ids: &[String]) -> Option<Station> {
        category_ids
            .iter()
            .find_map(|id| self.station_for_category(id))
    }

    /// Number of routable categories (for diagnostics).
    pub fn len(&self) -> usize {
        self.by_category.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_category.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn cat(id: &str, name: &str, parent: Option<&str>) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: parent.map(|p| p.to_string()),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_root_categories_route_directly() {
        let map = StationMap::build(&[
            cat("c1", "Drinks", None),
            cat("c2", "Shisha", None),
            cat("c3", "Food", None),
        ]);

        assert_eq!(map.station_for_category("c1"), Some(Station::Barista));
        assert_eq!(map.station_for_category("c2"), Some(Station::Shisha));
        assert_eq!(map.station_for_category("c3"), Some(Station::Kitchen));
    }

    #[test]
    fn test_subcategories_inherit_parent_station() {
        let map = StationMap::build(&[
            cat("c1", "Drinks", None),
            cat("c2", "Hot Drinks", Some("c1")),
            cat("c3", "Fresh Juices", Some("c1")),
        ]);

        assert_eq!(map.station_for_category("c2"), Some(Station::Barista));
        assert_eq!(map.station_for_category("c3"), Some(Station::Barista));
    }

    #[test]
    fn test_unroutable_category_has_no_station() {
        let map = StationMap::build(&[cat("c1", "Merchandise", None)]);
        assert_eq!(map.station_for_category("c1"), None);
    }

    #[test]
    fn test_station_for_product_takes_first_routable() {
        let map = StationMap::build(&[
            cat("c1", "Merchandise", None),
            cat("c2", "Food", None),
        ]);

        let ids = vec!["c1".to_string(), "c2".to_string()];
        assert_eq!(map.station_for(&ids), Some(Station::Kitchen));

        let none = vec!["c1".to_string()];
        assert_eq!(map.station_for(&none), None);
    }
}
