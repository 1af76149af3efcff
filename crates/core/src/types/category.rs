//! Menu categories.
//!
//! A closed set used for filtering and labelling only. Wire names match the
//! backend's variant names (`fastFood`, `nonVegetarian`, ...).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A menu category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    FastFood,
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
    Vegetarian,
    NonVegetarian,
    HealthyFoods,
}

impl Category {
    /// Every category, in menu tab order.
    pub const ALL: [Self; 8] = [
        Self::FastFood,
        Self::Breakfast,
        Self::Lunch,
        Self::Dinner,
        Self::Snacks,
        Self::Vegetarian,
        Self::NonVegetarian,
        Self::HealthyFoods,
    ];

    /// Name used on the wire and in `?category=` query strings.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::FastFood => "fastFood",
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snacks => "snacks",
            Self::Vegetarian => "vegetarian",
            Self::NonVegetarian => "nonVegetarian",
            Self::HealthyFoods => "healthyFoods",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FastFood => "Fast Food",
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::Snacks => "Snacks",
            Self::Vegetarian => "Vegetarian",
            Self::NonVegetarian => "Non-Vegetarian",
            Self::HealthyFoods => "Healthy Foods",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0}")]
pub struct CategoryParseError(pub String);

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.wire_name() == s)
            .ok_or_else(|| CategoryParseError(s.to_string()))
    }
}

/// Category selection on the menu, with `All` as the "no filter" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Query-string value (`all` or a category wire name).
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(category) => category.wire_name(),
        }
    }

    /// Whether this filter selects exactly `category`.
    #[must_use]
    pub fn is(self, category: Category) -> bool {
        self == Self::Only(category)
    }
}

impl FromStr for CategoryFilter {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "all" {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_serde() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.wire_name()));
            assert_eq!(category.wire_name().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "nonVegetarian".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::NonVegetarian)
        );
        assert!("dessert".parse::<CategoryFilter>().is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Category::HealthyFoods.label(), "Healthy Foods");
        assert_eq!(Category::NonVegetarian.label(), "Non-Vegetarian");
    }
}
