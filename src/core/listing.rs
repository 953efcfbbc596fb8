//! Catalog browsing: category filter and free-text search over available items.
//!
//! The whole available catalog is loaded and filtered in memory. There is no
//! pagination.

use crate::{
    core::items,
    errors::Result,
    models::{Category, DonationItem},
};
use sea_orm::DatabaseConnection;
use std::collections::BTreeMap;

pub use crate::core::items::{get_item, related_items};

/// How many related items an item page shows
pub const RELATED_ITEMS_LIMIT: u64 = 3;

/// Browse filter; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Only items in this category
    pub category: Option<Category>,
    /// Case-insensitive match on name or description
    pub search_text: Option<String>,
}

impl ItemFilter {
    /// Filter for one category.
    #[must_use]
    pub const fn category(category: Category) -> Self {
        Self {
            category: Some(category),
            search_text: None,
        }
    }

    /// Filter for a search term.
    #[must_use]
    pub fn search(text: &str) -> Self {
        Self {
            category: None,
            search_text: Some(text.to_string()),
        }
    }

    fn needle(&self) -> Option<String> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether `item` passes the filter. Search is a case-insensitive substring
    /// match on the name or the description.
    #[must_use]
    pub fn matches(&self, item: &DonationItem) -> bool {
        if self.category.is_some_and(|c| c != item.category) {
            return false;
        }
        self.needle().is_none_or(|needle| {
            item.name.to_lowercase().contains(&needle)
                || item.description.to_lowercase().contains(&needle)
        })
    }
}

/// Applies `filter` to `items`, keeping their order.
#[must_use]
pub fn filter_items(items: &[DonationItem], filter: &ItemFilter) -> Vec<DonationItem> {
    items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}

/// Available items matching `filter`, newest first.
pub async fn list_available_items(
    db: &DatabaseConnection,
    filter: &ItemFilter,
) -> Result<Vec<DonationItem>> {
    let available = items::list_available(db).await?;
    Ok(filter_items(&available, filter))
}

/// Number of items per category, with zero entries for empty categories.
#[must_use]
pub fn category_counts(items: &[DonationItem]) -> BTreeMap<Category, usize> {
    let mut counts: BTreeMap<Category, usize> = Category::ALL.iter().map(|c| (*c, 0)).collect();
    for item in items {
        *counts.entry(item.category).or_default() += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn catalog() -> Vec<DonationItem> {
        vec![
            item_fixture(1, "Math Textbook", Category::Book),
            item_fixture(2, "Colour Pencils", Category::Pencil),
            DonationItem {
                description: "Fits a maths textbook and lunch".to_string(),
                ..item_fixture(3, "Backpack", Category::SchoolSupplies)
            },
        ]
    }

    #[test]
    fn test_no_filter_keeps_everything() {
        let items = catalog();
        assert_eq!(filter_items(&items, &ItemFilter::default()).len(), 3);
        assert_eq!(filter_items(&items, &ItemFilter::search("   ")).len(), 3);
    }

    #[test]
    fn test_category_filter() {
        let result = filter_items(&catalog(), &ItemFilter::category(Category::Pencil));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Colour Pencils");
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_description() {
        let result = filter_items(&catalog(), &ItemFilter::search("MATH"));
        let ids: Vec<i64> = result.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_category_and_search_combine() {
        let filter = ItemFilter {
            category: Some(Category::Book),
            search_text: Some("pencil".to_string()),
        };
        assert!(filter_items(&catalog(), &filter).is_empty());
    }

    #[test]
    fn test_category_counts() {
        let mut items = catalog();
        items.push(item_fixture(4, "Reader", Category::Book));
        let counts = category_counts(&items);
        assert_eq!(counts[&Category::Book], 2);
        assert_eq!(counts[&Category::Pencil], 1);
        assert_eq!(counts[&Category::SchoolSupplies], 1);
        assert_eq!(category_counts(&[])[&Category::Book], 0);
    }

    #[tokio::test]
    async fn test_list_available_items_hides_pending() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_catalog_item(&db, "Story Book", Category::Book).await?;
        create_test_catalog_item(&db, "Eraser", Category::Pencil).await?;
        items::create_donation(&db, test_donation("Book Bundle")).await?;

        let books = list_available_items(&db, &ItemFilter::search("book")).await?;
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].name, "Story Book");

        let all = list_available_items(&db, &ItemFilter::default()).await?;
        assert_eq!(all.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_related_items_limit() -> Result<()> {
        let db = setup_test_db().await?;
        let item = create_test_catalog_item(&db, "Atlas", Category::Book).await?;
        for name in ["Reader", "Dictionary", "Workbook", "Novel"] {
            create_test_catalog_item(&db, name, Category::Book).await?;
        }

        let related = related_items(&db, &item, RELATED_ITEMS_LIMIT).await?;
        assert_eq!(related.len(), 3);
        assert!(related.iter().all(|i| i.id != item.id));
        Ok(())
    }
}
