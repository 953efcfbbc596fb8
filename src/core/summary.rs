//! Review summaries and donor contact footers.

use crate::models::{Category, ShippingSnapshot};
use std::fmt;

/// What the user confirms on the review step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub item_name: String,
    pub category: Category,
    pub quantity: u32,
    pub description: String,
    /// Condition, for donations only
    pub condition: Option<String>,
    pub shipping: ShippingSnapshot,
    /// Label of the saved address in use, if any (e.g. "Home - Colombo")
    pub address_label: Option<String>,
}

impl ReviewSummary {
    /// Headline line, e.g. "Math Textbook ×1".
    #[must_use]
    pub fn headline(&self) -> String {
        format!("{} ×{}", self.item_name, self.quantity)
    }

    /// One-line delivery location.
    #[must_use]
    pub fn location(&self) -> String {
        location_line(&self.shipping)
    }
}

impl fmt::Display for ReviewSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.headline())?;
        writeln!(f, "Category: {}", self.category.label())?;
        if let Some(condition) = &self.condition {
            writeln!(f, "Condition: {condition}")?;
        }
        if !self.description.is_empty() {
            writeln!(f, "{}", self.description)?;
        }
        if let Some(label) = &self.address_label {
            writeln!(f, "Address: {label}")?;
        }
        writeln!(f, "Contact: {} ({})", self.shipping.name, self.shipping.phone)?;
        write!(f, "Ship to: {}", self.location())
    }
}

fn location_line(shipping: &ShippingSnapshot) -> String {
    [
        shipping.address.as_str(),
        shipping.city.as_str(),
        shipping.state.as_str(),
        shipping.zip.as_str(),
        shipping.country.as_str(),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}

/// Donation description with the donor's contact details appended, so reviewers can
/// reach the donor. Donation rows have no contact columns of their own.
#[must_use]
pub fn donation_description(description: &str, donor: &ShippingSnapshot) -> String {
    format!(
        "{}\n\n---\nDonor: {}\nPhone: {}\nEmail: {}\nLocation: {}, {}, {}",
        description.trim(),
        donor.name,
        donor.phone,
        donor.email.as_deref().unwrap_or_default(),
        donor.address,
        donor.city,
        donor.country,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipping() -> ShippingSnapshot {
        ShippingSnapshot {
            name: "Asha".to_string(),
            phone: "0770000000".to_string(),
            email: Some("asha@example.com".to_string()),
            address: "12 Lake Rd".to_string(),
            city: "Colombo".to_string(),
            state: String::new(),
            zip: String::new(),
            country: "Sri Lanka".to_string(),
        }
    }

    #[test]
    fn test_headline_and_location() {
        let summary = ReviewSummary {
            item_name: "Math Textbook".to_string(),
            category: Category::Book,
            quantity: 1,
            description: "For grade 6".to_string(),
            condition: None,
            shipping: shipping(),
            address_label: None,
        };
        assert_eq!(summary.headline(), "Math Textbook ×1");
        assert_eq!(summary.location(), "12 Lake Rd, Colombo, Sri Lanka");

        let rendered = summary.to_string();
        assert!(rendered.starts_with("Math Textbook ×1\nCategory: Books\n"));
        assert!(rendered.ends_with("Ship to: 12 Lake Rd, Colombo, Sri Lanka"));
    }

    #[test]
    fn test_donation_description_footer() {
        let description = donation_description("Lightly used backpack ", &shipping());
        assert_eq!(
            description,
            "Lightly used backpack\n\n---\nDonor: Asha\nPhone: 0770000000\n\
             Email: asha@example.com\nLocation: 12 Lake Rd, Colombo, Sri Lanka"
        );
    }
}
