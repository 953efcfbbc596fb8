//! Shipping/contact resolution for submissions.
//!
//! A submission ships to exactly one of:
//! 1. the contact form, when the user chose to enter a new address or has none saved;
//! 2. the selected saved address.
//!
//! The profile's legacy contact columns never win over either source. They only
//! pre-fill empty form fields (see [`ContactFields::fill_empty_from`]) and supply the
//! contact name when the form leaves it blank.
//!
//! The result is a [`ShippingSnapshot`] copied by value into the stored row.

use crate::{
    errors::{Error, Result},
    models::{ShippingSnapshot, UserAddress, UserProfile},
};

/// The contact form as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    /// Recipient name; blank falls back to the profile name
    pub name: String,
    /// Contact phone
    pub phone: String,
    /// Contact email; blank falls back to the session email
    pub email: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// State or province
    pub state: String,
    /// Postal code
    pub zip: String,
    /// Country; blank takes the configured default
    pub country: String,
}

/// Contact defaults taken from the profile and the session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFallback {
    /// Profile display name
    pub name: Option<String>,
    /// Profile phone
    pub phone: Option<String>,
    /// Session email
    pub email: Option<String>,
    /// Profile street address
    pub address: Option<String>,
    /// Profile city
    pub city: Option<String>,
    /// Profile state
    pub state: Option<String>,
    /// Profile postal code
    pub zip: Option<String>,
    /// Profile country
    pub country: Option<String>,
}

impl ProfileFallback {
    /// Builds the fallback from a profile and the session email.
    #[must_use]
    pub fn from_profile(profile: Option<&UserProfile>, email: Option<&str>) -> Self {
        let Some(profile) = profile else {
            return Self {
                email: email.map(str::to_string),
                ..Self::default()
            };
        };
        Self {
            name: Some(profile.name.clone()).filter(|n| !n.trim().is_empty()),
            phone: profile.phone.clone(),
            email: email.map(str::to_string),
            address: profile.address.clone(),
            city: profile.city.clone(),
            state: profile.state.clone(),
            zip: profile.zip_code.clone(),
            country: profile.country.clone(),
        }
    }
}

fn fill(target: &mut String, fallback: Option<&String>) {
    if target.trim().is_empty() {
        if let Some(value) = fallback.filter(|v| !v.trim().is_empty()) {
            target.clone_from(value);
        }
    }
}

impl ContactFields {
    /// Copies fallback values into fields that are still empty. Fields the user has
    /// already typed are left alone.
    pub fn fill_empty_from(&mut self, fallback: &ProfileFallback) {
        fill(&mut self.name, fallback.name.as_ref());
        fill(&mut self.phone, fallback.phone.as_ref());
        fill(&mut self.email, fallback.email.as_ref());
        fill(&mut self.address, fallback.address.as_ref());
        fill(&mut self.city, fallback.city.as_ref());
        fill(&mut self.state, fallback.state.as_ref());
        fill(&mut self.zip, fallback.zip.as_ref());
        fill(&mut self.country, fallback.country.as_ref());
    }

    /// Form pre-filled from the user's primary (or first) saved address, falling back
    /// to the profile for anything left empty.
    #[must_use]
    pub fn primed(
        addresses: &[UserAddress],
        fallback: &ProfileFallback,
        default_country: &str,
    ) -> Self {
        let mut fields = select_default_address(addresses)
            .and_then(|id| addresses.iter().find(|a| a.id == id))
            .map(|address| Self {
                name: address.name.clone(),
                phone: address.phone.clone(),
                address: address.address.clone(),
                city: address.city.clone(),
                state: address.state.clone().unwrap_or_default(),
                zip: address.zip_code.clone().unwrap_or_default(),
                country: address.country.clone(),
                ..Self::default()
            })
            .unwrap_or_default();
        fields.fill_empty_from(fallback);
        if fields.country.trim().is_empty() {
            fields.country = default_country.to_string();
        }
        fields
    }
}

/// Everything the resolver looks at
#[derive(Debug, Clone, Copy)]
pub struct ShippingSources<'a> {
    /// Saved addresses in server order (primary first, newest first)
    pub addresses: &'a [UserAddress],
    /// Saved address picked by the user
    pub selected_address_id: Option<i64>,
    /// True when the typed form should be used instead of a saved address
    pub use_new_address_form: bool,
    /// The contact form
    pub form: &'a ContactFields,
    /// Values for blank form fields
    pub profile_fallback: &'a ProfileFallback,
    /// Email of the signed-in user; saved addresses do not store one
    pub email: Option<&'a str>,
    /// Country used when nothing else names one
    pub default_country: &'a str,
}

impl ShippingSources<'_> {
    /// Whether the form, rather than a saved address, is the effective source.
    #[must_use]
    pub const fn uses_form(&self) -> bool {
        self.use_new_address_form || self.addresses.is_empty()
    }
}

/// Default selection whenever the address list changes: the first primary address,
/// else the first address, else nothing.
#[must_use]
pub fn select_default_address(addresses: &[UserAddress]) -> Option<i64> {
    addresses
        .iter()
        .find(|a| a.is_primary)
        .or_else(|| addresses.first())
        .map(|a| a.id)
}

/// Looks up the selected address. A missing or stale selection is an error; the
/// caller must re-run [`select_default_address`] rather than guess.
pub fn selected_address(
    addresses: &[UserAddress],
    selected_address_id: Option<i64>,
) -> Result<&UserAddress> {
    let id = selected_address_id.ok_or(Error::MissingAddressSelection)?;
    addresses
        .iter()
        .find(|a| a.id == id)
        .ok_or(Error::MissingAddressSelection)
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

/// Resolves the effective shipping snapshot for a submission.
///
/// # Errors
/// - [`Error::MissingAddressSelection`] when a saved address should be used but the
///   selection is empty or stale
/// - [`Error::IncompleteShippingInfo`] when name, phone, address or city is empty
pub fn resolve_shipping_info(sources: &ShippingSources<'_>) -> Result<ShippingSnapshot> {
    let email = sources
        .email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string);

    let mut snapshot = if sources.uses_form() {
        let form = sources.form;
        let mut name = trimmed(&form.name);
        if name.is_empty() {
            if let Some(fallback) = &sources.profile_fallback.name {
                name = trimmed(fallback);
            }
        }
        let form_email = trimmed(&form.email);
        ShippingSnapshot {
            name,
            phone: trimmed(&form.phone),
            email: if form_email.is_empty() { email } else { Some(form_email) },
            address: trimmed(&form.address),
            city: trimmed(&form.city),
            state: trimmed(&form.state),
            zip: trimmed(&form.zip),
            country: trimmed(&form.country),
        }
    } else {
        let address = selected_address(sources.addresses, sources.selected_address_id)?;
        ShippingSnapshot {
            name: trimmed(&address.name),
            phone: trimmed(&address.phone),
            email,
            address: trimmed(&address.address),
            city: trimmed(&address.city),
            state: address.state.as_deref().map(trimmed).unwrap_or_default(),
            zip: address.zip_code.as_deref().map(trimmed).unwrap_or_default(),
            country: trimmed(&address.country),
        }
    };

    if snapshot.country.is_empty() {
        snapshot.country = sources.default_country.to_string();
    }

    validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

/// Checks the required snapshot fields, reporting every missing one.
pub fn validate_snapshot(snapshot: &ShippingSnapshot) -> Result<()> {
    let missing: Vec<&'static str> = [
        ("name", &snapshot.name),
        ("phone", &snapshot.phone),
        ("address", &snapshot.address),
        ("city", &snapshot.city),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::IncompleteShippingInfo { missing })
    }
}
