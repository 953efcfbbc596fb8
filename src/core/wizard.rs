//! Multi-step submission wizard shared by the donate, request and item-detail flows.
//!
//! ```text
//! SelectCategory -> EnterDetails -> EnterContact -> Review -> Submitting -> Success
//!                                                      ^            |
//!                                                      +-- failed --+
//! ```
//!
//! The wizard owns only form state. Each forward transition is guarded; the review
//! step re-checks every guard before submitting, because the saved address list can
//! change while the user is on the review step. A submission is a single insert, so a
//! failed one leaves nothing behind and the user retries from the review step with
//! all fields intact. Error text goes out as a [`Notification`] and is never stored.

use crate::{
    core::{
        items::{self, NewDonation},
        requests::{self, NewRequest},
        shipping::{
            ContactFields, ProfileFallback, ShippingSources, resolve_shipping_info,
            select_default_address, selected_address,
        },
        summary::{ReviewSummary, donation_description},
    },
    errors::{Error, Result},
    models::{Category, DEFAULT_CONDITION, DonationItem, ShippingSnapshot, UserAddress},
    session::SessionState,
};
use sea_orm::DatabaseConnection;
use tracing::{debug, error, info};

/// Where the wizard currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    /// Pick a category; skipped by presets
    SelectCategory,
    /// Item name, description, quantity and condition
    EnterDetails,
    /// Saved address or the contact form
    EnterContact,
    /// Read-only summary before submitting
    Review,
    /// Waiting for the store
    Submitting,
    /// Submitted; fields have been reset
    Success,
}

impl WizardStep {
    /// Position in the four-step progress indicator (1-based). Submitting and success
    /// both show as the last step.
    #[must_use]
    pub const fn progress(self) -> u8 {
        match self {
            Self::SelectCategory => 1,
            Self::EnterDetails => 2,
            Self::EnterContact => 3,
            Self::Review | Self::Submitting | Self::Success => 4,
        }
    }
}

/// Which page the wizard serves and what it inserts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    /// Donate page: inserts a pending donation item
    Donate,
    /// Request page: inserts a pending item request
    Request,
    /// Request modal on an item's page: the item name and category are fixed
    ItemDetail,
}

impl FlowKind {
    const fn success_message(self) -> &'static str {
        match self {
            Self::Donate => "Thank you! Your donation has been submitted for review.",
            Self::Request => "Request submitted successfully! We will review it shortly.",
            Self::ItemDetail => "Request submitted successfully!",
        }
    }

    const fn failure_message(self) -> &'static str {
        match self {
            Self::Donate => "Failed to submit donation. Please try again.",
            Self::Request | Self::ItemDetail => "Failed to submit request. Please try again.",
        }
    }
}

/// Item fields entered on the details step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetails {
    /// What is being donated or requested
    pub item_name: String,
    /// Free text shown to reviewers
    pub description: String,
    /// At least 1
    pub quantity: u32,
    /// Donations only
    pub condition: String,
    /// Donations only; an image URL, empty for none
    pub image_url: String,
}

impl Default for ItemDetails {
    fn default() -> Self {
        Self {
            item_name: String::new(),
            description: String::new(),
            quantity: 1,
            condition: DEFAULT_CONDITION.to_string(),
            image_url: String::new(),
        }
    }
}

/// Clamps a numeric quantity to at least 1.
#[must_use]
pub fn clamp_quantity(value: i64) -> u32 {
    if value < 1 {
        1
    } else {
        u32::try_from(value).unwrap_or(u32::MAX)
    }
}

/// Parses a typed quantity. Anything non-numeric or below 1 becomes 1.
#[must_use]
pub fn normalize_quantity(input: &str) -> u32 {
    input.trim().parse::<i64>().map_or(1, clamp_quantity)
}

/// Who is submitting, captured from the session when the wizard is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    /// Identity id
    pub user_id: String,
    /// Sign-in email, used when the contact form has none
    pub email: String,
    /// Name recorded on requests
    pub display_name: String,
}

/// Item name and category supplied by navigation instead of the category step
#[derive(Debug, Clone, PartialEq, Eq)]
struct Preset {
    item_name: String,
    category: Category,
    /// Stock of the catalog item being requested
    max_quantity: Option<u32>,
}

/// The single insert a confirmed wizard produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Pending donation item
    Donation(NewDonation),
    /// Pending item request
    Request(NewRequest),
}

/// Severity of a transient notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// The action went through
    Success,
    /// The action failed; the message says which one
    Error,
}

/// A transient, user-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Success or error
    pub kind: NotificationKind,
    /// Text shown to the user
    pub message: String,
}

impl Notification {
    pub(crate) fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Form state machine for one submission flow
#[derive(Debug, Clone)]
pub struct SubmissionWizard {
    flow: FlowKind,
    step: WizardStep,
    category: Option<Category>,
    preset: Option<Preset>,
    details: ItemDetails,
    contact: ContactFields,
    addresses: Vec<UserAddress>,
    selected_address_id: Option<i64>,
    use_new_address_form: bool,
    contact_primed: bool,
    requester: Requester,
    fallback: ProfileFallback,
    default_country: String,
}

impl SubmissionWizard {
    /// Creates a wizard for `flow` on behalf of the signed-in user. Item-detail flows
    /// should use [`Self::for_item`], which also fixes the item.
    pub fn new(flow: FlowKind, session: &SessionState, default_country: &str) -> Result<Self> {
        let user = session.require_user()?;
        let requester = Requester {
            user_id: user.id.clone(),
            email: user.email.clone(),
            display_name: session.display_name(),
        };
        let fallback = ProfileFallback::from_profile(session.profile.as_ref(), Some(&user.email));

        Ok(Self {
            flow,
            step: WizardStep::SelectCategory,
            category: None,
            preset: None,
            details: ItemDetails::default(),
            contact: ContactFields::default(),
            addresses: Vec::new(),
            selected_address_id: None,
            use_new_address_form: false,
            contact_primed: false,
            requester,
            fallback,
            default_country: default_country.to_string(),
        })
    }

    /// Wizard for the donate page.
    pub fn donate(session: &SessionState, default_country: &str) -> Result<Self> {
        Self::new(FlowKind::Donate, session, default_country)
    }

    /// Wizard for the request page.
    pub fn request(session: &SessionState, default_country: &str) -> Result<Self> {
        Self::new(FlowKind::Request, session, default_country)
    }

    /// Wizard for the request modal on an item's page. Starts at the details step
    /// with the item's name and category; the quantity cannot exceed the item's stock.
    pub fn for_item(
        session: &SessionState,
        item: &DonationItem,
        default_country: &str,
    ) -> Result<Self> {
        if !item.is_available {
            return Err(Error::validation("item", "is not available"));
        }
        let mut wizard = Self::new(FlowKind::ItemDetail, session, default_country)?
            .with_preset(&item.name, item.category);
        if let Some(preset) = wizard.preset.as_mut() {
            preset.max_quantity = Some(item.quantity);
        }
        Ok(wizard)
    }

    /// Pre-supplies the item name and category (e.g. from navigation parameters) and
    /// skips the category step.
    #[must_use]
    pub fn with_preset(mut self, item_name: &str, category: Category) -> Self {
        self.preset = Some(Preset {
            item_name: item_name.to_string(),
            category,
            max_quantity: None,
        });
        self.apply_preset();
        self
    }

    fn apply_preset(&mut self) {
        if let Some(preset) = &self.preset {
            self.category = Some(preset.category);
            self.details.item_name.clone_from(&preset.item_name);
            self.step = WizardStep::EnterDetails;
        }
    }

    pub const fn flow(&self) -> FlowKind {
        self.flow
    }

    pub const fn step(&self) -> WizardStep {
        self.step
    }

    pub const fn category(&self) -> Option<Category> {
        self.category
    }

    pub const fn details(&self) -> &ItemDetails {
        &self.details
    }

    pub const fn contact(&self) -> &ContactFields {
        &self.contact
    }

    pub fn addresses(&self) -> &[UserAddress] {
        &self.addresses
    }

    pub const fn selected_address_id(&self) -> Option<i64> {
        self.selected_address_id
    }

    pub const fn requester(&self) -> &Requester {
        &self.requester
    }

    /// Largest quantity that can be requested, when the item's stock is known.
    pub fn max_quantity(&self) -> Option<u32> {
        self.preset.as_ref().and_then(|p| p.max_quantity)
    }

    /// Whether the contact form (rather than a saved address) will be used.
    pub fn uses_new_address_form(&self) -> bool {
        self.use_new_address_form || self.addresses.is_empty()
    }

    /// True while a submission is in flight.
    pub fn is_submitting(&self) -> bool {
        self.step == WizardStep::Submitting
    }

    fn invalid(&self, action: &'static str) -> Error {
        Error::InvalidStep {
            step: self.step,
            action,
        }
    }

    fn ensure_editable(&self, action: &'static str) -> Result<()> {
        match self.step {
            WizardStep::Submitting | WizardStep::Success => Err(self.invalid(action)),
            _ => Ok(()),
        }
    }

    /// Picks a category and moves to the details step.
    pub fn select_category(&mut self, category: Category) -> Result<()> {
        if self.step != WizardStep::SelectCategory {
            return Err(self.invalid("select a category"));
        }
        self.category = Some(category);
        self.step = WizardStep::EnterDetails;
        Ok(())
    }

    /// Clears the chosen category. Only possible on the category step.
    pub fn clear_category(&mut self) -> Result<()> {
        if self.step != WizardStep::SelectCategory {
            return Err(self.invalid("clear the category"));
        }
        self.category = None;
        Ok(())
    }

    pub fn set_item_name(&mut self, name: &str) -> Result<()> {
        self.ensure_editable("edit the item name")?;
        if self.flow == FlowKind::ItemDetail {
            return Err(Error::validation("item name", "is fixed by the selected item"));
        }
        self.details.item_name = name.to_string();
        Ok(())
    }

    pub fn set_description(&mut self, description: &str) -> Result<()> {
        self.ensure_editable("edit the description")?;
        self.details.description = description.to_string();
        Ok(())
    }

    /// Sets the quantity, clamped to at least 1.
    pub fn set_quantity(&mut self, quantity: i64) -> Result<()> {
        self.ensure_editable("edit the quantity")?;
        self.details.quantity = clamp_quantity(quantity);
        Ok(())
    }

    /// Sets the quantity from typed text; see [`normalize_quantity`].
    pub fn set_quantity_input(&mut self, input: &str) -> Result<()> {
        self.ensure_editable("edit the quantity")?;
        self.details.quantity = normalize_quantity(input);
        Ok(())
    }

    pub fn set_condition(&mut self, condition: &str) -> Result<()> {
        self.ensure_editable("edit the condition")?;
        self.details.condition = condition.to_string();
        Ok(())
    }

    pub fn set_image_url(&mut self, url: &str) -> Result<()> {
        self.ensure_editable("edit the image")?;
        self.details.image_url = url.to_string();
        Ok(())
    }

    /// Mutable access to the contact form.
    pub fn contact_mut(&mut self) -> Result<&mut ContactFields> {
        self.ensure_editable("edit contact details")?;
        Ok(&mut self.contact)
    }

    /// Chooses between the contact form and the saved addresses. With no saved
    /// addresses the form is used regardless.
    pub fn use_new_address_form(&mut self, use_form: bool) -> Result<()> {
        self.ensure_editable("change the address source")?;
        self.use_new_address_form = use_form;
        Ok(())
    }

    /// Selects one of the saved addresses.
    pub fn select_address(&mut self, address_id: i64) -> Result<()> {
        self.ensure_editable("select an address")?;
        selected_address(&self.addresses, Some(address_id))?;
        self.selected_address_id = Some(address_id);
        self.use_new_address_form = false;
        Ok(())
    }

    /// Replaces the saved address list and re-runs the default selection. The user's
    /// choice of the contact form is kept. An empty list forces the form and, on the
    /// contact step, pre-fills it from the profile.
    pub fn set_addresses(&mut self, addresses: Vec<UserAddress>) {
        self.selected_address_id = select_default_address(&addresses);
        self.addresses = addresses;
        if self.addresses.is_empty() && self.step == WizardStep::EnterContact {
            self.prime_contact();
        }
        debug!(
            "Address list changed ({} saved), selected {:?}",
            self.addresses.len(),
            self.selected_address_id
        );
    }

    /// One-time fill-empty-only merge from the profile when nothing is saved, then the
    /// default country if the form still has none. Fields the user cleared after the
    /// merge stay cleared.
    fn prime_contact(&mut self) {
        if !self.contact_primed && self.addresses.is_empty() {
            self.contact.fill_empty_from(&self.fallback);
            self.contact_primed = true;
        }
        if self.contact.country.trim().is_empty() {
            self.contact.country.clone_from(&self.default_country);
        }
    }

    fn validate_details(&self) -> Result<()> {
        if self.category.is_none() {
            return Err(Error::validation("category", "please select a category"));
        }
        if self.details.item_name.trim().is_empty() {
            return Err(Error::validation("item name", "cannot be empty"));
        }
        if self.details.description.trim().is_empty() {
            return Err(Error::validation("description", "cannot be empty"));
        }
        if self.details.quantity == 0 {
            return Err(Error::validation("quantity", "must be at least 1"));
        }
        if let Some(max) = self.max_quantity().filter(|max| self.details.quantity > *max) {
            return Err(Error::validation(
                "quantity",
                format!("cannot exceed the {max} available"),
            ));
        }
        Ok(())
    }

    fn resolve_shipping(&self) -> Result<ShippingSnapshot> {
        resolve_shipping_info(&ShippingSources {
            addresses: &self.addresses,
            selected_address_id: self.selected_address_id,
            use_new_address_form: self.use_new_address_form,
            form: &self.contact,
            profile_fallback: &self.fallback,
            email: Some(&self.requester.email),
            default_country: &self.default_country,
        })
    }

    /// Moves forward one step if the current step's guard passes.
    pub fn advance(&mut self) -> Result<WizardStep> {
        match self.step {
            WizardStep::SelectCategory => {
                if self.category.is_none() {
                    return Err(Error::validation("category", "please select a category"));
                }
                self.step = WizardStep::EnterDetails;
            }
            WizardStep::EnterDetails => {
                if self.flow == FlowKind::ItemDetail && self.details.description.trim().is_empty()
                {
                    self.details.description = format!("Requesting {}", self.details.item_name);
                }
                self.validate_details()?;
                self.step = WizardStep::EnterContact;
                self.prime_contact();
            }
            WizardStep::EnterContact => {
                self.resolve_shipping()?;
                self.step = WizardStep::Review;
            }
            WizardStep::Review | WizardStep::Submitting | WizardStep::Success => {
                return Err(self.invalid("advance"));
            }
        }
        Ok(self.step)
    }

    /// Moves back one step, keeping every entered value.
    pub fn back(&mut self) -> Result<WizardStep> {
        self.step = match self.step {
            WizardStep::Review => WizardStep::EnterContact,
            WizardStep::EnterContact => WizardStep::EnterDetails,
            WizardStep::EnterDetails if self.flow != FlowKind::ItemDetail => {
                // The category becomes editable again, so it is no longer pre-supplied
                self.preset = None;
                WizardStep::SelectCategory
            }
            _ => return Err(self.invalid("go back")),
        };
        Ok(self.step)
    }

    /// What the review step shows.
    pub fn review_summary(&self) -> Result<ReviewSummary> {
        self.validate_details()?;
        let shipping = self.resolve_shipping()?;
        let category = self
            .category
            .ok_or_else(|| Error::validation("category", "please select a category"))?;

        let address_label = if self.uses_new_address_form() {
            None
        } else {
            selected_address(&self.addresses, self.selected_address_id)
                .ok()
                .map(|a| format!("{} - {}", a.label.as_str(), a.city))
        };

        Ok(ReviewSummary {
            item_name: self.details.item_name.trim().to_string(),
            category,
            quantity: self.details.quantity,
            description: self.details.description.trim().to_string(),
            condition: (self.flow == FlowKind::Donate).then(|| self.details.condition.clone()),
            shipping,
            address_label,
        })
    }

    /// Confirms the review step: re-validates everything and returns the insert to
    /// perform. The wizard stays in `Submitting` until [`Self::complete_submit`].
    pub fn begin_submit(&mut self) -> Result<Submission> {
        if self.step != WizardStep::Review {
            return Err(self.invalid("submit"));
        }
        let summary = self.review_summary()?;
        let details = &self.details;

        let submission = match self.flow {
            FlowKind::Donate => Submission::Donation(NewDonation {
                name: summary.item_name,
                description: donation_description(&summary.description, &summary.shipping),
                category: summary.category,
                quantity: summary.quantity,
                condition: details.condition.clone(),
                image_url: Some(details.image_url.trim().to_string()).filter(|u| !u.is_empty()),
                donor_id: self.requester.user_id.clone(),
            }),
            FlowKind::Request | FlowKind::ItemDetail => Submission::Request(NewRequest {
                user_id: self.requester.user_id.clone(),
                user_email: self.requester.email.clone(),
                user_name: self.requester.display_name.clone(),
                item_name: summary.item_name,
                category: summary.category,
                quantity: summary.quantity,
                description: summary.description,
                shipping: summary.shipping,
            }),
        };

        self.step = WizardStep::Submitting;
        Ok(submission)
    }

    /// Records the outcome of the insert started by [`Self::begin_submit`].
    ///
    /// Success resets the form and lands on `Success`. Failure returns to `Review`
    /// with everything intact.
    pub fn complete_submit(&mut self, outcome: Result<()>) -> Result<Notification> {
        if self.step != WizardStep::Submitting {
            return Err(self.invalid("finish submitting"));
        }

        match outcome {
            Ok(()) => {
                self.reset();
                self.step = WizardStep::Success;
                info!("{:?} submission by {} succeeded", self.flow, self.requester.user_id);
                Ok(Notification::success(self.flow.success_message()))
            }
            Err(e) => {
                error!("Error submitting {:?}: {}", self.flow, e);
                self.step = WizardStep::Review;
                let message = if e.is_local() {
                    e.user_message()
                } else {
                    self.flow.failure_message().to_string()
                };
                Ok(Notification::error(message))
            }
        }
    }

    /// Runs the whole submitting phase against the store.
    ///
    /// Local validation failures come back as `Err` and leave the wizard on the review
    /// step. Store failures come back as an error [`Notification`].
    pub async fn submit(&mut self, db: &DatabaseConnection) -> Result<Notification> {
        let outcome = match self.begin_submit()? {
            Submission::Donation(donation) => items::create_donation(db, donation).await.map(drop),
            Submission::Request(request) => requests::create_request(db, request).await.map(drop),
        };
        self.complete_submit(outcome)
    }

    /// Leaves the success step for a fresh submission.
    pub fn start_over(&mut self) -> Result<WizardStep> {
        if self.step != WizardStep::Success {
            return Err(self.invalid("start over"));
        }
        self.step = WizardStep::SelectCategory;
        self.apply_preset();
        Ok(self.step)
    }

    /// Clears the form. Contact details are re-primed from the primary address or the
    /// profile. Only the item-detail flow keeps its item.
    fn reset(&mut self) {
        self.category = None;
        self.details = ItemDetails::default();
        if self.flow == FlowKind::ItemDetail {
            if let Some(preset) = &self.preset {
                self.category = Some(preset.category);
                self.details.item_name.clone_from(&preset.item_name);
            }
        } else {
            self.preset = None;
        }
        self.contact = ContactFields::primed(&self.addresses, &self.fallback, &self.default_country);
        self.contact_primed = true;
        self.selected_address_id = select_default_address(&self.addresses);
        self.use_new_address_form = false;
    }
}
