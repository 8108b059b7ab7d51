//! Account view: an identity together with its contact profile.

use super::user::{EmailAddress, FullName, User, Username};
use super::validation::{FieldErrors, optional_text, optional_url};

const TITLE_MAX: usize = 100;
const LOCATION_MAX: usize = 100;
const PHONE_MAX: usize = 20;

/// Contact fields stored alongside every identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub title: String,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub phone: String,
}

/// Identity plus contact profile, as returned by the account endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub user: User,
    pub contact: ContactDetails,
}

/// Raw partial-update fields as received from a client.
#[derive(Debug, Clone, Default)]
pub struct AccountPatchInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
}

/// Validated partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    pub username: Option<Username>,
    pub email: Option<EmailAddress>,
    pub full_name: Option<FullName>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
}

impl AccountPatch {
    /// Validate the supplied fields only.
    pub fn try_new(input: AccountPatchInput) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::default();
        let mut patch = Self::default();

        if let Some(raw) = input.username {
            patch.username = errors.check("username", Username::new(raw));
        }
        if let Some(raw) = input.email {
            patch.email = errors.check("email", EmailAddress::new(raw));
        }
        if let Some(raw) = input.full_name {
            patch.full_name = errors.check("fullName", FullName::new(raw));
        }
        if let Some(raw) = input.title {
            patch.title = errors.check("title", optional_text(&raw, TITLE_MAX));
        }
        if let Some(raw) = input.bio {
            patch.bio = Some(raw.trim().to_owned());
        }
        if let Some(raw) = input.location {
            patch.location = errors.check("location", optional_text(&raw, LOCATION_MAX));
        }
        if let Some(raw) = input.website {
            patch.website = errors.check("website", optional_url(&raw));
        }
        if let Some(raw) = input.phone {
            patch.phone = errors.check("phone", optional_text(&raw, PHONE_MAX));
        }

        errors.into_result(patch)
    }

    /// Whether the patch touches identity (user table) columns.
    pub fn touches_identity(&self) -> bool {
        self.username.is_some() || self.email.is_some() || self.full_name.is_some()
    }

    /// Merge the contact fields into `contact`.
    pub fn apply_contact(&self, contact: &mut ContactDetails) {
        let slots = [
            (&self.title, &mut contact.title),
            (&self.bio, &mut contact.bio),
            (&self.location, &mut contact.location),
            (&self.website, &mut contact.website),
            (&self.phone, &mut contact.phone),
        ];
        for (update, slot) in slots {
            if let Some(value) = update {
                slot.clone_from(value);
            }
        }
    }
}
