use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AddressId;
use crate::error::{Result, StorefrontError};

// ---------------------------------------------------------------------------
// Address: A saved shipping address owned by an authenticated user
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub area: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl Address {
    pub fn snapshot(&self) -> AddressSnapshot {
        AddressSnapshot {
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            area: self.area.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// NewAddress: Form payload, validated before submission
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewAddress {
    pub full_name: String,
    pub phone: String,
    pub area: String,
    pub city: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

impl NewAddress {
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("full_name", &self.full_name),
            ("phone", &self.phone),
            ("area", &self.area),
            ("city", &self.city),
            ("state", &self.state),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(StorefrontError::validation(field, "this field is required"));
            }
        }
        if !self
            .phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' '))
        {
            return Err(StorefrontError::validation(
                "phone",
                "phone number may only contain digits",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AddressSnapshot: Copy of an address stored on an order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSnapshot {
    pub full_name: String,
    pub phone: String,
    pub area: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub postal_code: Option<String>,
}
