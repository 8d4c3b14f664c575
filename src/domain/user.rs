//! Users and roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::status::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Client,
    Chef,
    Driver,
    Distributor,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Client,
        Role::Chef,
        Role::Driver,
        Role::Distributor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Client => "CLIENT",
            Role::Chef => "CHEF",
            Role::Driver => "DRIVER",
            Role::Distributor => "DISTRIBUTOR",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Client => "Client",
            Role::Chef => "Chef",
            Role::Driver => "Driver",
            Role::Distributor => "Distributor",
        }
    }

    /// Landing page after login
    pub fn home_path(self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Client => "/client",
            Role::Chef => "/chef",
            Role::Driver => "/driver",
            Role::Distributor => "/distributor",
        }
    }

    /// Whether this role may see prices and totals
    pub fn sees_prices(self) -> bool {
        matches!(self, Role::Admin | Role::Client | Role::Distributor)
    }

    /// Roles allowed to manage price lists
    pub fn manages_pricing(self) -> bool {
        matches!(self, Role::Admin | Role::Distributor)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Chef's station (only items of this group show on the production board)
    #[serde(default)]
    pub product_group: Option<String>,
    #[serde(default)]
    pub price_list_id: Option<String>,
    /// Distributor a client belongs to
    #[serde(default)]
    pub distributor_id: Option<String>,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}

/// Authenticated session returned by login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Admin/distributor user creation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributor_id: Option<String>,
}

impl NewUser {
    /// Basic shape checks done before the request leaves the browser-facing server
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".to_string());
        }
        if !super::is_plausible_email(&self.email) {
            return Err(format!("Invalid email address: {}", self.email));
        }
        if self.role == Role::Chef
            && self
                .product_group
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .is_empty()
        {
            return Err("Chefs need a product group".to_string());
        }
        Ok(())
    }
}
