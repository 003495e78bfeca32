use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartnerId(pub String);

impl fmt::Display for PartnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Partner {
    /// Name shown to customers: the business name when one is registered.
    pub fn display_name(&self) -> &str {
        self.business_name.as_deref().filter(|name| !name.trim().is_empty()).unwrap_or(&self.name)
    }
}
