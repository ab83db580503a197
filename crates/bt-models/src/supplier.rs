//! Supplier directory entry
//!
//! Table: suppliers. A supplier entry may exist without a login account;
//! `user_id` links the ones that have one.

use bt_core::traits::{Id, Identifiable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Id,
    pub name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    /// Names of the materials this supplier delivers
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub user_id: Option<Id>,
}

impl Supplier {
    pub fn supplies(&self, material_name: &str) -> bool {
        self.materials
            .iter()
            .any(|m| m.eq_ignore_ascii_case(material_name))
    }
}

impl Identifiable for Supplier {
    fn id(&self) -> &str {
        &self.id
    }
}
