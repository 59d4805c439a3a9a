use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named classification axis (department, cost center, ...). The ledger
/// exposes a fixed set of dimension slots; unused slots have an empty name
/// and `in_use = false`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FinancialDimension {
    pub id: u32,
    pub name: String,
    pub in_use: bool,
}

/// A code + description scoped to one dimension. Codes are unique within
/// their owning dimension, not globally.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DimensionValue {
    pub code: String,
    pub description: String,
}

/// A valid pairing of an account with one value per dimension slot. Keys are
/// the slot tags (`FD_1` .. `FD_8`); unused slots carry `None`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountCombination {
    pub account: String,
    pub dimensions: BTreeMap<String, Option<String>>,
}
