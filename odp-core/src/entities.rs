//! The fixed entity-set allow-list
//!
//! The proxy exposes exactly these Northwind entity sets. Matching is exact
//! and case-sensitive; anything else is rejected at the router boundary.

/// Entity sets the proxy will relay
pub const ENTITY_SETS: [&str; 8] = [
    "Categories",
    "CustomerDemographics",
    "Customers",
    "Employees",
    "Order_Details",
    "Orders",
    "Products",
    "Regions",
];

/// Check whether a requested entity set is in the allow-list
pub fn is_allowed(name: &str) -> bool {
    ENTITY_SETS.contains(&name)
}

/// Allow-list rendered for client-facing error messages
pub fn allowed_list() -> String {
    ENTITY_SETS.join(", ")
}
