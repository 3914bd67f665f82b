//! Location invariant of in-person sessions.

use crate::domain::foundation::ValidationError;

/// An in-person session needs both an address and a ward, unless the class
/// default address is going to be resolved for it.
pub fn validate_address(
    is_online: bool,
    address: &str,
    ward_id: &str,
    use_class_default_address: bool,
) -> Result<(), ValidationError> {
    if is_online || use_class_default_address {
        return Ok(());
    }
    if address.trim().is_empty() {
        return Err(ValidationError::empty_field("address"));
    }
    if ward_id.trim().is_empty() {
        return Err(ValidationError::empty_field("ward_id"));
    }
    Ok(())
}
