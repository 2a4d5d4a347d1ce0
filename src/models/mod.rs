pub mod keluhan;
pub mod profile;
pub mod session;

use serde::{Deserialize, Deserializer};

/// Nullable columns come back as JSON `null`; read those as the type's
/// default instead of failing the whole row.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
