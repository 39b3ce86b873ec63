//! API endpoint handlers.
//!
//! One module per resource. Record handlers only ever expose rows owned by
//! the authenticated doctor; anything else reads as missing.

pub mod analytics;
pub mod auth;
pub mod health;
pub mod medications;
pub mod patients;
pub mod prescriptions;

use crate::api::error::{not_found_message, ApiError};
use crate::store::{Collection, Record};

/// Fetch `id` from `collection` if it belongs to `doctor_id`.
pub(crate) async fn owned<T: Record>(
    collection: &Collection<'_, T>,
    doctor_id: i64,
    id: i64,
) -> Result<T, ApiError> {
    let record = collection.get(id).await?;
    if record.doctor_id() != doctor_id {
        tracing::debug!(entity = T::ENTITY, id, doctor_id, "Record owned by another doctor");
        return Err(ApiError::NotFound(not_found_message(T::ENTITY)));
    }
    Ok(record)
}
