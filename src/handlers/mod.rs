// Two tiers: public (no caller resolution) and protected (caller resolved by
// the actor middleware, access decided per handler by the policy).
pub mod protected;
pub mod public;

use crate::error::ApiError;

/// Path ids that are not integers can never match a row
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::not_found(not_found))
}
