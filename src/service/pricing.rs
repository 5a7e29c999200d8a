use crate::{
    domain::Ground,
    error::{AppError, Result},
};

/// Authoritative price for a slot selection, in cents. Slots are half
/// an hour, so the total is price-per-hour × slots ÷ 2; the division
/// happens once at the end so truncation cannot compound. Callers pass
/// a freshly loaded ground, never a browse-time snapshot, so the quote
/// reflects current pricing.
pub fn quote(ground: &Ground, sport_name: &str, slot_count: usize) -> Result<i64> {
    let sport = ground
        .sport(sport_name)
        .ok_or_else(|| AppError::SportNotFound(sport_name.to_string()))?;

    Ok(sport.price_per_hour_cents * slot_count as i64 / 2)
}
