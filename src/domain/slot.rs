use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// All bookable slots are fixed half-hour intervals identified by their
/// "HH:MM" start time. Slots are derived from a ground's operating
/// hours on demand and never persisted on their own.
pub const SLOT_MINUTES: u32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotView {
    pub start_time: String,
    pub status: SlotStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Booked,
}

/// Minutes since midnight for a strict "HH:MM" string.
fn minutes_of(time: &str) -> Option<u32> {
    let bytes = time.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    let hours: u32 = time[..2].parse().ok()?;
    let minutes: u32 = time[3..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

fn format_minutes(total: u32) -> String {
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Enumerate the slot start times inside an operating window.
/// `to` is exclusive; the window is truncated to whole slots.
pub fn generate_slots(from: &str, to: &str) -> Result<Vec<String>> {
    let start = minutes_of(from)
        .ok_or_else(|| AppError::InvalidRange(format!("Invalid opening time: {}", from)))?;
    let end = minutes_of(to)
        .ok_or_else(|| AppError::InvalidRange(format!("Invalid closing time: {}", to)))?;

    if end <= start {
        return Err(AppError::InvalidRange(format!(
            "Closing time {} must be after opening time {}",
            to, from
        )));
    }

    let slots = (0..(end - start) / SLOT_MINUTES)
        .map(|i| format_minutes(start + i * SLOT_MINUTES))
        .collect();

    Ok(slots)
}

/// Mark each slot available or booked. A slot is booked iff its start
/// time appears among the claimed start times for that ground and date;
/// with every booking on the same fixed granularity, string equality is
/// the whole overlap check.
pub fn annotate(slots: Vec<String>, booked: &HashSet<String>) -> Vec<SlotView> {
    slots
        .into_iter()
        .map(|start_time| {
            let status = if booked.contains(&start_time) {
                SlotStatus::Booked
            } else {
                SlotStatus::Available
            };
            SlotView { start_time, status }
        })
        .collect()
}
