//! Inventory aggregate and movement ledger types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Stock pool an adjustment applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum Channel {
    Physical = 0,
    Digital = 1,
}

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum Direction {
    Outbound = -1,
    Inbound = 1,
}

impl Direction {
    /// Signed unit factor applied to the available counter
    pub fn factor(self) -> i32 {
        self as i16 as i32
    }
}

/// One accepted, immutable change to available stock.
///
/// Rows are append-only: rejected adjustments never produce a movement, and
/// movements are only removed by cascade when the parent inventory is deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Movement {
    pub id: Uuid,
    pub inventory_id: Uuid,
    pub quantity: i32,
    pub direction: Direction,
    pub channel: Channel,
    pub reference: String,
    pub timestamp_utc: DateTime<Utc>,
}

/// Inventory aggregate: per-item counters for both channels.
///
/// Invariant after every mutation: `0 <= available <= total` per channel.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ItemInventory {
    pub id: Uuid,
    /// Catalog item this inventory tracks (foreign reference, not owned)
    pub item_ref: Uuid,
    pub physical_total: i32,
    pub physical_available: i32,
    pub digital_total: i32,
    pub digital_available: i32,
    pub created_utc: DateTime<Utc>,
    pub last_updated_utc: DateTime<Utc>,
}

impl ItemInventory {
    /// New inventory starts fully available on both channels
    pub fn new(item_ref: Uuid, physical_total: i32, digital_total: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            item_ref,
            physical_total,
            physical_available: physical_total,
            digital_total,
            digital_available: digital_total,
            created_utc: now,
            last_updated_utc: now,
        }
    }

    pub fn total(&self, channel: Channel) -> i32 {
        match channel {
            Channel::Physical => self.physical_total,
            Channel::Digital => self.digital_total,
        }
    }

    pub fn available(&self, channel: Channel) -> i32 {
        match channel {
            Channel::Physical => self.physical_available,
            Channel::Digital => self.digital_available,
        }
    }

    /// Guard for a prospective movement. Outbound requires enough available
    /// stock; inbound must not push available past the channel total.
    /// The inbound sum is widened to i64 so an absurd quantity cannot wrap
    /// around and slip past the comparison.
    pub fn can_move(&self, channel: Channel, direction: Direction, quantity: i32) -> bool {
        if quantity <= 0 {
            return false;
        }
        match direction {
            Direction::Outbound => self.available(channel) >= quantity,
            Direction::Inbound => {
                self.available(channel) as i64 + quantity as i64 <= self.total(channel) as i64
            }
        }
    }

    /// Apply an accepted movement to the counters.
    ///
    /// The guard in `can_move` is the caller's responsibility; this is the
    /// deterministic state update. The result is clamped to `[0, total]` and
    /// the return value reports whether clamping occurred, so a race-induced
    /// overshoot is surfaced to the caller instead of silently absorbed.
    #[must_use = "a clamped result indicates a guard violation and must be logged"]
    pub fn apply_movement(&mut self, movement: &Movement) -> bool {
        self.last_updated_utc = Utc::now();

        let total = self.total(movement.channel);
        let raw = self.available(movement.channel) as i64
            + movement.direction.factor() as i64 * movement.quantity as i64;
        let clamped = raw.clamp(0, total as i64) as i32;

        match movement.channel {
            Channel::Physical => self.physical_available = clamped,
            Channel::Digital => self.digital_available = clamped,
        }

        raw != clamped as i64
    }

    /// Set new channel totals, capping availability at the new totals.
    ///
    /// Shrinking a total below current availability silently caps the
    /// available count; this is explicit policy, not an error.
    pub fn set_totals(&mut self, physical_total: i32, digital_total: i32) {
        self.physical_total = physical_total;
        self.digital_total = digital_total;
        self.physical_available = self.physical_available.min(physical_total);
        self.digital_available = self.digital_available.min(digital_total);
        self.last_updated_utc = Utc::now();
    }

    /// Replay the movement ledger for one channel, starting from a fully
    /// available pool of `total`. Each step clamps exactly like
    /// `apply_movement`, so replaying all accepted movements reconstructs
    /// the current available count (assuming totals were not changed since
    /// creation). Used for audit and reconciliation.
    pub fn reconstruct_available<'a, I>(total: i32, channel: Channel, movements: I) -> i32
    where
        I: IntoIterator<Item = &'a Movement>,
    {
        movements
            .into_iter()
            .filter(|m| m.channel == channel)
            .fold(total as i64, |available, m| {
                (available + m.direction.factor() as i64 * m.quantity as i64)
                    .clamp(0, total as i64)
            }) as i32
    }
}
