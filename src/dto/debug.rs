//! Operator snapshot of live rooms and the event fabric.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{dto::room::{RoomLimits, StepDto}, state::events::BusStats};

/// Read-only point-in-time view of every room.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DebugSnapshot {
    /// Live rooms ordered by name.
    pub rooms: Vec<DebugRoom>,
    /// Fabric counters at snapshot time.
    pub events: EventStats,
}

/// One room as seen by an operator.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DebugRoom {
    /// Room name.
    pub name: String,
    /// Current step.
    pub step: StepDto,
    /// Host username.
    pub host: String,
    /// Limits chosen at creation.
    pub limits: RoomLimits,
    /// Members in join order.
    pub players: Vec<DebugPlayer>,
    /// Candidate movie names of the current voting round.
    pub voting_movies: Vec<String>,
    /// Whether the reveal task is still running.
    pub reveal_running: bool,
}

/// One member as seen by an operator.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DebugPlayer {
    /// Display name.
    pub username: String,
    /// Lobby readiness flag.
    pub ready: bool,
    /// Draft picks held.
    pub draft_count: usize,
    /// Vote picks held.
    pub vote_count: usize,
    /// Draft locked in.
    pub has_finished_draft: bool,
    /// Ballot locked in.
    pub has_finished_voting: bool,
}

/// Event fabric counters.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct EventStats {
    /// Publish calls since startup.
    pub published: u64,
    /// Events lost by lagging subscribers.
    pub dropped: u64,
    /// Subjects with an open channel.
    pub subjects: usize,
}

impl From<BusStats> for EventStats {
    fn from(stats: BusStats) -> Self {
        Self {
            published: stats.published,
            dropped: stats.dropped,
            subjects: stats.subjects,
        }
    }
}
