//! Game step machine and its legal transitions.

use std::fmt;

use thiserror::Error;

/// Discrete phases a room's game moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStep {
    /// Players gather and toggle readiness.
    #[default]
    Lobby,
    /// Each player picks candidates from the full catalog.
    Draft,
    /// Players vote among the pooled candidates.
    Voting,
    /// The scripted winner reveal is running.
    Announce,
    /// The winner and tally are displayed.
    Results,
}

impl GameStep {
    /// Display name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            GameStep::Lobby => "Lobby",
            GameStep::Draft => "Draft",
            GameStep::Voting => "Voting",
            GameStep::Announce => "Announce",
            GameStep::Results => "Results",
        }
    }
}

impl fmt::Display for GameStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Events that can be applied to the step machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Host starts the game from the lobby.
    StartGame,
    /// Every player has submitted a draft.
    DraftCompleted,
    /// Voting ended in a tie that must be replayed.
    TieDetected,
    /// Voting produced a single winner.
    WinnerDecided,
    /// The reveal sequence ran to completion.
    RevealFinished,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The step the machine was in when the invalid event was received.
    pub from: GameStep,
    /// The event that cannot be applied from this step.
    pub event: GameEvent,
}

/// Forward-only step machine; the only self-loop is Voting on a tie.
#[derive(Debug, Clone, Default)]
pub struct StepMachine {
    step: GameStep,
    version: usize,
}

impl StepMachine {
    /// Machine in the lobby step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step.
    pub fn step(&self) -> GameStep {
        self.step
    }

    /// Number of transitions applied so far.
    pub fn version(&self) -> usize {
        self.version
    }

    /// Apply `event`, returning the new step.
    pub fn apply(&mut self, event: GameEvent) -> Result<GameStep, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.step = next;
        self.version += 1;
        Ok(next)
    }

    fn compute_transition(&self, event: GameEvent) -> Result<GameStep, InvalidTransition> {
        let next = match (self.step, event) {
            (GameStep::Lobby, GameEvent::StartGame) => GameStep::Draft,
            (GameStep::Draft, GameEvent::DraftCompleted) => GameStep::Voting,
            (GameStep::Voting, GameEvent::TieDetected) => GameStep::Voting,
            (GameStep::Voting, GameEvent::WinnerDecided) => GameStep::Announce,
            (GameStep::Announce, GameEvent::RevealFinished) => GameStep::Results,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}
