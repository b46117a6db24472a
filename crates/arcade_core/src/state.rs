//! Tiny per-entity state machines. Transitions are total: every
//! (state, event) pair has a defined result.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayerState {
    #[default]
    Alive,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    Killed,
    DeathAnimationFinished,
}

impl PlayerState {
    pub fn on(self, event: PlayerEvent) -> Self {
        match (self, event) {
            (_, PlayerEvent::Killed) => Self::Dead,
            (Self::Dead, PlayerEvent::DeathAnimationFinished) => Self::Alive,
            (Self::Alive, PlayerEvent::DeathAnimationFinished) => Self::Alive,
        }
    }

    pub fn is_dead(self) -> bool {
        self == Self::Dead
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GoalState {
    #[default]
    Open,
    Claimed,
}

/// What happens when the player lands on a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalOutcome {
    /// The goal was free and is now taken.
    Claimed,
    /// Somebody is already sitting there.
    Occupied,
}

impl GoalState {
    pub fn touch(self) -> (Self, GoalOutcome) {
        match self {
            Self::Open => (Self::Claimed, GoalOutcome::Claimed),
            Self::Claimed => (Self::Claimed, GoalOutcome::Occupied),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_dies_and_recovers() {
        let s = PlayerState::Alive.on(PlayerEvent::Killed);
        assert!(s.is_dead());
        assert_eq!(s.on(PlayerEvent::Killed), PlayerState::Dead);
        assert_eq!(s.on(PlayerEvent::DeathAnimationFinished), PlayerState::Alive);
    }

    #[test]
    fn animation_end_while_alive_is_ignored() {
        assert_eq!(
            PlayerState::Alive.on(PlayerEvent::DeathAnimationFinished),
            PlayerState::Alive
        );
    }

    #[test]
    fn goal_claims_once() {
        let (s, first) = GoalState::Open.touch();
        assert_eq!(first, GoalOutcome::Claimed);
        let (s, second) = s.touch();
        assert_eq!(second, GoalOutcome::Occupied);
        assert_eq!(s, GoalState::Claimed);
    }
}
