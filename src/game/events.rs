//! Presentation Events
//!
//! Everything a renderer, HUD or audio layer needs to react to is emitted as
//! a [`GameEvent`]. The simulation never reads these back.

use std::fmt;

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::state::PlayerId;

/// Named sound cue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundCue {
    /// Light attack swing
    Light,
    /// Heavy attack swing
    Heavy,
    /// Special / ultimate start
    Special,
    /// Jump or double jump
    Jump,
    /// Blocked hit or rejected special
    Block,
    /// Clean hit
    Hit,
    /// Knockout
    Ko,
}

/// Round wins as "p1-p2".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Player 1 wins
    pub p1: u32,
    /// Player 2 wins
    pub p2: u32,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.p1, self.p2)
    }
}

/// One fighter's HUD line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HudFighter {
    /// Character name
    pub name: String,
    /// Health / max health (0..=1)
    pub health: f32,
    /// Focus / focus max (0..=1)
    pub focus: f32,
    /// Round wins
    pub wins: u32,
}

/// HUD snapshot emitted once per playing tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    /// Player 1
    pub p1: HudFighter,
    /// Player 2
    pub p2: HudFighter,
    /// Seconds left (unused when the timer is disabled)
    pub timer: f32,
    /// Current round (1-based)
    pub round_index: u32,
    /// Wins needed to take the match
    pub rounds_to_win: u32,
    /// Best-of setting
    pub best_of: u32,
}

/// Event payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// A hit landed (spark + hitstop + shake)
    HitImpact {
        /// Who dealt it
        attacker: PlayerId,
        /// Where to draw the spark
        position: Vec2,
    },

    /// A fighter hit zero health
    Ko {
        /// Fighter that was knocked out
        loser: PlayerId,
        /// Fighter credited with the round
        winner: PlayerId,
    },

    /// Round timer ran out
    TimeOver {
        /// Higher-health fighter, `None` on a draw
        winner: Option<PlayerId>,
    },

    /// A round began
    RoundStarted {
        /// Round index (1-based)
        round: u32,
    },

    /// A round finished and another follows
    RoundOver {
        /// Score after the round
        score: Score,
    },

    /// Someone reached the rounds-to-win count
    MatchOver {
        /// Match winner
        winner: PlayerId,
        /// Winner's character name
        winner_name: String,
        /// Final score
        score: Score,
    },

    /// Banner text. An empty string clears the banner.
    Announce {
        /// Text
        text: String,
        /// Seconds to show it
        duration: f32,
    },

    /// Play a sound
    Sound {
        /// Cue
        cue: SoundCue,
    },

    /// HUD refresh
    Hud(HudSnapshot),
}

/// A game event stamped with the tick it happened on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Player most involved (for filtering)
    pub player_id: Option<PlayerId>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, data: GameEventData) -> Self {
        let player_id = match &data {
            GameEventData::HitImpact { attacker, .. } => Some(*attacker),
            GameEventData::Ko { loser, .. } => Some(*loser),
            GameEventData::TimeOver { winner } => *winner,
            GameEventData::MatchOver { winner, .. } => Some(*winner),
            _ => None,
        };

        Self {
            tick,
            player_id,
            data,
        }
    }

    /// Create hit impact event.
    pub fn hit_impact(tick: u32, attacker: PlayerId, position: Vec2) -> Self {
        Self::new(tick, GameEventData::HitImpact { attacker, position })
    }

    /// Create announce event.
    pub fn announce(tick: u32, text: impl Into<String>, duration: f32) -> Self {
        Self::new(
            tick,
            GameEventData::Announce {
                text: text.into(),
                duration,
            },
        )
    }

    /// Create sound event.
    pub fn sound(tick: u32, cue: SoundCue) -> Self {
        Self::new(tick, GameEventData::Sound { cue })
    }

    /// Create KO event.
    pub fn ko(tick: u32, loser: PlayerId) -> Self {
        Self::new(
            tick,
            GameEventData::Ko {
                loser,
                winner: loser.opponent(),
            },
        )
    }

    /// Create match over event.
    pub fn match_over(tick: u32, winner: PlayerId, winner_name: String, score: Score) -> Self {
        Self::new(
            tick,
            GameEventData::MatchOver {
                winner,
                winner_name,
                score,
            },
        )
    }

    /// Is this the banner-clear event?
    pub fn is_announce_clear(&self) -> bool {
        matches!(&self.data, GameEventData::Announce { text, .. } if text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_display() {
        assert_eq!(Score { p1: 1, p2: 0 }.to_string(), "1-0");
        assert_eq!(Score::default().to_string(), "0-0");
    }

    #[test]
    fn test_event_player_tagging() {
        let ko = GameEvent::ko(10, PlayerId::Two);
        assert_eq!(ko.player_id, Some(PlayerId::Two));
        assert!(matches!(ko.data, GameEventData::Ko { winner: PlayerId::One, .. }));

        let banner = GameEvent::announce(3, "Round 1", 1.0);
        assert_eq!(banner.player_id, None);
        assert!(!banner.is_announce_clear());
        assert!(GameEvent::announce(4, "", 0.0).is_announce_clear());
    }

    #[test]
    fn test_event_json() {
        let e = GameEvent::sound(5, SoundCue::Ko);
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"ko\""));
    }
}
