//! Action Vector
//!
//! The normalized per-tick input contract. Keyboard, touch and CPU sources all
//! boil down to the same packed held-button byte; edge pulses are derived from
//! consecutive snapshots so a press is only ever seen on one tick.

use serde::{Serialize, Deserialize};

// =============================================================================
// BUTTONS
// =============================================================================

/// Held buttons for a single tick (packed bits).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Buttons(pub u8);

impl Buttons {
    /// Move left
    pub const FLAG_LEFT: u8 = 0x01;
    /// Move right
    pub const FLAG_RIGHT: u8 = 0x02;
    /// Up / jump
    pub const FLAG_UP: u8 = 0x04;
    /// Down / crouch / fast-fall / drop-through
    pub const FLAG_DOWN: u8 = 0x08;
    /// Guard
    pub const FLAG_GUARD: u8 = 0x10;
    /// Light attack
    pub const FLAG_LIGHT: u8 = 0x20;
    /// Heavy attack
    pub const FLAG_HEAVY: u8 = 0x40;
    /// Special attack
    pub const FLAG_SPECIAL: u8 = 0x80;

    /// Nothing held.
    pub const NONE: Self = Self(0);

    /// Create from raw flag bits.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Builder: add a flag.
    #[inline]
    pub const fn with(self, flag: u8) -> Self {
        Self(self.0 | flag)
    }

    /// Set or clear a flag.
    #[inline]
    pub fn set(&mut self, flag: u8, held: bool) {
        if held {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }

    /// Is the flag set?
    #[inline]
    pub fn has(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// No buttons held.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Bits that are set in `self` but not in `prev` (false -> true edges).
    #[inline]
    pub fn rising_since(self, prev: Buttons) -> Buttons {
        Buttons(self.0 & !prev.0)
    }
}

// =============================================================================
// ACTION VECTOR
// =============================================================================

/// One tick of input for one fighter: held state plus rising-edge pulses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionVector {
    /// Buttons currently held
    pub held: Buttons,
    /// Buttons that went from released to held this tick
    pub pressed: Buttons,
}

impl ActionVector {
    /// Idle vector.
    pub const IDLE: Self = Self {
        held: Buttons::NONE,
        pressed: Buttons::NONE,
    };

    /// Build from explicit held + pressed sets.
    #[inline]
    pub const fn new(held: Buttons, pressed: Buttons) -> Self {
        Self { held, pressed }
    }

    /// Build from the previous and current held snapshots.
    #[inline]
    pub fn from_snapshots(prev: Buttons, held: Buttons) -> Self {
        Self {
            held,
            pressed: held.rising_since(prev),
        }
    }

    /// Left held.
    #[inline]
    pub fn left(&self) -> bool {
        self.held.has(Buttons::FLAG_LEFT)
    }

    /// Right held.
    #[inline]
    pub fn right(&self) -> bool {
        self.held.has(Buttons::FLAG_RIGHT)
    }

    /// Up held.
    #[inline]
    pub fn up(&self) -> bool {
        self.held.has(Buttons::FLAG_UP)
    }

    /// Down held.
    #[inline]
    pub fn down(&self) -> bool {
        self.held.has(Buttons::FLAG_DOWN)
    }

    /// Guard held.
    #[inline]
    pub fn guard(&self) -> bool {
        self.held.has(Buttons::FLAG_GUARD)
    }

    /// Light held.
    #[inline]
    pub fn light(&self) -> bool {
        self.held.has(Buttons::FLAG_LIGHT)
    }

    /// Heavy held.
    #[inline]
    pub fn heavy(&self) -> bool {
        self.held.has(Buttons::FLAG_HEAVY)
    }

    /// Special held.
    #[inline]
    pub fn special(&self) -> bool {
        self.held.has(Buttons::FLAG_SPECIAL)
    }

    /// Up went down this tick.
    #[inline]
    pub fn jump_pressed(&self) -> bool {
        self.pressed.has(Buttons::FLAG_UP)
    }

    /// Light went down this tick.
    #[inline]
    pub fn light_pressed(&self) -> bool {
        self.pressed.has(Buttons::FLAG_LIGHT)
    }

    /// Heavy went down this tick.
    #[inline]
    pub fn heavy_pressed(&self) -> bool {
        self.pressed.has(Buttons::FLAG_HEAVY)
    }

    /// Special went down this tick.
    #[inline]
    pub fn special_pressed(&self) -> bool {
        self.pressed.has(Buttons::FLAG_SPECIAL)
    }

    /// Guard went down this tick.
    #[inline]
    pub fn guard_pressed(&self) -> bool {
        self.pressed.has(Buttons::FLAG_GUARD)
    }

    /// Horizontal intent: -1, 0 or +1. Opposing directions cancel.
    #[inline]
    pub fn horizontal(&self) -> f32 {
        match (self.left(), self.right()) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    /// Same vector with left and right swapped (confusion).
    pub fn mirrored(self) -> Self {
        fn swap(b: Buttons) -> Buttons {
            let mut out = b;
            out.set(Buttons::FLAG_LEFT, b.has(Buttons::FLAG_RIGHT));
            out.set(Buttons::FLAG_RIGHT, b.has(Buttons::FLAG_LEFT));
            out
        }
        Self {
            held: swap(self.held),
            pressed: swap(self.pressed),
        }
    }
}

// =============================================================================
// EDGE DETECTOR
// =============================================================================

/// Derives pulses from consecutive held snapshots.
#[derive(Clone, Debug, Default)]
pub struct EdgeDetector {
    prev: Buttons,
}

impl EdgeDetector {
    /// Fresh detector (nothing considered held).
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current held snapshot and get this tick's vector.
    pub fn next(&mut self, held: Buttons) -> ActionVector {
        let vector = ActionVector::from_snapshots(self.prev, held);
        self.prev = held;
        vector
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_flags() {
        let mut b = Buttons::NONE.with(Buttons::FLAG_LEFT).with(Buttons::FLAG_GUARD);
        assert!(b.has(Buttons::FLAG_LEFT));
        assert!(b.has(Buttons::FLAG_GUARD));
        assert!(!b.has(Buttons::FLAG_RIGHT));

        b.set(Buttons::FLAG_LEFT, false);
        assert!(!b.has(Buttons::FLAG_LEFT));
        assert!(!b.is_empty());
    }

    #[test]
    fn test_edge_pulses_only_on_rising_tick() {
        let mut edges = EdgeDetector::new();
        let up = Buttons::NONE.with(Buttons::FLAG_UP);

        let first = edges.next(up);
        assert!(first.up());
        assert!(first.jump_pressed());

        // Still held: no new pulse
        let second = edges.next(up);
        assert!(second.up());
        assert!(!second.jump_pressed());

        // Release, press again
        let released = edges.next(Buttons::NONE);
        assert!(!released.up());
        assert!(!released.jump_pressed());
        assert!(edges.next(up).jump_pressed());
    }

    #[test]
    fn test_horizontal_and_mirror() {
        let left = ActionVector::from_snapshots(Buttons::NONE, Buttons::NONE.with(Buttons::FLAG_LEFT));
        assert_eq!(left.horizontal(), -1.0);

        let mirrored = left.mirrored();
        assert!(mirrored.right());
        assert!(!mirrored.left());
        assert_eq!(mirrored.horizontal(), 1.0);
        // Pulses are mirrored too
        assert!(mirrored.pressed.has(Buttons::FLAG_RIGHT));

        let both = ActionVector::new(
            Buttons::NONE.with(Buttons::FLAG_LEFT).with(Buttons::FLAG_RIGHT),
            Buttons::NONE,
        );
        assert_eq!(both.horizontal(), 0.0);
    }
}
