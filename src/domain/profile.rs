/// Pony customization picked before the meadow starts.

use super::entity::{Rgb, PALETTE};

/// Soft limit on the display name, in characters.
pub const NAME_LIMIT: usize = 15;

pub const DEFAULT_NAME: &str = "Pony";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub color_index: usize,
}

impl Profile {
    pub fn new(name: &str, color_index: usize) -> Self {
        let mut p = Profile { name: String::new(), color_index: color_index % PALETTE.len() };
        for c in name.chars() {
            p.push_char(c);
        }
        p
    }

    /// Append a character unless the name is already at the limit.
    /// Returns false if the character was refused.
    pub fn push_char(&mut self, c: char) -> bool {
        if c.is_control() || self.name.chars().count() >= NAME_LIMIT {
            return false;
        }
        self.name.push(c);
        true
    }

    pub fn pop_char(&mut self) {
        self.name.pop();
    }

    /// Step through the swatches, wrapping at both ends.
    pub fn cycle_color(&mut self, delta: i32) {
        let n = PALETTE.len() as i32;
        self.color_index = (self.color_index as i32 + delta).rem_euclid(n) as usize;
    }

    pub fn color(&self) -> Rgb {
        PALETTE[self.color_index % PALETTE.len()]
    }

    /// Name shown above the pony; a blank entry falls back to the default.
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() { DEFAULT_NAME } else { trimmed }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Profile::new(DEFAULT_NAME, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_stops_at_limit() {
        let mut p = Profile::new("", 0);
        for c in "Sparkle Thunderhoof".chars() {
            p.push_char(c);
        }
        assert_eq!(p.name.chars().count(), NAME_LIMIT);
        assert_eq!(p.name, "Sparkle Thunder");
        assert!(!p.push_char('x'));
        p.pop_char();
        assert!(p.push_char('x'));
    }

    #[test]
    fn limit_counts_chars_not_bytes() {
        let p = Profile::new("Пони-пони-пони-пони", 0);
        assert_eq!(p.name.chars().count(), NAME_LIMIT);
    }

    #[test]
    fn color_cycles_both_ways() {
        let mut p = Profile::default();
        p.cycle_color(-1);
        assert_eq!(p.color_index, 7);
        p.cycle_color(2);
        assert_eq!(p.color_index, 1);
        assert_eq!(p.color(), PALETTE[1]);
    }

    #[test]
    fn blank_name_falls_back() {
        let p = Profile::new("   ", 3);
        assert_eq!(p.display_name(), DEFAULT_NAME);
        assert_eq!(Profile::new("Clover", 9).color_index, 1);
    }
}
