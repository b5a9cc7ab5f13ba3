/// Stored radius level of a session.
///
/// Starts at 1 and only grows until reset. It is deliberately not clamped
/// here: the settings builder clamps on read, so the stored value keeps
/// counting how often the user asked for more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadiusLevel(u32);

impl RadiusLevel {
    pub const INITIAL: u32 = 1;

    pub fn get(self) -> u32 {
        self.0
    }

    /// Increase by one and return the new level.
    pub fn increment(&mut self) -> u32 {
        self.0 = self.0.saturating_add(1);
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = Self::INITIAL;
    }

    pub fn is_initial(self) -> bool {
        self.0 == Self::INITIAL
    }
}

impl Default for RadiusLevel {
    fn default() -> Self {
        Self(Self::INITIAL)
    }
}
