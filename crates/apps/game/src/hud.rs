/// Score and clock shown to the player
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub time_remaining: f32,
    /// Most recent pick-up bonus, for the "+N s" flash
    pub last_time_bonus: f32,
}

impl Hud {
    pub fn new(round_seconds: f32) -> Self {
        Self {
            time_remaining: round_seconds,
            ..Self::default()
        }
    }

    pub fn reset(&mut self, round_seconds: f32) {
        *self = Self::new(round_seconds);
    }

    /// Count the clock down, stopping at zero
    pub fn tick(&mut self, dt: f32) {
        self.time_remaining = (self.time_remaining - dt).max(0.0);
    }

    pub fn add_time_bonus(&mut self, seconds: f32) {
        self.last_time_bonus = seconds;
        self.time_remaining += seconds;
    }

    pub fn is_time_up(&self) -> bool {
        self.time_remaining <= 0.0
    }
}
