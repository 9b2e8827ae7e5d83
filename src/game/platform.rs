//! Clock and randomness.
//!
//! The store never reads the clock or the RNG directly so tests can pin both.

pub trait Platform {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
    /// Uniform value in `[0, 1)`.
    fn random_unit(&mut self) -> f64;
}

/// `Date.now()` and `Math.random()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserPlatform;

impl Platform for BrowserPlatform {
    fn now_millis(&self) -> i64 {
        js_sys::Date::now() as i64
    }

    fn random_unit(&mut self) -> f64 {
        js_sys::Math::random()
    }
}

/// Fixed clock and a repeating list of random values.
#[derive(Debug, Clone)]
pub struct ScriptedPlatform {
    pub now: i64,
    rolls: Vec<f64>,
    cursor: usize,
}

impl ScriptedPlatform {
    pub fn new(now: i64, rolls: &[f64]) -> Self {
        Self {
            now,
            rolls: rolls.to_vec(),
            cursor: 0,
        }
    }
}

impl Default for ScriptedPlatform {
    fn default() -> Self {
        Self::new(0, &[0.0])
    }
}

impl Platform for ScriptedPlatform {
    fn now_millis(&self) -> i64 {
        self.now
    }

    fn random_unit(&mut self) -> f64 {
        if self.rolls.is_empty() {
            return 0.0;
        }
        let value = self.rolls[self.cursor % self.rolls.len()];
        self.cursor += 1;
        value
    }
}

/// Map a unit sample onto a die face in `1..=faces`.
pub fn die_face(unit: f64, faces: u8) -> u8 {
    let scaled = (unit.clamp(0.0, 1.0) * f64::from(faces)).floor() as u8;
    scaled.min(faces - 1) + 1
}
