//! Millisecond stopwatch that works on wasm32 and natively
//!
//! On wasm32 the high-resolution `Performance` clock is used when available
//! (worker or window scope), falling back to `Date.now()`. Natively the
//! stopwatch sits on `std::time::Instant` so the request pipeline stays
//! testable with plain `#[test]`s.

#[cfg(target_arch = "wasm32")]
pub struct Stopwatch {
    start_ms: f64,
}

#[cfg(target_arch = "wasm32")]
impl Stopwatch {
    pub fn start() -> Self {
        Self { start_ms: now_ms() }
    }

    /// Milliseconds elapsed since `start`.
    pub fn elapsed_ms(&self) -> f64 {
        now_ms() - self.start_ms
    }
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

#[cfg(not(target_arch = "wasm32"))]
pub struct Stopwatch {
    start: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl Stopwatch {
    pub fn start() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds elapsed since `start`.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}
