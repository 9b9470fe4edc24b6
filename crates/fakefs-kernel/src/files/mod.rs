//! The virtual files served by fakefs.
//!
//! | name       | handler            | mode |
//! |------------|--------------------|------|
//! | `tyme`     | [`TimeMessage`]    | 0444 |
//! | `backtalk` | [`Backtalk`]       | 0444 |
//! | `i-ching`  | [`Hexagram`]       | 0444 |
//! | `rot13`    | [`TransformBuffer`]| 0666 |
//! | `honeypot` | [`Honeypot`]       | 0666 |
//! | `sat.jpg`  | [`FetchCache`]     | 0444 |

pub mod generators;
pub mod honeypot;
pub mod rot13;
pub mod satellite;

pub use generators::{Backtalk, Hexagram, TimeMessage};
pub use honeypot::Honeypot;
pub use rot13::TransformBuffer;
pub use satellite::{CachePolicy, FetchCache};

pub const TYME: &str = "tyme";
pub const BACKTALK: &str = "backtalk";
pub const I_CHING: &str = "i-ching";
pub const ROT13: &str = "rot13";
pub const HONEYPOT: &str = "honeypot";
pub const SAT: &str = "sat.jpg";
