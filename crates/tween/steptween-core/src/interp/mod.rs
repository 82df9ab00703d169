//! Interpolation helpers and easing curves.
//!
//! Playback eases normalized time first and then blends component-wise.

pub mod ease;
pub mod functions;

pub use ease::{cubic_bezier, ease_in, ease_in_out, ease_out, linear, Ease};
pub use functions::{lerp, lerp_value, lerp_vec3};
