//! steptween-api-core: the capability surface a timeline drives (engine-agnostic).
//!
//! The timeline engine never talks to a simulator directly. Hosts implement
//! [`World`] over whatever transport they use and hand it to the engine.

pub mod units;
pub mod value;
pub mod world;
pub mod write_ops;

pub use units::{deg_to_rad, rad_to_deg};
pub use value::{Channel, Value, ValueKind};
pub use world::{read_channel, wait, write_channel, TargetHandle, World, WorldError};
pub use write_ops::WriteOp;
