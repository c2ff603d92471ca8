pub mod audio;
pub mod constants;
pub mod draw;
pub mod emitter;
pub mod error;
pub mod geometry;
pub mod mute;
pub mod object;
pub mod persist;
pub mod pick;
pub mod scene;
pub mod simplify;
pub mod spline;
pub mod sync;
pub mod trajectory;
pub mod zone;

pub use audio::*;
pub use error::*;
pub use geometry::Point3;
pub use scene::*;
