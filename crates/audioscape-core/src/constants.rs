// Shared tuning constants for path editing, playback and the audio graph.

// Paths
pub const CLOSURE_THRESHOLD: f64 = 40.0; // first/last distance below which a path loops
pub const MIN_PATH_POINTS: usize = 3;
pub const CURVE_SAMPLES: usize = 200; // insertion search and rendered polyline resolution
pub const ARC_LENGTH_DIVISIONS: usize = 200; // cumulative length table for point_at
pub const SPEED_ARC_SAMPLES: usize = 10; // arc-length samples used for the speed increment
pub const SIMPLIFY_TOLERANCE: f64 = 10.0; // freehand gesture simplification (world units)
pub const KNOT_EPSILON: f64 = 1e-4; // centripetal knot spacing considered degenerate

// Trajectory playback
pub const DEFAULT_MOVEMENT_SPEED: f64 = 5.0;
pub const DEFAULT_TRAJECTORY_CLOCK: f64 = 1.0;
pub const DEFAULT_MOVEMENT_DIRECTION: f64 = -1.0; // start at the end, travel toward t = 0

// Emitters
pub const CONE_WIDTH_PER_SPREAD: f64 = 90.0;
pub const CONE_LENGTH_PER_VOLUME: f64 = 50.0;
pub const CONE_BASE_LENGTH: f64 = 50.0;
pub const CONE_OUTER_ANGLE_MULTIPLIER: f64 = 1.5; // outer cone = inner cone * multiplier
pub const CONE_OUTER_GAIN: f64 = 0.05;
pub const PANNER_REF_DISTANCE: f64 = 50.0;
pub const POLE_EPSILON: f64 = 1e-9; // horizontal length treated as straight up/down
pub const DEFAULT_CONE_VOLUME: f64 = 1.0;
pub const DEFAULT_CONE_SPREAD: f64 = 0.5;
pub const MAX_IMPORTED_ANGLE: f64 = 1.0e6; // radians; larger cone angles are rejected on import

// Objects and zones
pub const DEFAULT_OBJECT_VOLUME: f64 = 1.0;
pub const DEFAULT_ZONE_VOLUME: f64 = 1.0;
pub const ZONE_PLAYING_GAIN: f64 = 0.3; // zone gain while the listener is inside

// Picking
pub const PICK_OBJECT_RADIUS: f64 = 150.0;
pub const PICK_TRAJECTORY_POINT_RADIUS: f64 = 20.0;
pub const PICK_ZONE_POINT_RADIUS: f64 = 15.0;
pub const PICK_CURVE_RADIUS: f64 = 10.0;

// Listener
pub const LISTENER_FORWARD: [f64; 3] = [0.0, 0.0, -1.0];
pub const LISTENER_UP: [f64; 3] = [0.0, -1.0, 0.0];
