/// Smallest distance between two interpolated stamps, in pixels.
pub const MIN_SPACE_PIXEL: f32 = 0.5;

/// Backward offset applied to the newest sample so stamps never pile up
/// at the live pointer position.
pub const LAG_DISTANCE: f32 = 5.0;

/// Points drawn per scheduler tick, and stamps between full composites.
pub const RENDER_BATCH_SIZE: usize = 3000;

/// Weight of the tangent used to place the single Bezier control point.
pub const CONTROL_POINT_RATIO: f32 = 0.25;

/// Parameter step when walking a Bezier curve for equidistant points.
pub const BEZIER_T_STEP: f32 = 0.001;

/// Pressure reported when no pressure source is active.
pub const NEUTRAL_PRESSURE: f32 = 0.5;
