//! Face-mesh and hand landmark indices the pipeline reads.

/// Outer lip boundary, lower arc then upper arc, as one closed polygon.
pub const LIPS_OUTER: [usize; 21] = [
    61, 146, 91, 181, 84, 17, 314, 405, 321, 375, 291, // lower
    409, 270, 269, 267, 0, 37, 39, 40, 185, 61, // upper
];

/// Inner lip boundary (the mouth opening) in the same winding.
pub const LIPS_INNER: [usize; 21] = [
    78, 95, 88, 178, 87, 14, 317, 402, 318, 324, 308, // lower
    415, 310, 311, 312, 13, 82, 81, 80, 191, 78, // upper
];

/// Hand landmark used as the cursor.
pub const INDEX_FINGER_TIP: usize = 8;

