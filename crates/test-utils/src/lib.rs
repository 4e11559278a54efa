//! Test support for the velocity-grid workspace.
//!
//! - [`generators`]: synthetic N/E/U layers and Gravsoft text
//! - [`fixtures`]: reference extents and known realignment results
//! - [`paths`]: workspace paths and temp files
//!
//! Pull it in as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use generators::*;
pub use paths::*;

/// Asserts `|left - right| <= tolerance`, comparing as `f64`.
///
/// NaN on either side always fails, so a cell that silently turned into NaN
/// cannot pass as "close enough".
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(0.777_51_f32, 0.777_512, 1e-5);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let (left, right, tolerance) = ($left as f64, $right as f64, $tolerance as f64);
        let diff = (left - right).abs();
        assert!(
            diff <= tolerance,
            "assertion failed: {} ≈ {}\n  left: {:?}\n right: {:?}\n  diff: {:?} (tolerance {:?})",
            stringify!($left),
            stringify!($right),
            left,
            right,
            diff,
            tolerance
        );
    }};
}

/// Component-wise [`assert_approx_eq!`] on (North, East, Up) triples.
///
/// ```ignore
/// use test_utils::assert_neu_approx_eq;
///
/// assert_neu_approx_eq!((v.x, v.y, v.z), (0.7775, 2.1262, -0.2680), 1e-4);
/// ```
#[macro_export]
macro_rules! assert_neu_approx_eq {
    (($n1:expr, $e1:expr, $u1:expr), ($n2:expr, $e2:expr, $u2:expr), $tolerance:expr) => {{
        $crate::assert_approx_eq!($n1, $n2, $tolerance);
        $crate::assert_approx_eq!($e1, $e2, $tolerance);
        $crate::assert_approx_eq!($u1, $u2, $tolerance);
    }};
}
