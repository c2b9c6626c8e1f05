//! Result type alias for Cruncher
//!
//! This module provides a convenient Result type alias that uses CruncherError
//! as the error type.

use super::errors::CruncherError;

/// Result type alias for Cruncher operations
///
/// # Examples
///
/// ```
/// use cruncher::domain::result::Result;
/// use cruncher::domain::errors::CruncherError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(CruncherError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CruncherError>;
