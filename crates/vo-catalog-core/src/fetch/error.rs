//! Errors from the remote-fetch boundary.

use std::time::Duration;

use snafu::prelude::*;

/// Errors raised by registries, services, and the fetch helpers.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FetchError {
    /// Sky coordinates out of range or not finite.
    #[snafu(display("Invalid sky position ra={ra_deg} dec={dec_deg} (degrees)"))]
    InvalidPosition {
        /// Right ascension as given.
        ra_deg: f64,
        /// Declination as given.
        dec_deg: f64,
    },

    /// Search radius must be finite and in (0, 180] degrees.
    #[snafu(display("Invalid search radius {radius_deg} deg"))]
    InvalidRadius {
        /// Radius as given.
        radius_deg: f64,
    },

    /// Unrecognized waveband name.
    #[snafu(display("Unknown waveband {name:?}"))]
    UnknownWaveband {
        /// Name as given.
        name: String,
    },

    /// A TAP query string was empty.
    #[snafu(display("Empty query for service {access_url}"))]
    EmptyQuery {
        /// Service URL.
        access_url: String,
    },

    /// The registry lookup failed.
    #[snafu(display("Registry search failed: {message}"))]
    Registry {
        /// Description of the failure.
        message: String,
    },

    /// A service answered with an error.
    #[snafu(display("Service {access_url} failed: {message}"))]
    Service {
        /// Service URL.
        access_url: String,
        /// Description of the failure.
        message: String,
    },

    /// The request could not be carried out (connection, protocol, decoding).
    #[snafu(display("Transport error talking to {access_url}: {source}"))]
    Transport {
        /// Service URL.
        access_url: String,
        /// Underlying client error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A service did not answer in time.
    #[snafu(display("Service {access_url} timed out after {after:?}"))]
    Timeout {
        /// Service URL.
        access_url: String,
        /// Configured limit.
        after: Duration,
    },
}
