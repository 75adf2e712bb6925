//! Unified operator capability surface for inbound adapters.

use super::configuration::ConfigurationOperator;
use super::serve::ServeOperator;
use super::session::SessionOperator;

/// Unified operator capability surface consumed by inbound adapters.
pub trait OperatorPort: ConfigurationOperator + ServeOperator + SessionOperator {}

impl<T> OperatorPort for T where T: ConfigurationOperator + ServeOperator + SessionOperator {}
