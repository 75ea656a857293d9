//! Error type shared by every fleet operation.

use thiserror::Error;

/// Convenience alias for results produced by the fleet core.
pub type FleetResult<T> = Result<T, FleetError>;

/// Failures raised by single-vehicle operations, the registry and the factory.
#[derive(Debug, Error)]
pub enum FleetError {
    /// Bad argument, empty identifier, non-positive amount or malformed record field.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// A vehicle with the same identifier is already registered.
    #[error("vehicle with ID {0} already exists")]
    DuplicateIdentifier(String),
    /// Removal of an identifier that is not registered.
    #[error("vehicle with ID {0} not found")]
    NotFound(String),
    /// Passenger, cargo or load limit exceeded.
    #[error("overload: {0}")]
    Overload(String),
    /// Consumption exceeds the fuel stored in the tank.
    #[error("insufficient fuel for {id}: needed {needed:.2}, available {available:.2}")]
    InsufficientFuel {
        /// Identifier of the vehicle that ran dry.
        id: String,
        /// Fuel the operation required.
        needed: f64,
        /// Fuel that was in the tank.
        available: f64,
    },
    /// The factory has no parser registered for the kind tag.
    #[error("unknown vehicle type: {0}")]
    UnknownKind(String),
    /// The record stream itself could not be read or written.
    #[error("record stream I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl FleetError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    pub(crate) fn overload(message: impl Into<String>) -> Self {
        Self::Overload(message.into())
    }
}
