//! PIN gate in front of each participant's assignment.
//!
//! PINs are kept and compared as plain strings. The gate stops people from
//! peeking at each other's assignment by accident; it is not authentication.

use thiserror::Error;

use crate::Participant;

pub const PIN_MIN_LEN: usize = 4;
pub const PIN_MAX_LEN: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("PIN must be 4 to 8 characters")]
    InvalidPin,
    #[error("PIN has already been set")]
    PinAlreadySet,
    #[error("no PIN has been set yet")]
    PinNotSet,
    #[error("wrong PIN")]
    WrongPin,
}

pub fn validate_pin(pin: &str) -> Result<(), GateError> {
    if (PIN_MIN_LEN..=PIN_MAX_LEN).contains(&pin.chars().count()) {
        Ok(())
    } else {
        Err(GateError::InvalidPin)
    }
}

impl Participant {
    pub fn has_pin(&self) -> bool {
        self.pin.is_some()
    }

    /// First access: stores the PIN and marks the participant as having seen
    /// their assignment. A PIN can be set exactly once.
    pub fn set_pin(&mut self, pin: &str) -> Result<(), GateError> {
        if self.pin.is_some() {
            return Err(GateError::PinAlreadySet);
        }
        validate_pin(pin)?;
        self.pin = Some(pin.to_string());
        self.has_accessed = true;
        Ok(())
    }

    /// Later accesses. A mismatch leaves the participant untouched.
    pub fn unlock(&mut self, pin: &str) -> Result<(), GateError> {
        let expected = self.pin.as_deref().ok_or(GateError::PinNotSet)?;
        if expected != pin {
            return Err(GateError::WrongPin);
        }
        self.has_accessed = true;
        Ok(())
    }
}
