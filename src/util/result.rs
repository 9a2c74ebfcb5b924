use crate::Degrees;
use std::result;
use thiserror::Error;

pub type MountResult<T> = result::Result<T, MountError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MountError {
    /// Missing or unusable configuration. Fatal at startup.
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    /// The motor link kept returning unusable position data
    #[error("Could not read from motor link after {tries} tries: {message}")]
    LinkRead { tries: u64, message: String },
    /// The motor link refused or failed to deliver a command
    #[error("Motor link rejected command: {0}")]
    LinkCommand(String),
    /// Lead time iteration for an equatorial target did not settle
    #[error("Lead time did not converge after {0} iterations")]
    Convergence(usize),
    /// The job's worker task died before reporting
    #[error("Job worker exited abnormally: {0}")]
    WorkerLost(String),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub fn check_dec(dec: Degrees) -> MountResult<()> {
    if (-90. ..=90.).contains(&dec) {
        Ok(())
    } else {
        Err(MountError::InvalidValue(format!(
            "Declination of {} is not valid",
            dec
        )))
    }
}

/// Right ascension here is in degrees
pub fn check_ra(ra: Degrees) -> MountResult<()> {
    if ra.is_finite() {
        Ok(())
    } else {
        Err(MountError::InvalidValue(format!(
            "Right Ascension of {} is not valid",
            ra
        )))
    }
}

pub fn check_alt(alt: Degrees) -> MountResult<()> {
    if (-90. ..=90.).contains(&alt) {
        Ok(())
    } else {
        Err(MountError::InvalidValue(format!(
            "Altitude of {} is not valid",
            alt
        )))
    }
}

/// Azimuth may be given on any turn; only non-finite values are rejected
pub fn check_az(az: Degrees) -> MountResult<()> {
    if az.is_finite() {
        Ok(())
    } else {
        Err(MountError::InvalidValue(format!("Azimuth {} is not valid", az)))
    }
}
