//! Audio capture and waveform encoding.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod device;
pub mod session;
pub mod wav;
