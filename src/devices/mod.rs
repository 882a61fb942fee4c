//! Concrete device types built on [`crate::device::NetworkDevice`] (spec §4.F–J).

pub mod master;
pub mod playback;
pub mod playback_recording;
pub mod recording;
pub mod slave;
pub mod switch;

pub use master::FttMaster;
pub use playback::PlaybackDevice;
pub use playback_recording::PlaybackAndRecordingDevice;
pub use recording::RecordingDevice;
pub use slave::FttSlave;
pub use switch::Switch;
