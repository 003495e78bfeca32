pub mod asset;
pub mod booking;
pub mod partner;
