pub mod backup;
pub mod datetime;
pub mod label_encoder;
