pub mod sms_image;
pub mod upload;
