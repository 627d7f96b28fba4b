pub mod custom_urls;
pub mod payments;
pub mod qr_images;
