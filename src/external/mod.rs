pub mod cloudinary;
pub mod whatsapp;

pub use cloudinary::{CloudinaryHost, HostedAsset, MediaHost, UploadFile};
pub use whatsapp::{MessagingClient, MessagingError, NewTemplate};
