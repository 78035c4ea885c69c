pub mod chat;
pub mod note;
pub mod user;

pub use chat::{Chat, Message};
pub use note::Note;
pub use user::User;
