pub mod error;
pub mod events;
pub mod message;
pub mod notification;
pub mod room;
pub mod session;

pub use error::{Result, WireError};
pub use events::{ClientEvent, ServerEvent};
pub use message::{DeliveryStatus, Message};
pub use notification::Notification;
pub use room::RoomKey;
pub use session::{Role, Session, UserId};
