//! Domain type definitions

mod address;
mod card;
mod entity;
mod health;
mod links;
mod user;

pub use address::Address;
pub use card::{mask_card_number, Card};
pub use entity::EntityKind;
pub use health::{Health, STATUS_ERR, STATUS_OK};
pub use links::{Href, Links};
pub use user::User;
