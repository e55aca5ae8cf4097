//! `SeaORM` entities for `SqliteStore`.

pub mod address;
pub mod card;
pub mod customer;
