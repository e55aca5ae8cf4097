//! `Database` implementation for `SqliteStore`.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, ModelTrait,
    QueryFilter, TransactionTrait,
};
use uuid::Uuid;

use users_core::error::{CoreError, CoreResult};
use users_core::traits::Database;
use users_core::types::{Address, Card, EntityKind, User};

use super::entity::{address, card, customer};
use super::{write_err, SqliteStore};

impl customer::Model {
    /// Convert a row into a domain `User` without attributes.
    fn into_user(self) -> User {
        User {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            username: self.username,
            password: self.password,
            salt: self.salt,
            id: self.id,
            ..Default::default()
        }
    }
}

impl address::Model {
    fn into_address(self) -> Address {
        Address {
            street: self.street,
            number: self.number,
            country: self.country,
            city: self.city,
            postcode: self.postcode,
            id: self.id,
            ..Default::default()
        }
    }
}

impl card::Model {
    fn into_card(self) -> Card {
        Card {
            long_num: self.long_num,
            expires: self.expires,
            ccv: self.ccv,
            id: self.id,
            ..Default::default()
        }
    }
}

fn customer_active_model(user: &User) -> customer::ActiveModel {
    customer::ActiveModel {
        id: Set(user.id.clone()),
        first_name: Set(user.first_name.clone()),
        last_name: Set(user.last_name.clone()),
        email: Set(user.email.clone()),
        username: Set(user.username.clone()),
        password: Set(user.password.clone()),
        salt: Set(user.salt.clone()),
    }
}

fn address_active_model(address: &Address, customer_id: &str) -> address::ActiveModel {
    address::ActiveModel {
        id: Set(address.id.clone()),
        customer_id: Set(customer_id.to_string()),
        street: Set(address.street.clone()),
        number: Set(address.number.clone()),
        country: Set(address.country.clone()),
        city: Set(address.city.clone()),
        postcode: Set(address.postcode.clone()),
    }
}

fn card_active_model(card: &Card, customer_id: &str) -> card::ActiveModel {
    card::ActiveModel {
        id: Set(card.id.clone()),
        customer_id: Set(customer_id.to_string()),
        long_num: Set(card.long_num.clone()),
        expires: Set(card.expires.clone()),
        ccv: Set(card.ccv.clone()),
    }
}

/// Reject ids that are not UUIDs before they reach a query.
fn check_id(id: &str) -> CoreResult<()> {
    Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| CoreError::InvalidId(id.to_string()))
}

fn query_err(what: &str) -> impl FnOnce(sea_orm::DbErr) -> CoreError + '_ {
    move |e| CoreError::StorageError(format!("Failed to query {what}: {e}"))
}

async fn begin<C: TransactionTrait<Transaction = DatabaseTransaction>>(db: &C) -> CoreResult<DatabaseTransaction> {
    db.begin()
        .await
        .map_err(|e| CoreError::StorageError(format!("Failed to begin transaction: {e}")))
}

async fn commit(txn: DatabaseTransaction, what: &str) -> CoreResult<()> {
    txn.commit()
        .await
        .map_err(|e| CoreError::StorageError(format!("Failed to commit {what}: {e}")))
}

fn address_stub(id: String) -> Address {
    Address {
        id,
        ..Default::default()
    }
}

fn card_stub(id: String) -> Card {
    Card {
        id,
        ..Default::default()
    }
}

async fn find_customer<C: ConnectionTrait>(db: &C, id: &str) -> CoreResult<customer::Model> {
    customer::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(query_err("customer"))?
        .ok_or_else(|| CoreError::not_found(EntityKind::Customers.as_str(), id))
}

async fn owned_addresses<C: ConnectionTrait>(db: &C, id: &str) -> CoreResult<Vec<address::Model>> {
    address::Entity::find()
        .filter(address::Column::CustomerId.eq(id))
        .all(db)
        .await
        .map_err(query_err("addresses"))
}

async fn owned_cards<C: ConnectionTrait>(db: &C, id: &str) -> CoreResult<Vec<card::Model>> {
    card::Entity::find()
        .filter(card::Column::CustomerId.eq(id))
        .all(db)
        .await
        .map_err(query_err("cards"))
}

#[async_trait]
impl Database for SqliteStore {
    async fn init(&self) -> CoreResult<()> {
        self.connect().await.map(|_| ())
    }

    async fn get_user_by_name(&self, name: &str) -> CoreResult<User> {
        let db = self.conn()?;
        let row = customer::Entity::find()
            .filter(customer::Column::Username.eq(name))
            .one(db)
            .await
            .map_err(query_err("customer"))?
            .ok_or_else(|| CoreError::not_found(EntityKind::Customers.as_str(), name))?;
        self.with_attribute_ids(row.into_user()).await
    }

    async fn get_user(&self, id: &str) -> CoreResult<User> {
        check_id(id)?;
        let row = find_customer(self.conn()?, id).await?;
        self.with_attribute_ids(row.into_user()).await
    }

    async fn get_users(&self) -> CoreResult<Vec<User>> {
        let db = self.conn()?;
        let rows = customer::Entity::find()
            .all(db)
            .await
            .map_err(query_err("customers"))?;

        let mut addresses: HashMap<String, Vec<Address>> = HashMap::new();
        for row in address::Entity::find()
            .all(db)
            .await
            .map_err(query_err("addresses"))?
        {
            addresses
                .entry(row.customer_id)
                .or_default()
                .push(address_stub(row.id));
        }
        let mut cards: HashMap<String, Vec<Card>> = HashMap::new();
        for row in card::Entity::find()
            .all(db)
            .await
            .map_err(query_err("cards"))?
        {
            cards.entry(row.customer_id).or_default().push(card_stub(row.id));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let mut user = row.into_user();
                user.addresses = addresses.remove(&user.id).unwrap_or_default();
                user.cards = cards.remove(&user.id).unwrap_or_default();
                user
            })
            .collect())
    }

    async fn create_user(&self, user: &mut User) -> CoreResult<()> {
        let db = self.conn()?;
        user.id = Uuid::new_v4().to_string();
        for address in &mut user.addresses {
            address.id = Uuid::new_v4().to_string();
        }
        for card in &mut user.cards {
            card.id = Uuid::new_v4().to_string();
        }

        let txn = begin(db).await?;
        customer::Entity::insert(customer_active_model(user))
            .exec(&txn)
            .await
            .map_err(|e| write_err(&e, &user.username, "create customer"))?;
        for address in &user.addresses {
            address::Entity::insert(address_active_model(address, &user.id))
                .exec(&txn)
                .await
                .map_err(|e| CoreError::StorageError(format!("Failed to create address: {e}")))?;
        }
        for card in &user.cards {
            card::Entity::insert(card_active_model(card, &user.id))
                .exec(&txn)
                .await
                .map_err(|e| CoreError::StorageError(format!("Failed to create card: {e}")))?;
        }

        commit(txn, "customer").await?;
        log::debug!("Created customer {}", user.id);
        Ok(())
    }

    async fn get_user_attributes(&self, user: &mut User) -> CoreResult<()> {
        let db = self.conn()?;
        user.addresses = owned_addresses(db, &user.id)
            .await?
            .into_iter()
            .map(address::Model::into_address)
            .collect();
        user.cards = owned_cards(db, &user.id)
            .await?
            .into_iter()
            .map(card::Model::into_card)
            .collect();
        Ok(())
    }

    async fn get_address(&self, id: &str) -> CoreResult<Address> {
        check_id(id)?;
        address::Entity::find_by_id(id)
            .one(self.conn()?)
            .await
            .map_err(query_err("address"))?
            .map(address::Model::into_address)
            .ok_or_else(|| CoreError::not_found(EntityKind::Addresses.as_str(), id))
    }

    async fn get_addresses(&self) -> CoreResult<Vec<Address>> {
        let rows = address::Entity::find()
            .all(self.conn()?)
            .await
            .map_err(query_err("addresses"))?;

        Ok(rows.into_iter().map(address::Model::into_address).collect())
    }

    async fn create_address(&self, address: &mut Address, user_id: &str) -> CoreResult<()> {
        check_id(user_id)?;
        let txn = begin(self.conn()?).await?;

        // Insert before checking the owner so the check runs under the write
        // lock. A concurrent customer delete either commits first (check
        // fails, row rolled back) or waits for this commit and cascades.
        let id = Uuid::new_v4().to_string();
        let mut row = address_active_model(address, user_id);
        row.id = Set(id.clone());
        address::Entity::insert(row)
            .exec(&txn)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to create address: {e}")))?;
        find_customer(&txn, user_id).await?;
        commit(txn, "address").await?;

        address.id = id;
        Ok(())
    }

    async fn get_card(&self, id: &str) -> CoreResult<Card> {
        check_id(id)?;
        card::Entity::find_by_id(id)
            .one(self.conn()?)
            .await
            .map_err(query_err("card"))?
            .map(card::Model::into_card)
            .ok_or_else(|| CoreError::not_found(EntityKind::Cards.as_str(), id))
    }

    async fn get_cards(&self) -> CoreResult<Vec<Card>> {
        let rows = card::Entity::find()
            .all(self.conn()?)
            .await
            .map_err(query_err("cards"))?;

        Ok(rows.into_iter().map(card::Model::into_card).collect())
    }

    async fn create_card(&self, card: &mut Card, user_id: &str) -> CoreResult<()> {
        check_id(user_id)?;
        let txn = begin(self.conn()?).await?;

        // Same write-then-check order as `create_address`.
        let id = Uuid::new_v4().to_string();
        let mut row = card_active_model(card, user_id);
        row.id = Set(id.clone());
        card::Entity::insert(row)
            .exec(&txn)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to create card: {e}")))?;
        find_customer(&txn, user_id).await?;
        commit(txn, "card").await?;

        card.id = id;
        Ok(())
    }

    async fn delete(&self, entity: &str, id: &str) -> CoreResult<()> {
        let kind =
            EntityKind::parse(entity).ok_or_else(|| CoreError::UnknownEntity(entity.to_string()))?;
        check_id(id)?;
        let db = self.conn()?;

        match kind {
            EntityKind::Customers => {
                // The customer row goes first so the transaction holds the
                // write lock before the attribute rows are swept.
                let txn = begin(db).await?;
                let removed = customer::Entity::delete_by_id(id)
                    .exec(&txn)
                    .await
                    .map_err(|e| {
                        CoreError::StorageError(format!("Failed to delete customer: {e}"))
                    })?;
                if removed.rows_affected == 0 {
                    return Err(CoreError::not_found(kind.as_str(), id));
                }
                address::Entity::delete_many()
                    .filter(address::Column::CustomerId.eq(id))
                    .exec(&txn)
                    .await
                    .map_err(|e| {
                        CoreError::StorageError(format!("Failed to delete addresses: {e}"))
                    })?;
                card::Entity::delete_many()
                    .filter(card::Column::CustomerId.eq(id))
                    .exec(&txn)
                    .await
                    .map_err(|e| CoreError::StorageError(format!("Failed to delete cards: {e}")))?;
                commit(txn, "delete").await?;
            }
            EntityKind::Addresses => {
                let row = address::Entity::find_by_id(id)
                    .one(db)
                    .await
                    .map_err(query_err("address"))?
                    .ok_or_else(|| CoreError::not_found(kind.as_str(), id))?;
                row.delete(db).await.map_err(|e| {
                    CoreError::StorageError(format!("Failed to delete address: {e}"))
                })?;
            }
            EntityKind::Cards => {
                let row = card::Entity::find_by_id(id)
                    .one(db)
                    .await
                    .map_err(query_err("card"))?
                    .ok_or_else(|| CoreError::not_found(kind.as_str(), id))?;
                row.delete(db)
                    .await
                    .map_err(|e| CoreError::StorageError(format!("Failed to delete card: {e}")))?;
            }
        }

        log::debug!("Deleted {kind} {id}");
        Ok(())
    }

    async fn ping(&self) -> CoreResult<()> {
        self.conn()?
            .ping()
            .await
            .map_err(|e| CoreError::StorageError(format!("SQLite ping failed: {e}")))
    }
}

impl SqliteStore {
    /// Fill `user` with id-only entries for every attribute row it owns.
    async fn with_attribute_ids(&self, mut user: User) -> CoreResult<User> {
        let db = self.conn()?;
        user.addresses = owned_addresses(db, &user.id)
            .await?
            .into_iter()
            .map(|row| address_stub(row.id))
            .collect();
        user.cards = owned_cards(db, &user.id)
            .await?
            .into_iter()
            .map(|row| card_stub(row.id))
            .collect();
        Ok(user)
    }
}
