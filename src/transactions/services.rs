use std::{collections::HashMap, sync::Arc};

use anyhow::anyhow;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    categories::repo_types::Category,
    error::{AppError, AppResult},
    store::ScopedRepo,
    transactions::{
        repo::TransactionRepo,
        repo_types::{
            DateRange, Summary, Transaction, TransactionDetails, TransactionFilter,
            TransactionKind, TransactionPatch,
        },
    },
};

const FOREIGN_CATEGORY: &str = "category not found or does not belong to user";

pub struct NewTransaction {
    pub category_id: Uuid,
    pub amount: f64,
    pub kind: TransactionKind,
    pub description: Option<String>,
    pub date: OffsetDateTime,
}

#[derive(Clone)]
pub struct TransactionService {
    transactions: Arc<dyn TransactionRepo>,
    categories: Arc<dyn ScopedRepo<Category>>,
}

impl TransactionService {
    pub fn new(
        transactions: Arc<dyn TransactionRepo>,
        categories: Arc<dyn ScopedRepo<Category>>,
    ) -> Self {
        Self {
            transactions,
            categories,
        }
    }

    pub async fn create(&self, user_id: Uuid, new: NewTransaction) -> AppResult<TransactionDetails> {
        self.ensure_category(new.category_id, user_id).await?;

        let now = OffsetDateTime::now_utc();
        let tx = Transaction {
            id: Uuid::new_v4(),
            user_id,
            category_id: new.category_id,
            amount: new.amount,
            kind: new.kind,
            description: new.description.unwrap_or_default(),
            date: new.date,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let tx = self.transactions.insert(&tx).await?;
        info!(%user_id, transaction_id = %tx.id, kind = %tx.kind, "transaction created");

        self.refetch(tx.id, user_id).await
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &TransactionFilter,
    ) -> AppResult<Vec<TransactionDetails>> {
        let rows = self.transactions.list(user_id, filter).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let categories: HashMap<Uuid, Category> = self
            .categories
            .list(user_id, &())
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let details = rows
            .into_iter()
            .map(|transaction| TransactionDetails {
                category: categories.get(&transaction.category_id).cloned(),
                transaction,
            })
            .collect();
        Ok(details)
    }

    pub async fn get(&self, id: Uuid, user_id: Uuid) -> AppResult<TransactionDetails> {
        let tx = self.find(id, user_id).await?;
        self.attach(tx).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: TransactionPatch,
    ) -> AppResult<TransactionDetails> {
        let mut tx = self.find(id, user_id).await?;
        if let Some(category_id) = patch.category_id {
            self.ensure_category(category_id, user_id).await?;
        }

        patch.apply(&mut tx);
        tx.updated_at = OffsetDateTime::now_utc();

        self.transactions
            .update(&tx)
            .await?
            .ok_or(AppError::NotFound("transaction"))?;
        info!(%user_id, transaction_id = %id, "transaction updated");

        self.refetch(id, user_id).await
    }

    /// Idempotent: deleting a missing or foreign id succeeds without effect.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        if self.transactions.soft_delete(id, user_id).await? {
            info!(%user_id, transaction_id = %id, "transaction deleted");
        } else {
            debug!(%user_id, transaction_id = %id, "transaction delete matched no rows");
        }
        Ok(())
    }

    pub async fn summary(&self, user_id: Uuid, range: &DateRange) -> AppResult<Summary> {
        self.transactions.summary(user_id, range).await
    }

    async fn find(&self, id: Uuid, user_id: Uuid) -> AppResult<Transaction> {
        self.transactions
            .find(id, user_id)
            .await?
            .ok_or(AppError::NotFound("transaction"))
    }

    async fn attach(&self, transaction: Transaction) -> AppResult<TransactionDetails> {
        let category = self
            .categories
            .find(transaction.category_id, transaction.user_id)
            .await?;
        Ok(TransactionDetails {
            transaction,
            category,
        })
    }

    /// Reads back a row this request just wrote. A miss means it was deleted
    /// concurrently, which is a server-side failure rather than a 404.
    async fn refetch(&self, id: Uuid, user_id: Uuid) -> AppResult<TransactionDetails> {
        let tx = self
            .transactions
            .find(id, user_id)
            .await?
            .ok_or_else(|| anyhow!("transaction {id} vanished after write"))?;
        self.attach(tx).await
    }

    async fn ensure_category(&self, category_id: Uuid, user_id: Uuid) -> AppResult<()> {
        if self.categories.find(category_id, user_id).await?.is_none() {
            warn!(%user_id, %category_id, "transaction references foreign or missing category");
            return Err(AppError::InvalidReference(FOREIGN_CATEGORY));
        }
        Ok(())
    }
}
