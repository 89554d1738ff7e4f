use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::AppResult,
    store::{
        postgres::{PgOwned, PgRepo},
        ListFilter, ScopedRepo,
    },
    transactions::repo_types::{DateRange, Summary, Transaction, TransactionFilter},
};

/// Transaction storage: the scoped operations plus aggregation.
#[async_trait]
pub trait TransactionRepo: ScopedRepo<Transaction> {
    /// Income and expense totals over live rows of `user_id` within `range`.
    async fn summary(&self, user_id: Uuid, range: &DateRange) -> AppResult<Summary>;
}

#[async_trait]
impl ScopedRepo<Transaction> for PgRepo<Transaction> {
    async fn insert(&self, t: &Transaction) -> AppResult<Transaction> {
        let sql = format!(
            r#"
            INSERT INTO transactions
                (id, user_id, category_id, amount, kind, description, date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            Transaction::COLUMNS
        );
        let row = sqlx::query_as::<_, Transaction>(&sql)
            .bind(t.id)
            .bind(t.user_id)
            .bind(t.category_id)
            .bind(t.amount)
            .bind(t.kind)
            .bind(&t.description)
            .bind(t.date)
            .bind(t.created_at)
            .bind(t.updated_at)
            .fetch_one(self.db())
            .await?;
        Ok(row)
    }

    async fn find(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Transaction>> {
        self.fetch_scoped(id, user_id).await
    }

    async fn list(&self, user_id: Uuid, filter: &TransactionFilter) -> AppResult<Vec<Transaction>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM transactions WHERE user_id = ",
            Transaction::COLUMNS
        ));
        qb.push_bind(user_id).push(" AND deleted_at IS NULL");

        if let Some(kind) = filter.kind {
            qb.push(" AND kind = ").push_bind(kind);
        }
        if let Some(category_id) = filter.category_id {
            qb.push(" AND category_id = ").push_bind(category_id);
        }
        if let Some(start) = filter.range.start {
            qb.push(" AND date >= ").push_bind(start);
        }
        if let Some(end) = filter.range.end {
            qb.push(" AND date <= ").push_bind(end);
        }

        qb.push(" ORDER BY date DESC, created_at DESC");
        if let Some(limit) = filter.limit() {
            qb.push(" LIMIT ").push_bind(limit);
        }
        if filter.offset() > 0 {
            qb.push(" OFFSET ").push_bind(filter.offset());
        }

        let rows = qb
            .build_query_as::<Transaction>()
            .fetch_all(self.db())
            .await?;
        Ok(rows)
    }

    async fn update(&self, t: &Transaction) -> AppResult<Option<Transaction>> {
        let sql = format!(
            r#"
            UPDATE transactions
               SET category_id = $3, amount = $4, kind = $5, description = $6,
                   date = $7, updated_at = $8
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            RETURNING {}
            "#,
            Transaction::COLUMNS
        );
        let row = sqlx::query_as::<_, Transaction>(&sql)
            .bind(t.id)
            .bind(t.user_id)
            .bind(t.category_id)
            .bind(t.amount)
            .bind(t.kind)
            .bind(&t.description)
            .bind(t.date)
            .bind(t.updated_at)
            .fetch_optional(self.db())
            .await?;
        Ok(row)
    }

    async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> AppResult<bool> {
        self.soft_delete_scoped(id, user_id).await
    }
}

#[async_trait]
impl TransactionRepo for PgRepo<Transaction> {
    async fn summary(&self, user_id: Uuid, range: &DateRange) -> AppResult<Summary> {
        let row = sqlx::query_as::<_, Summary>(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE kind = 'income'), 0)::float8  AS total_income,
                COALESCE(SUM(amount) FILTER (WHERE kind = 'expense'), 0)::float8 AS total_expense,
                (COALESCE(SUM(amount) FILTER (WHERE kind = 'income'), 0)
                  - COALESCE(SUM(amount) FILTER (WHERE kind = 'expense'), 0))::float8 AS net_balance
            FROM transactions
            WHERE user_id = $1
              AND deleted_at IS NULL
              AND ($2::timestamptz IS NULL OR date >= $2)
              AND ($3::timestamptz IS NULL OR date <= $3)
            "#,
        )
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(self.db())
        .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{
            repo::{PgUserRepo, UserRepo},
            repo_types::User,
        },
        categories::repo_types::Category,
        transactions::repo_types::TransactionKind,
    };
    use sqlx::PgPool;
    use time::{macros::datetime, OffsetDateTime};

    const DAY1: OffsetDateTime = datetime!(2024-01-01 12:00 UTC);
    const DAY2: OffsetDateTime = datetime!(2024-01-02 12:00 UTC);

    async fn seed_owner(pool: &PgPool) -> (Uuid, Uuid) {
        let now = OffsetDateTime::now_utc();
        let user = PgUserRepo::new(pool.clone())
            .insert(&User {
                id: Uuid::new_v4(),
                email: format!("{}@example.com", Uuid::new_v4()),
                password_hash: "x".into(),
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                created_at: now,
                updated_at: now,
                deleted_at: None,
            })
            .await
            .unwrap();
        let category = PgRepo::<Category>::new(pool.clone())
            .insert(&Category {
                id: Uuid::new_v4(),
                user_id: user.id,
                name: "General".into(),
                description: String::new(),
                color: "#007bff".into(),
                created_at: now,
                updated_at: now,
                deleted_at: None,
            })
            .await
            .unwrap();
        (user.id, category.id)
    }

    fn tx(user_id: Uuid, category_id: Uuid, kind: TransactionKind, amount: f64, date: OffsetDateTime) -> Transaction {
        let now = OffsetDateTime::now_utc();
        Transaction {
            id: Uuid::new_v4(),
            user_id,
            category_id,
            amount,
            kind,
            description: String::new(),
            date,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
    async fn summary_aggregates_live_rows_in_range(pool: PgPool) {
        let repo = PgRepo::<Transaction>::new(pool.clone());
        let (user, cat) = seed_owner(&pool).await;
        repo.insert(&tx(user, cat, TransactionKind::Expense, 50.0, DAY1)).await.unwrap();
        repo.insert(&tx(user, cat, TransactionKind::Income, 1000.0, DAY2)).await.unwrap();
        let gone = repo
            .insert(&tx(user, cat, TransactionKind::Income, 7.0, DAY1))
            .await
            .unwrap();
        assert!(repo.soft_delete(gone.id, user).await.unwrap());

        let all = repo.summary(user, &DateRange::default()).await.unwrap();
        assert_eq!(all, Summary::new(1000.0, 50.0));

        let day1 = DateRange {
            start: Some(datetime!(2024-01-01 0:00 UTC)),
            end: Some(datetime!(2024-01-01 23:59:59 UTC)),
        };
        assert_eq!(repo.summary(user, &day1).await.unwrap(), Summary::new(0.0, 50.0));

        let nobody = repo.summary(Uuid::new_v4(), &DateRange::default()).await.unwrap();
        assert_eq!(nobody, Summary::default());
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
    async fn list_filters_by_kind_and_pages_newest_first(pool: PgPool) {
        let repo = PgRepo::<Transaction>::new(pool.clone());
        let (user, cat) = seed_owner(&pool).await;
        for (kind, amount, date) in [
            (TransactionKind::Expense, 1.0, DAY1),
            (TransactionKind::Income, 2.0, DAY2),
            (TransactionKind::Expense, 3.0, DAY2),
            (TransactionKind::Expense, 4.0, datetime!(2023-12-31 12:00 UTC)),
        ] {
            repo.insert(&tx(user, cat, kind, amount, date)).await.unwrap();
        }

        let expenses = TransactionFilter {
            kind: Some(TransactionKind::Expense),
            ..Default::default()
        };
        let amounts: Vec<f64> = repo
            .list(user, &expenses)
            .await
            .unwrap()
            .iter()
            .map(|t| t.amount)
            .collect();
        assert_eq!(amounts, [3.0, 1.0, 4.0]);

        let paged = TransactionFilter {
            kind: Some(TransactionKind::Expense),
            limit: Some(1),
            offset: Some(1),
            ..Default::default()
        };
        let page = repo.list(user, &paged).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].amount, 1.0);

        assert!(repo.list(Uuid::new_v4(), &TransactionFilter::default()).await.unwrap().is_empty());
    }
}
