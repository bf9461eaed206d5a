//! Development seed data.
//!
//! [`run`] empties the todo table and inserts [`dataset`] in its place.
//! Both steps share one transaction, so a failure leaves the previous rows
//! untouched.

use crate::sink::ErrorSink;
use crate::store::{NewTodo, Priority, StoreError, TodoStore};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("seeding failed: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of a seed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub deleted: u64,
    pub created: u64,
}

const SEED_TODOS: [(&str, &str, Priority, bool); 8] = [
    (
        "Nuxt 3のディレクトリ構造を理解する",
        "pages、components、composablesの使い分けを学ぶ",
        Priority::High,
        false,
    ),
    (
        "TanStack Vue Queryでデータフェッチを実装",
        "useQuery、useMutationの使い方をマスターする",
        Priority::High,
        true,
    ),
    (
        "Piniaで状態管理",
        "グローバルな状態管理の実装パターンを学ぶ",
        Priority::Medium,
        false,
    ),
    (
        "VeeValidateとZodでフォームバリデーション",
        "型安全なフォームバリデーションを実装する",
        Priority::Medium,
        true,
    ),
    (
        "Vitestでユニットテストを書く",
        "コンポーネントとコンポーザブルのテストを実装する",
        Priority::Low,
        false,
    ),
    (
        "PlaywrightでE2Eテスト",
        "実際のユーザーフローをテストする",
        Priority::Low,
        false,
    ),
    (
        "Prismaでデータベース連携",
        "SQLiteを使ってCRUD操作を実装する",
        Priority::High,
        false,
    ),
    (
        "VueUseで便利なコンポーザブルを活用",
        "useFetch、useStorage等を使いこなす",
        Priority::Medium,
        false,
    ),
];

/// The fixed seed records.
pub fn dataset() -> Vec<NewTodo> {
    SEED_TODOS
        .iter()
        .map(|&(title, description, priority, completed)| {
            NewTodo::new(title)
                .description(description)
                .priority(priority)
                .completed(completed)
        })
        .collect()
}

/// Replaces all todos with the seed records.
///
/// # Errors
///
/// Store failures are reported to `sink` and returned. Nothing is
/// committed in that case.
pub async fn run(store: &TodoStore, sink: &dyn ErrorSink) -> Result<SeedReport, SeedError> {
    tracing::info!("Start seeding...");
    let todos = dataset();

    match store.replace_all(&todos).await {
        Ok((deleted, created)) => {
            tracing::info!(deleted, "Created {created} todos");
            tracing::info!("Seeding finished.");
            Ok(SeedReport { deleted, created })
        }
        Err(e) => {
            sink.error(&e, Some("seed"), "replacing todos");
            Err(e.into())
        }
    }
}
