#![cfg(feature = "sqlite")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use relay_cursor::{
    ConnectionArgs, CursorError, CursorKey, Error, OrderedQueryExecutor, Predicate, SortSpec, Value,
    ValueKind,
};
use relay_cursor_db::{BuildError, DbAdapterError, FieldKind, FieldMap, SeaOrmExecutor};
use sea_orm::{
    ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};

mod post {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "posts")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub rank: i64,
        pub slug: String,
        pub category: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

const POSTS: i64 = 50;

async fn setup() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    // One shared connection: every pooled connection would get its own in-memory database.
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let conn = Database::connect(opts).await.unwrap();

    conn.execute_unprepared(
        "CREATE TABLE posts (
id INTEGER PRIMARY KEY NOT NULL,
rank INTEGER NOT NULL,
slug TEXT NOT NULL,
category TEXT NOT NULL
)",
    )
    .await
    .unwrap();

    // Ranks repeat in groups of three; slug breaks the ties.
    let rows = (1..=POSTS).rev().map(|id| post::ActiveModel {
        id: Set(id),
        rank: Set((id - 1).div_euclid(3)),
        slug: Set(format!("post-{id:02}")),
        category: Set(if id % 3 == 0 { "Foo" } else { "Bar" }.to_owned()),
    });
    post::Entity::insert_many(rows).exec(&conn).await.unwrap();

    conn
}

fn field_map() -> FieldMap<post::Entity> {
    FieldMap::<post::Entity>::new()
        .insert("id", post::Column::Id, FieldKind::I64)
        .insert("rank", post::Column::Rank, FieldKind::I64)
        .insert("slug", post::Column::Slug, FieldKind::String)
        .insert("category", post::Column::Category, FieldKind::String)
}

fn order() -> SortSpec {
    "+rank,+slug".parse().unwrap()
}

fn cursor_of(id: i64) -> String {
    CursorKey::new(vec![
        Value::I64((id - 1).div_euclid(3)),
        Value::from(format!("post-{id:02}")),
    ])
    .encode()
}

fn ids(rows: impl IntoIterator<Item = post::Model>) -> Vec<i64> {
    rows.into_iter().map(|m| m.id).collect()
}

#[tokio::test]
async fn first_page_from_sqlite() {
    // Arrange
    let conn = setup().await;
    let executor = SeaOrmExecutor::new(&conn, field_map());

    // Act
    let page = executor
        .paginate(order())
        .build(&ConnectionArgs::forward(10))
        .unwrap()
        .resolve()
        .await
        .unwrap();

    // Assert
    assert!(page.page_info.has_next_page);
    assert!(!page.page_info.has_previous_page);
    assert_eq!(page.page_info.end_cursor, Some(cursor_of(10)));
    assert_eq!(ids(page.into_nodes()), (1..=10).collect::<Vec<_>>());
}

#[tokio::test]
async fn bounded_windows_from_sqlite() {
    let conn = setup().await;
    let executor = SeaOrmExecutor::new(&conn, field_map());
    let window = |args: ConnectionArgs| args.with_after(cursor_of(11)).with_before(cursor_of(16));

    let head = executor
        .paginate(order())
        .build(&window(ConnectionArgs::forward(2)))
        .unwrap()
        .resolve()
        .await
        .unwrap();
    let tail = executor
        .paginate(order())
        .build(&window(ConnectionArgs::backward(2)))
        .unwrap()
        .resolve()
        .await
        .unwrap();

    assert!(head.page_info.has_next_page && head.page_info.has_previous_page);
    assert!(tail.page_info.has_next_page && tail.page_info.has_previous_page);
    assert_eq!(ids(head.into_nodes()), [12, 13]);
    assert_eq!(ids(tail.into_nodes()), [14, 15]);
}

#[tokio::test]
async fn filtered_walk_from_sqlite() {
    let conn = setup().await;
    let executor = SeaOrmExecutor::new(&conn, field_map());
    let mut seen = Vec::new();
    let mut after: Option<String> = None;

    loop {
        let mut args = ConnectionArgs::forward(4);
        if let Some(cursor) = after.take() {
            args = args.with_after(cursor);
        }
        let page = executor
            .paginate(order())
            .filter(Predicate::eq("category", "Foo"))
            .build(&args)
            .unwrap()
            .resolve()
            .await
            .unwrap();

        let more = page.page_info.has_next_page;
        after = page.page_info.end_cursor.clone();
        seen.extend(ids(page.into_nodes()));
        if !more {
            break;
        }
    }

    assert_eq!(seen, (1..=16).map(|n| n * 3).collect::<Vec<_>>());
}

#[tokio::test]
async fn count_up_to_is_bounded() {
    let conn = setup().await;
    let executor = SeaOrmExecutor::new(&conn, field_map());

    assert_eq!(executor.count_up_to(&Predicate::Always, 5).await.unwrap(), 5);
    assert_eq!(executor.count_up_to(&Predicate::Always, 500).await.unwrap(), 50);
    assert_eq!(executor.count_up_to(&Predicate::Never, 5).await.unwrap(), 0);
    assert_eq!(
        executor
            .count_up_to(&Predicate::eq("category", "Foo"), 100)
            .await
            .unwrap(),
        16
    );
    assert_eq!(executor.count_up_to(&Predicate::Always, 0).await.unwrap(), 0);
}

#[tokio::test]
async fn scope_restricts_every_query() {
    let conn = setup().await;
    let executor = SeaOrmExecutor::new(&conn, field_map())
        .scoped(post::Entity::find().filter(post::Column::Category.eq("Bar")));

    let page = executor
        .paginate(order())
        .build(&ConnectionArgs::backward(3))
        .unwrap()
        .resolve()
        .await
        .unwrap();

    assert!(page.page_info.has_previous_page);
    assert!(!page.page_info.has_next_page);
    assert_eq!(ids(page.into_nodes()), [47, 49, 50]);
}

#[tokio::test]
async fn unmapped_sort_field_surfaces_as_data_source_error() {
    let conn = setup().await;
    let executor = SeaOrmExecutor::new(&conn, field_map());

    let err = executor
        .paginate("+nope".parse().unwrap())
        .build(&ConnectionArgs::forward(1))
        .unwrap()
        .resolve()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DataSource(_)));
    assert!(matches!(
        err.downcast_data_source::<DbAdapterError>(),
        Some(DbAdapterError::Build(BuildError::UnknownField(f))) if f == "nope"
    ));
}

#[tokio::test]
async fn cursor_with_wrong_value_kinds_is_rejected_before_querying() {
    let conn = setup().await;
    let executor = SeaOrmExecutor::new(&conn, field_map());
    let swapped = CursorKey::new(vec![Value::from("post-03"), Value::I64(0)]).encode();

    let err = executor
        .paginate(order())
        .build(&ConnectionArgs::forward(5).with_after(swapped))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::MalformedCursor(CursorError::KindMismatch {
            index: 0,
            expected: ValueKind::I64,
            got: ValueKind::String,
        })
    ));
}
