#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use relay_cursor::memory::InMemoryExecutor;
use relay_cursor::{CursorKey, SortSpec, Value, ValueKind};

/// Blog post fixture. Creation times repeat in groups of three so the slug
/// tie-breaker matters.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    pub id: i64,
    pub created: DateTime<Utc>,
    pub slug: String,
    pub category: String,
}

impl relay_cursor::Record for Post {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::I64(self.id)),
            "created" => Some(Value::DateTime(self.created)),
            "slug" => Some(Value::from(self.slug.as_str())),
            "category" => Some(Value::from(self.category.as_str())),
            _ => None,
        }
    }

    fn field_kind(name: &str) -> Option<ValueKind> {
        match name {
            "id" => Some(ValueKind::I64),
            "created" => Some(ValueKind::DateTime),
            "slug" | "category" => Some(ValueKind::String),
            _ => None,
        }
    }
}

pub const POSTS: i64 = 50;

/// Posts 1..=50; every third post is in category "Foo", the rest in "Bar".
#[must_use]
pub fn posts() -> Vec<Post> {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    // Reverse insertion order so the executor has to sort.
    (1..=POSTS)
        .rev()
        .map(|id| Post {
            id,
            created: base + Duration::minutes((id - 1).div_euclid(3)),
            slug: format!("post-{id:02}"),
            category: if id % 3 == 0 { "Foo" } else { "Bar" }.to_owned(),
        })
        .collect()
}

#[must_use]
pub fn executor() -> InMemoryExecutor<Post> {
    InMemoryExecutor::new(posts())
}

/// `+created,+slug`
#[must_use]
pub fn by_created() -> SortSpec {
    "+created,+slug".parse().unwrap()
}

/// Cursor of post `id` under [`by_created`].
#[must_use]
pub fn cursor_of(id: i64) -> String {
    let post = posts().into_iter().find(|p| p.id == id).unwrap();
    CursorKey::new(vec![Value::DateTime(post.created), Value::from(post.slug)]).encode()
}

#[must_use]
pub fn ids<'a>(rows: impl IntoIterator<Item = &'a Post>) -> Vec<i64> {
    rows.into_iter().map(|p| p.id).collect()
}
