//! Shared fixtures: a store seeded once with the birthdays data set.
#![allow(dead_code)]

use std::sync::LazyLock;
use chrono::NaiveDate;
use futures::executor::block_on;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use docmeth::{
    backend::StoreBackendBuilder,
    collection::Collection,
    memory::InMemoryStore,
    record::Persistent,
};

static STORE: LazyLock<InMemoryStore> = LazyLock::new(|| {
    init_tracing();

    let store = InMemoryStore::new();

    block_on(async {
        Collection::new("birthdays", store.clone())
            .insert(birthdays())
            .await
            .expect("seed birthdays");
        Collection::new("visits", store.clone())
            .insert([
                Visit { id: 1, person_id: 2, year: 2019 },
                Visit { id: 2, person_id: 2, year: 2021 },
                Visit { id: 3, person_id: 3, year: 2021 },
            ])
            .await
            .expect("seed visits");
        Collection::new("ghosts", store.clone())
            .insert([Birthday { id: 0, name: "Nobody".into(), born: None }])
            .await
            .expect("seed ghosts");
    });

    store
});

static STRICT_STORE: LazyLock<InMemoryStore> = LazyLock::new(|| {
    block_on(InMemoryStore::builder().strict_collections(true).build()).expect("strict store")
});

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Handle on the seeded store; clones share data.
pub fn store() -> InMemoryStore {
    STORE.clone()
}

pub fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn birthdays() -> Vec<Birthday> {
    vec![
        Birthday { id: 1, name: "Jonathan Ive".into(), born: date(1967, 2, 27) },
        Birthday { id: 2, name: "Linus Torvalds".into(), born: date(1969, 12, 28) },
        Birthday { id: 3, name: "Hayao Miyazaki".into(), born: date(1941, 1, 5) },
    ]
}

pub fn names<'a>(rows: impl IntoIterator<Item = &'a Birthday>) -> Vec<&'a str> {
    rows.into_iter().map(|row| row.name.as_str()).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Birthday {
    pub id: i64,
    pub name: String,
    pub born: Option<NaiveDate>,
}

impl Birthday {
    pub fn with_id(id: i64) -> Self {
        Self { id, ..Default::default() }
    }
}

impl Persistent for Birthday {
    fn collection(&self) -> Collection {
        Collection::new("birthdays", store())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: i64,
    pub person_id: i64,
    pub year: i32,
}

impl Persistent for Visit {
    fn collection(&self) -> Collection {
        Collection::new("visits", store())
    }
}

/// A record without any identifier field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Nameless {
    pub name: String,
}

impl Persistent for Nameless {
    fn collection(&self) -> Collection {
        Collection::new("ghosts", store())
    }
}

/// A record whose collection lives on a store that rejects unknown collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stray {
    pub id: i64,
}

impl Persistent for Stray {
    fn collection(&self) -> Collection {
        Collection::new("strays", STRICT_STORE.clone())
    }
}
