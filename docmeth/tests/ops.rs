mod common;

use docmeth::prelude::*;

use common::{Birthday, Nameless, Stray, birthdays, names};

#[tokio::test]
async fn one_fills_record_by_its_id() {
    let mut birthday = Birthday::with_id(1);

    ops::one(&mut birthday).await.unwrap();

    assert_eq!(birthday, birthdays()[0]);
    assert_eq!(birthday.name, "Jonathan Ive");
}

#[tokio::test]
async fn one_reports_missing_rows_and_leaves_record_alone() {
    let mut birthday = Birthday { id: 42, name: "Unchanged".into(), born: None };

    let result = ops::one(&mut birthday).await;

    assert!(matches!(result, Err(StoreError::DocumentNotFound(ref name)) if name == "birthdays"));
    assert_eq!(birthday.name, "Unchanged");
}

#[tokio::test]
async fn one_needs_an_identifier() {
    let mut nameless = Nameless::default();

    let result = ops::one(&mut nameless).await;

    assert!(matches!(result, Err(StoreError::NoIdentifierField { matches: 0, .. })));
}

#[tokio::test]
async fn one_by_matches_regardless_of_identifier() {
    let mut birthday = Birthday::with_id(99);

    ops::one_by(&mut birthday, [Filter::eq("name", "Linus Torvalds")]).await.unwrap();

    assert_eq!(birthday.id, 2);
    assert_eq!(birthday, birthdays()[1]);
}

#[tokio::test]
async fn one_by_without_conditions_takes_the_first_stored_row() {
    let mut birthday = Birthday::default();

    ops::one_by(&mut birthday, []).await.unwrap();

    assert_eq!(birthday.id, 1);
}

#[tokio::test]
async fn all_by_keeps_storage_order() {
    let mut rows = vec![Birthday::with_id(7)];

    ops::all_by(&Birthday::default(), &mut rows, [Filter::cond("id <=", 2).unwrap()])
        .await
        .unwrap();

    assert_eq!(rows, birthdays()[..2].to_vec());
}

#[tokio::test]
async fn all_is_an_alias_for_all_by() {
    let mut by: Vec<Birthday> = Vec::new();
    let mut aliased: Vec<Birthday> = Vec::new();

    ops::all_by(&Birthday::default(), &mut by, []).await.unwrap();
    ops::all(&Birthday::default(), &mut aliased, []).await.unwrap();

    assert_eq!(by, birthdays());
    assert_eq!(by, aliased);
}

#[tokio::test]
async fn all_by_combines_conditions_with_and() {
    let mut rows: Vec<Birthday> = Vec::new();

    ops::all_by(
        &Birthday::default(),
        &mut rows,
        [Filter::gte("id", 2), Filter::starts_with("name", "Hayao")],
    )
    .await
    .unwrap();

    assert_eq!(names(&rows), vec!["Hayao Miyazaki"]);
}

#[tokio::test]
async fn all_by_reports_backend_errors() {
    let mut rows: Vec<Birthday> = Vec::new();

    let result = ops::all_by(&Stray::default(), &mut rows, []).await;

    assert!(matches!(result, Err(StoreError::CollectionNotFound(_))));
}

#[tokio::test]
async fn exists_checks_the_identifier_by_default() {
    assert!(ops::exists(&Birthday::with_id(3), []).await);
    assert!(!ops::exists(&Birthday::with_id(4), []).await);
}

#[tokio::test]
async fn exists_prefers_explicit_conditions() {
    let probe = Birthday::with_id(4);

    assert!(ops::exists(&probe, [Filter::eq("name", "Linus Torvalds")]).await);
    assert!(!ops::exists(&probe, [Filter::eq("name", "Nobody Special")]).await);
}

#[tokio::test]
async fn exists_falls_back_to_id_zero_without_an_identifier() {
    // the ghosts collection holds a single row with id 0
    assert!(ops::exists(&Nameless::default(), []).await);

    assert!(matches!(
        ops::try_exists(&Nameless::default(), []).await,
        Err(StoreError::NoIdentifierField { .. }),
    ));
}

#[tokio::test]
async fn exists_swallows_backend_errors() {
    assert!(!ops::exists(&Stray::default(), []).await);

    assert!(matches!(
        ops::try_exists(&Stray::default(), []).await,
        Err(StoreError::CollectionNotFound(_)),
    ));
}

#[tokio::test]
async fn try_exists_agrees_with_exists_on_success() {
    assert!(ops::try_exists(&Birthday::with_id(1), []).await.unwrap());
    assert!(!ops::try_exists(&Birthday::with_id(5), []).await.unwrap());
}

#[tokio::test]
async fn boxed_records_are_persistent() {
    let mut boxed = Box::new(Birthday::with_id(2));

    ops::one(&mut boxed).await.unwrap();

    assert_eq!(boxed.name, "Linus Torvalds");
}

#[tokio::test]
async fn repeated_fetches_are_identical() {
    let mut first: Vec<Birthday> = Vec::new();
    let mut second: Vec<Birthday> = Vec::new();

    ops::all_op(&Birthday::default(), modifier::sort(["-born"]), &mut first, []).await.unwrap();
    ops::all_op(&Birthday::default(), modifier::sort(["-born"]), &mut second, []).await.unwrap();

    assert_eq!(first, second);
}
