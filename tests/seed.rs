//! Testes do script de seed (--import / --delete).

mod common;

use std::io::Write;

use common::{service, valid_tour_json};
use serde_json::json;
use tempfile::NamedTempFile;
use tours_backend::{
    db::query::FindQuery,
    seed::{self, SeedCommand, SeedOutcome},
};

fn data_file(value: serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(value.to_string().as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn import_persists_every_tour_with_slug_and_default_rating() {
    let service = service();
    let file = data_file(json!([
        valid_tour_json("The Forest Hiker"),
        valid_tour_json("The Sea Explorer"),
        valid_tour_json("The Snow Adventurer"),
    ]));

    let outcome = seed::run(SeedCommand::Import, &service, file.path()).await.unwrap();
    assert_eq!(outcome, SeedOutcome::Imported(3));

    let tours = service.find_tours(FindQuery::find()).await.unwrap();
    assert_eq!(tours.len(), 3);

    let slugs: Vec<_> = tours.iter().map(|t| t.slug.as_str()).collect();
    assert_eq!(slugs, vec!["the-forest-hiker", "the-sea-explorer", "the-snow-adventurer"]);
    assert!(tours.iter().all(|t| t.ratings_average == 4.5));
}

#[tokio::test]
async fn import_with_one_invalid_record_writes_nothing() {
    let service = service();
    let file = data_file(json!([
        valid_tour_json("The Forest Hiker"),
        valid_tour_json("Bad"),
        valid_tour_json("The Snow Adventurer"),
    ]));

    assert!(seed::run(SeedCommand::Import, &service, file.path()).await.is_err());
    assert_eq!(service.store().len(), 0);
}

#[tokio::test]
async fn import_with_repeated_name_writes_nothing() {
    let service = service();
    let file = data_file(json!([
        valid_tour_json("The Forest Hiker"),
        valid_tour_json("The Forest Hiker"),
    ]));

    assert!(seed::run(SeedCommand::Import, &service, file.path()).await.is_err());
    assert_eq!(service.store().len(), 0);
}

#[tokio::test]
async fn import_reports_wrong_typed_field_by_name() {
    let service = service();
    let mut bad = valid_tour_json("The Sea Explorer");
    bad["maxGroupSize"] = json!("quinze");
    let file = data_file(json!([valid_tour_json("The Forest Hiker"), bad]));

    let err = seed::run(SeedCommand::Import, &service, file.path()).await.unwrap_err();
    let message = format!("{:#}", err);

    assert!(message.contains("maxGroupSize"), "{message}");
    assert!(!message.contains("JSON inválido"), "{message}");
    assert_eq!(service.store().len(), 0);
}

#[tokio::test]
async fn import_of_missing_file_fails() {
    let service = service();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nao-existe.json");

    assert!(seed::run(SeedCommand::Import, &service, &path).await.is_err());
}

#[tokio::test]
async fn delete_removes_everything_including_secret_tours() {
    let service = service();
    let mut secret = valid_tour_json("The Secret Valley");
    secret["secretTour"] = json!(true);
    let file = data_file(json!([valid_tour_json("The Forest Hiker"), secret]));
    seed::run(SeedCommand::Import, &service, file.path()).await.unwrap();

    let outcome = seed::run(SeedCommand::Delete, &service, file.path()).await.unwrap();
    assert_eq!(outcome, SeedOutcome::Deleted(2));
    assert_eq!(service.store().len(), 0);
}

#[tokio::test]
async fn delete_on_empty_collection_is_idempotent() {
    let service = service();
    let unused = std::path::Path::new("unused.json");

    for _ in 0..2 {
        let outcome = seed::run(SeedCommand::Delete, &service, unused).await.unwrap();
        assert_eq!(outcome, SeedOutcome::Deleted(0));
    }
}
