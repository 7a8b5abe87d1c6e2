//! Eager loading: subquery and join strategies, key dedup, distribution

mod common;

use common::*;
use filament_orm::{
    BelongsTo, CrudOperations, DatabaseValue, EagerLoadMethod, Filter, JoinMethod, Model,
    ModelError, QueryAction, QueryOperator,
};

#[tokio::test]
async fn test_subquery_parent_load_deduplicates_keys() {
    let db = setup().await;

    let mut milky_way = Galaxy::new("Milky Way");
    milky_way.create(&db).await.unwrap();
    let mut andromeda = Galaxy::new("Andromeda");
    andromeda.create(&db).await.unwrap();

    for (name, galaxy) in [
        ("Earth", &milky_way),
        ("Mars", &milky_way),
        ("PA-99-N2", &andromeda),
    ] {
        let mut planet = Planet::new(name, galaxy);
        planet.create(&db).await.unwrap();
    }

    let planets = Planet::query(&db)
        .with_belongs_to(Planet::GALAXY, EagerLoadMethod::Subquery)
        .all()
        .await
        .unwrap();

    // exactly one follow-up query against the parent entity
    assert_eq!(db.reads_for("galaxies"), 1);

    // its key set is deduplicated: {milky way, andromeda}
    let galaxy_read = db
        .executed()
        .into_iter()
        .find(|q| q.entity == "galaxies" && q.action == QueryAction::Read)
        .unwrap();
    match &galaxy_read.filters[0] {
        Filter::Basic {
            operator: QueryOperator::In,
            value: DatabaseValue::Array(keys),
            ..
        } => {
            assert_eq!(keys.len(), 2);
            assert!(keys.contains(&DatabaseValue::Int64(milky_way.id.unwrap())));
            assert!(keys.contains(&DatabaseValue::Int64(andromeda.id.unwrap())));
        }
        other => panic!("expected an IN filter over the key set, got {:?}", other),
    }

    // each child resolved its own parent
    for planet in &planets {
        let parent = planet.galaxy.get();
        assert_eq!(parent.id, Some(*planet.galaxy.id()));
        let expected = if planet.name == "PA-99-N2" {
            "Andromeda"
        } else {
            "Milky Way"
        };
        assert_eq!(parent.name, expected);
    }
}

#[tokio::test]
async fn test_join_parent_load_issues_no_follow_up_query() {
    let db = setup().await;
    seed_galaxies(&db).await;

    let before = db.reads_for("galaxies");
    let planets = Planet::query(&db)
        .with_belongs_to(Planet::GALAXY, EagerLoadMethod::Join)
        .all()
        .await
        .unwrap();

    assert_eq!(planets.len(), 9);
    // parents come from the joined, prefixed columns of the same rows
    assert_eq!(db.reads_for("galaxies"), before);
    for planet in &planets {
        let parent = planet.galaxy.loaded().expect("parent resolved from join");
        assert!(parent.exists());
        assert_eq!(parent.id, Some(*planet.galaxy.id()));
    }
}

#[tokio::test]
async fn test_has_many_load_distributes_children_by_key() {
    let db = setup().await;
    seed_galaxies(&db).await;

    let galaxies = Galaxy::query(&db)
        .with_has_many(Galaxy::PLANETS)
        .all()
        .await
        .unwrap();

    assert_eq!(db.reads_for("planets"), 1);
    assert_eq!(galaxies.len(), 2);

    let milky_way = galaxies.iter().find(|g| g.name == "Milky Way").unwrap();
    assert_eq!(milky_way.planets.get().len(), 8);
    for planet in milky_way.planets.get() {
        assert_eq!(planet.galaxy.id(), &milky_way.id.unwrap());
    }

    let andromeda = galaxies.iter().find(|g| g.name == "Andromeda").unwrap();
    let names: Vec<&str> = andromeda
        .planets
        .get()
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["PA-99-N2"]);
}

#[tokio::test]
async fn test_galaxy_scenario_count_and_parent_names() {
    let db = setup().await;
    seed_galaxies(&db).await;

    let query = Planet::query(&db)
        .with_belongs_to(Planet::GALAXY, EagerLoadMethod::Subquery)
        .join(Galaxy::ID, Planet::GALAXY_ID, JoinMethod::Inner)
        .filter_foreign(Galaxy::NAME, QueryOperator::Equal, "Milky Way");

    assert_eq!(query.count().await.unwrap(), 8);

    let planets = query.all().await.unwrap();
    assert_eq!(planets.len(), 8);
    for planet in &planets {
        assert_eq!(planet.galaxy.get().name, "Milky Way");
    }
}

#[tokio::test]
async fn test_missing_parent_fails_the_whole_fetch() {
    let db = setup().await;

    let mut orphan = Planet {
        name: "Nibiru".to_string(),
        galaxy: BelongsTo::new(999),
        ..Default::default()
    };
    orphan.create(&db).await.unwrap();

    let result = Planet::query(&db)
        .with_belongs_to(Planet::GALAXY, EagerLoadMethod::Subquery)
        .all()
        .await;
    assert!(matches!(result, Err(ModelError::Relationship(_))));
}

#[tokio::test]
async fn test_eager_load_over_empty_batch_issues_no_query() {
    let db = setup().await;

    let planets = Planet::query(&db)
        .with_belongs_to(Planet::GALAXY, EagerLoadMethod::Subquery)
        .all()
        .await
        .unwrap();
    assert!(planets.is_empty());
    assert_eq!(db.reads_for("galaxies"), 0);
}

#[test]
#[should_panic(expected = "association not loaded")]
fn test_reading_an_unloaded_parent_panics() {
    let relation: BelongsTo<Galaxy> = BelongsTo::new(1);
    let _ = relation.get();
}

#[test]
#[should_panic(expected = "association not loaded")]
fn test_reading_unloaded_children_panics() {
    let galaxy = Galaxy::new("Milky Way");
    let _ = galaxy.planets.get();
}

#[test]
#[should_panic(expected = "cannot reference an unsaved")]
fn test_referencing_an_unsaved_parent_panics() {
    let unsaved = Galaxy::new("Milky Way");
    let _ = Planet::new("Earth", &unsaved);
}
