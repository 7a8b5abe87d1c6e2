//! Shared fixture models and seed data for the integration suite
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use filament_orm::{
    BelongsTo, BelongsToDef, CrudOperations, Database, DatabaseRow, DatabaseRowExt, DatabaseSchema,
    DatabaseValue, Field, FieldConstraint, FieldDescriptor, FieldRole, FieldType, HasMany,
    HasManyDef, MemoryDatabase, Model, ModelStorage, OrmResult,
};

#[derive(Debug, Clone, Default)]
pub struct Galaxy {
    pub id: Option<i64>,
    pub name: String,
    pub planets: HasMany<Planet>,
    pub storage: ModelStorage,
}

impl Galaxy {
    pub const ID: Field<Galaxy, i64> = Field::new("id");
    pub const NAME: Field<Galaxy, String> = Field::new("name");
    pub const PLANETS: HasManyDef<Galaxy, Planet> =
        HasManyDef::new("galaxy_id", |g| &mut g.planets, |p| p.galaxy.id());

    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

const GALAXY_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("id", FieldType::BigInt).constraints(&[FieldConstraint::Identifier]),
    FieldDescriptor::new("name", FieldType::String).constraints(&[FieldConstraint::Required]),
];

impl Model for Galaxy {
    type Id = i64;

    fn entity() -> &'static str {
        "galaxies"
    }

    fn fields() -> &'static [FieldDescriptor] {
        GALAXY_FIELDS
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn storage(&self) -> &ModelStorage {
        &self.storage
    }

    fn storage_mut(&mut self) -> &mut ModelStorage {
        &mut self.storage
    }

    fn from_row(row: &dyn DatabaseRow) -> OrmResult<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.get("name")?,
            ..Default::default()
        })
    }

    fn to_fields(&self) -> OrmResult<Vec<(&'static str, DatabaseValue)>> {
        Ok(vec![
            ("id", self.id.into()),
            ("name", self.name.clone().into()),
        ])
    }
}

#[derive(Debug, Clone, Default)]
pub struct Planet {
    pub id: Option<i64>,
    pub name: String,
    pub galaxy: BelongsTo<Galaxy>,
    pub storage: ModelStorage,
}

impl Planet {
    pub const ID: Field<Planet, i64> = Field::new("id");
    pub const NAME: Field<Planet, String> = Field::new("name");
    pub const GALAXY_ID: Field<Planet, i64> = Field::new("galaxy_id");
    pub const GALAXY: BelongsToDef<Planet, Galaxy> =
        BelongsToDef::new("galaxy_id", |p| &p.galaxy, |p| &mut p.galaxy);

    pub fn new(name: &str, galaxy: &Galaxy) -> Self {
        Self {
            name: name.to_string(),
            galaxy: BelongsTo::to(galaxy),
            ..Default::default()
        }
    }
}

const PLANET_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("id", FieldType::BigInt).constraints(&[FieldConstraint::Identifier]),
    FieldDescriptor::new("name", FieldType::String).constraints(&[FieldConstraint::Required]),
    FieldDescriptor::new("galaxy_id", FieldType::BigInt).constraints(&[FieldConstraint::Required]),
];

impl Model for Planet {
    type Id = i64;

    fn entity() -> &'static str {
        "planets"
    }

    fn fields() -> &'static [FieldDescriptor] {
        PLANET_FIELDS
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn storage(&self) -> &ModelStorage {
        &self.storage
    }

    fn storage_mut(&mut self) -> &mut ModelStorage {
        &mut self.storage
    }

    fn from_row(row: &dyn DatabaseRow) -> OrmResult<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.get("name")?,
            galaxy: BelongsTo::new(row.get("galaxy_id")?),
            ..Default::default()
        })
    }

    fn to_fields(&self) -> OrmResult<Vec<(&'static str, DatabaseValue)>> {
        Ok(vec![
            ("id", self.id.into()),
            ("name", self.name.clone().into()),
            ("galaxy_id", (*self.galaxy.id()).into()),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum PetKind {
    #[default]
    Cat,
    Dog,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub name: String,
    pub kind: PetKind,
}

#[derive(Debug, Clone, Default)]
pub struct User {
    pub id: Option<i64>,
    pub name: String,
    pub pet: Pet,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub storage: ModelStorage,
}

impl User {
    pub const NAME: Field<User, String> = Field::new("name");

    pub fn new(name: &str, pet: Pet) -> Self {
        Self {
            name: name.to_string(),
            pet,
            ..Default::default()
        }
    }
}

const USER_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("id", FieldType::BigInt).constraints(&[FieldConstraint::Identifier]),
    FieldDescriptor::new("name", FieldType::String).constraints(&[FieldConstraint::Required]),
    FieldDescriptor::new("pet", FieldType::Json),
    FieldDescriptor::new("created_at", FieldType::DateTime).role(FieldRole::CreatedAt),
    FieldDescriptor::new("updated_at", FieldType::DateTime).role(FieldRole::UpdatedAt),
    FieldDescriptor::new("deleted_at", FieldType::DateTime).role(FieldRole::DeletedAt),
];

impl Model for User {
    type Id = i64;

    fn entity() -> &'static str {
        "users"
    }

    fn fields() -> &'static [FieldDescriptor] {
        USER_FIELDS
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn storage(&self) -> &ModelStorage {
        &self.storage
    }

    fn storage_mut(&mut self) -> &mut ModelStorage {
        &mut self.storage
    }

    fn from_row(row: &dyn DatabaseRow) -> OrmResult<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.get("name")?,
            pet: row.get("pet")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
            ..Default::default()
        })
    }

    fn to_fields(&self) -> OrmResult<Vec<(&'static str, DatabaseValue)>> {
        Ok(vec![
            ("id", self.id.into()),
            ("name", self.name.clone().into()),
            ("pet", DatabaseValue::Json(serde_json::to_value(&self.pet)?)),
            ("created_at", self.created_at.into()),
            ("updated_at", self.updated_at.into()),
            ("deleted_at", self.deleted_at.into()),
        ])
    }
}

/// Fresh database with the fixture schemas registered
pub async fn setup() -> MemoryDatabase {
    let db = MemoryDatabase::new();
    db.execute_schema(&DatabaseSchema::create::<Galaxy>())
        .await
        .unwrap();
    db.execute_schema(&DatabaseSchema::create::<Planet>())
        .await
        .unwrap();
    db.execute_schema(&DatabaseSchema::create::<User>())
        .await
        .unwrap();
    db
}

pub const MILKY_WAY_PLANETS: [&str; 8] = [
    "Mercury", "Venus", "Earth", "Mars", "Jupiter", "Saturn", "Uranus", "Neptune",
];

/// Seed two galaxies: the Milky Way with eight planets and Andromeda with one
pub async fn seed_galaxies(db: &MemoryDatabase) -> (Galaxy, Galaxy) {
    let mut milky_way = Galaxy::new("Milky Way");
    milky_way.create(db).await.unwrap();
    let mut andromeda = Galaxy::new("Andromeda");
    andromeda.create(db).await.unwrap();

    for name in MILKY_WAY_PLANETS {
        let mut planet = Planet::new(name, &milky_way);
        planet.save(db).await.unwrap();
    }
    let mut planet = Planet::new("PA-99-N2", &andromeda);
    planet.save(db).await.unwrap();

    (milky_way, andromeda)
}
