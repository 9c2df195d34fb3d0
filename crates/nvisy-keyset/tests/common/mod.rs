//! Materials fixture shared by the paginator scenarios.

use std::sync::{Arc, LazyLock};

use jiff::{SignedDuration, Timestamp};
use nvisy_keyset::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BaseModel {
    pub id: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Record for BaseModel {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        Some(match name {
            "id" => FieldRef::value(self.id),
            "created_at" => FieldRef::value(self.created_at),
            "updated_at" => FieldRef::value(self.updated_at),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    #[serde(flatten)]
    pub base: BaseModel,
    pub name: String,
    pub role: i64,
}

impl Record for User {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        Some(match name {
            "base" => FieldRef::Record(&self.base),
            "name" => FieldRef::value(&self.name),
            "role" => FieldRef::value(self.role),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Material {
    #[serde(flatten)]
    pub base: BaseModel,
    pub link: String,
    pub comment: String,
    pub item_id: String,
    pub item_type: String,
    #[serde(rename = "PublicTime")]
    pub public_at: Timestamp,
    pub claps: i64,
    pub user_id: i64,
    pub author: Option<User>,
}

impl Record for Material {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        Some(match name {
            "base" => FieldRef::Record(&self.base),
            "link" => FieldRef::value(&self.link),
            "comment" => FieldRef::value(&self.comment),
            "item_id" => FieldRef::value(&self.item_id),
            "item_type" => FieldRef::value(&self.item_type),
            "public_at" => FieldRef::value(self.public_at),
            "claps" => FieldRef::value(self.claps),
            "user_id" => FieldRef::value(self.user_id),
            "author" => FieldRef::Record(&self.author),
            _ => return None,
        })
    }
}

fn base_descriptor() -> RecordDescriptor {
    RecordDescriptor::builder("BaseModel")
        .scalar("id", ValueKind::Int)
        .field(FieldNode::scalar("created_at", ValueKind::Timestamp).with_sort_alias("createdAt"))
        .field(FieldNode::scalar("updated_at", ValueKind::Timestamp).with_serialized_name("updated_at"))
        .build()
        .expect("base descriptor is valid")
}

fn user_descriptor() -> RecordDescriptor {
    RecordDescriptor::builder("User")
        .embedded("base", base_descriptor())
        .scalar("name", ValueKind::Text)
        .field(FieldNode::scalar("role", ValueKind::Int).with_sort_alias("roleID"))
        .build()
        .expect("user descriptor is valid")
}

static MATERIAL: LazyLock<Arc<RecordDescriptor>> = LazyLock::new(|| {
    let descriptor = RecordDescriptor::builder("Material")
        .embedded("base", base_descriptor())
        .scalar("link", ValueKind::Text)
        .scalar("comment", ValueKind::Text)
        .field(FieldNode::scalar("item_id", ValueKind::Text).with_sort_alias("item_id_cursor"))
        .field(FieldNode::scalar("item_type", ValueKind::Text).with_sort_alias("item_type_name"))
        .field(FieldNode::scalar("public_at", ValueKind::Timestamp).with_serialized_name("PublicTime"))
        .scalar("claps", ValueKind::Int)
        .scalar("user_id", ValueKind::Int)
        .joined("author", "Author", user_descriptor())
        .build()
        .expect("material descriptor is valid");

    Arc::new(descriptor)
});

impl Entity for Material {
    fn descriptor() -> Arc<RecordDescriptor> {
        Arc::clone(&MATERIAL)
    }
}

fn epoch() -> Timestamp {
    "2024-03-01T09:00:00Z".parse().expect("valid timestamp")
}

fn base(id: i64) -> BaseModel {
    let created_at = epoch() + SignedDuration::from_hours(id);
    BaseModel {
        id,
        created_at,
        updated_at: created_at,
    }
}

fn user(id: i64, name: &str) -> User {
    User {
        base: base(id),
        name: name.to_owned(),
        role: id % 2,
    }
}

/// Seven materials: `(id, comment, item_id, author, claps)`.
pub fn materials() -> Vec<Material> {
    let authors = [user(1, "A"), user(2, "B"), user(3, "C")];
    let author = |name: &str| authors.iter().find(|user| user.name == name).cloned();

    [
        (1, "B", "a1", "B", 2),
        (2, "C", "c1", "A", 1),
        (3, "B", "a3", "C", 1),
        (4, "C", "a4", "A", 0),
        (5, "B", "a2", "B", 1),
        (6, "A", "b1", "C", 2),
        (7, "A", "b2", "B", 0),
    ]
    .into_iter()
    .map(|(id, comment, item_id, name, claps)| {
        let author = author(name);
        Material {
            base: base(id),
            link: format!("https://example.com/materials/{id}"),
            comment: comment.to_owned(),
            item_id: item_id.to_owned(),
            item_type: if id % 2 == 0 { "video" } else { "article" }.to_owned(),
            public_at: epoch() + SignedDuration::from_mins(8 - id),
            claps,
            user_id: author.as_ref().map_or(0, |user| user.base.id),
            author,
        }
    })
    .collect()
}

pub fn config() -> PaginatorConfig {
    PaginatorConfig::new()
        .with_default_limit(2)
        .with_default_cursor(Cursor::identifier_default(&Material::descriptor(), 2))
}

pub fn paginator_with(
    source: MemorySource<Material>,
    config: PaginatorConfig,
) -> Paginator<MemorySource<Material>> {
    Paginator::builder()
        .with_source(source)
        .with_descriptor(Material::descriptor())
        .with_config(config)
        .build()
        .expect("paginator is valid")
}

pub fn paginator() -> Paginator<MemorySource<Material>> {
    paginator_with(MemorySource::for_entity(materials()), config())
}

pub fn ids(rows: &[Material]) -> Vec<i64> {
    rows.iter().map(|row| row.base.id).collect()
}
