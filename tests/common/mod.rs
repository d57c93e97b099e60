#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use petclinic_rest::api;
use petclinic_rest::entities::{owner, pet, visit};
use petclinic_rest::migrator::Migrator;
use petclinic_rest::security::Authenticator;
use petclinic_rest::service::SeaOrmClinicService;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use tower::ServiceExt;

/// Fresh in-memory database with the schema and pet types in place.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn open_app(db: &DatabaseConnection) -> Router {
    api::app(
        Arc::new(SeaOrmClinicService::new(db.clone())),
        None,
        api::cors_layer(None),
    )
}

pub fn secured_app(db: &DatabaseConnection) -> Router {
    api::app(
        Arc::new(SeaOrmClinicService::new(db.clone())),
        Some(Authenticator::new(db.clone())),
        api::cors_layer(None),
    )
}

pub async fn insert_owner(db: &DatabaseConnection, first_name: &str, last_name: &str) -> i32 {
    owner::ActiveModel {
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        address: Set("110 W. Liberty St.".to_string()),
        city: Set("Madison".to_string()),
        telephone: Set("6085551023".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn insert_pet(db: &DatabaseConnection, name: &str, type_id: i32, owner_id: i32) -> i32 {
    pet::ActiveModel {
        name: Set(name.to_string()),
        birth_date: Set(NaiveDate::from_ymd_opt(2010, 9, 7).unwrap()),
        type_id: Set(type_id),
        owner_id: Set(owner_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn insert_visit(db: &DatabaseConnection, pet_id: i32, description: &str) -> i32 {
    visit::ActiveModel {
        pet_id: Set(pet_id),
        visit_date: Set(NaiveDate::from_ymd_opt(2013, 1, 1).unwrap()),
        description: Set(description.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn errors(&self) -> Option<serde_json::Value> {
        self.headers
            .get("errors")
            .map(|v| serde_json::from_slice(v.as_bytes()).unwrap())
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
