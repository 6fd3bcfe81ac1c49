use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
pub struct UserQuery {
    pub id: u64,
}

pub type Db = Arc<RwLock<HashMap<u64, User>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/api/users", get(get_user).post(create_user))
        .route("/api/broken", get(broken))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn get_user(
    State(db): State<Db>,
    Query(query): Query<UserQuery>,
) -> Result<Json<User>, (StatusCode, Json<serde_json::Value>)> {
    let users = db.read().await;
    users.get(&query.id).cloned().map(Json).ok_or((
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "user not found"})),
    ))
}

async fn create_user(State(db): State<Db>, Json(user): Json<User>) -> (StatusCode, Json<User>) {
    db.write().await.insert(user.id, user.clone());
    (StatusCode::CREATED, Json(user))
}

/// Returns a 200 whose body is not valid JSON, for decode-failure tests.
async fn broken() -> &'static str {
    "not json"
}
