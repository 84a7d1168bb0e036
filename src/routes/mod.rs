use axum::{
    Extension, Router,
    http::{Method, Uri},
    response::Html,
    routing::get,
};

use crate::db::DbPool;
use crate::errors::AppError;

pub mod customers;


const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <title>Customers Relations Management API | By Darío Scattolini</title>
    <base href="./">
  </head>
  <body>
    <h1>Customers Relations Management API</h1>
    <p>Developed by Darío Scattolini</p>
    <p><a href="https://github.com/darioscattolini/customers-api">Find documentation in GitHub Repository</a></p>
  </body>
</html>
"#;

pub fn create_router() -> Router {
    tracing::debug!("Creating application router");
    Router::new()
        .route("/", get(landing))
        .merge(customers::router())
        .fallback(route_not_found)
}

/// The router with its shared resources attached.
pub fn create_app(pool: DbPool) -> Router {
    create_router().layer(Extension(pool))
}

async fn landing() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

async fn route_not_found(method: Method, uri: Uri) -> AppError {
    AppError::RouteNotFound(format!("Cannot {method} {}", uri.path()))
}
