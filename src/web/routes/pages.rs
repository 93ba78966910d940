use askama::Template;
use axum::response::{Html, IntoResponse};

use crate::models::registration::REGISTRATION_FEE_INR;
use crate::models::{Sector, SECTORS};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub sectors: &'static [Sector],
    pub amount: i64,
}

// The checkout key reaches the browser through the create-order response,
// so the form page itself is fully static.
pub async fn index_handler() -> impl IntoResponse {
    let template = IndexTemplate {
        sectors: SECTORS,
        amount: REGISTRATION_FEE_INR,
    };
    Html(template.render().unwrap())
}

#[derive(Template)]
#[template(path = "success.html")]
pub struct SuccessTemplate;

pub async fn success_handler() -> impl IntoResponse {
    Html(SuccessTemplate.render().unwrap())
}
