//! Template endpoints: reusable step outlines for new test cases.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::templates::NewTemplate;
use crate::db::DbPool;
use crate::entity::{template_step, test_case_template};
use crate::error::{AppError, AppResult};
use crate::models::StepInput;

use super::{CreatedResponse, MessageResponse};

/// One step of a template outline.
#[derive(Debug, Serialize, ToSchema)]
pub struct TemplateStepResponse {
    pub id: i64,
    pub description: String,
    pub expected_result: String,
    pub order: i32,
}

impl From<template_step::Model> for TemplateStepResponse {
    fn from(model: template_step::Model) -> Self {
        TemplateStepResponse {
            id: model.id,
            description: model.description,
            expected_result: model.expected_result,
            order: model.order,
        }
    }
}

/// A template with its steps.
#[derive(Debug, Serialize, ToSchema)]
pub struct TemplateResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub precondition: String,
    pub postcondition: String,
    pub category: String,
    pub steps: Vec<TemplateStepResponse>,
}

/// Body for creating a template.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTemplateRequest {
    /// Template name (required)
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub precondition: String,
    #[serde(default)]
    pub postcondition: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub steps: Vec<StepInput>,
}

/// List all templates.
#[utoipa::path(
    get,
    path = "/templates",
    tag = "Templates",
    responses(
        (status = 200, description = "List of templates", body = [TemplateResponse]),
    )
)]
pub async fn list_templates(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let templates = pool.list_templates().await?;

    let response: Vec<TemplateResponse> = templates
        .into_iter()
        .map(|(template, steps)| TemplateResponse {
            id: template.id,
            name: template.name,
            description: template.description,
            precondition: template.precondition,
            postcondition: template.postcondition,
            category: template.category,
            steps: steps.into_iter().map(TemplateStepResponse::from).collect(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Create a template.
#[utoipa::path(
    post,
    path = "/templates",
    tag = "Templates",
    request_body = CreateTemplateRequest,
    responses(
        (status = 201, description = "Template created", body = CreatedResponse),
        (status = 400, description = "Missing name", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_template(
    pool: web::Data<DbPool>,
    body: web::Json<CreateTemplateRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let Some(name) = req.name.filter(|n| !n.is_empty()) else {
        return Err(AppError::InvalidInput(
            "Template name is required".to_string(),
        ));
    };

    let template = pool
        .insert_template(NewTemplate {
            name,
            description: req.description,
            precondition: req.precondition,
            postcondition: req.postcondition,
            category: req.category,
            steps: req.steps,
        })
        .await?;

    Ok(HttpResponse::Created().json(CreatedResponse {
        message: "Template created".to_string(),
        id: template.id,
    }))
}

/// Delete a template.
///
/// Test cases created from it keep their data; only the recorded link goes
/// away.
#[utoipa::path(
    delete,
    path = "/templates/{id}",
    tag = "Templates",
    params(
        ("id" = i64, Path, description = "Template ID")
    ),
    responses(
        (status = 200, description = "Template deleted", body = MessageResponse),
        (status = 404, description = "Template not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_template(
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    pool.delete_template(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Template deleted".to_string(),
    }))
}

/// Configure template routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/templates")
            .route(web::get().to(list_templates))
            .route(web::post().to(create_template)),
    )
    .service(web::resource("/templates/{id}").route(web::delete().to(delete_template)));
}
