use crate::{
    api::non_blank,
    auth::auth::AuthUser,
    error::{AppError, MessageResponse},
    model::{activity::ActivityStatus, workplace::Workplace},
    store::Store,
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct WorkplacePayload {
    #[schema(example = "Head Office")]
    pub name: Option<String>,
    #[schema(example = "Dubai")]
    pub location: Option<String>,
}

impl WorkplacePayload {
    fn into_workplace(self) -> Result<impl FnOnce(u64) -> Workplace, AppError> {
        let name = non_blank(&self.name).ok_or_else(|| AppError::bad_request("Workplace name is required"))?;
        let location = non_blank(&self.location).unwrap_or_default();

        Ok(move |id| Workplace { id, name, location })
    }
}

#[derive(Serialize, ToSchema)]
pub struct WorkplaceResponse {
    #[schema(example = "Workplace added")]
    pub message: String,
    pub workplace: Workplace,
}

#[utoipa::path(
    get,
    path = "/api/workplaces",
    responses((status = 200, description = "All workplaces", body = [Workplace])),
    tag = "Workplace",
    security(("bearer_auth" = []))
)]
pub async fn list_workplaces(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(store.list_workplaces()?))
}

#[utoipa::path(
    get,
    path = "/api/workplaces/{id}",
    params(("id", Path, description = "Workplace ID")),
    responses(
        (status = 200, description = "Workplace found", body = Workplace),
        (status = 404, description = "Workplace not found", body = MessageResponse)
    ),
    tag = "Workplace",
    security(("bearer_auth" = []))
)]
pub async fn get_workplace(store: web::Data<Store>, path: web::Path<u64>) -> Result<HttpResponse, AppError> {
    let workplace = store
        .get_workplace(path.into_inner())?
        .ok_or_else(|| AppError::not_found("Workplace not found"))?;

    Ok(HttpResponse::Ok().json(workplace))
}

#[utoipa::path(
    post,
    path = "/api/workplaces",
    request_body = WorkplacePayload,
    responses(
        (status = 200, description = "Workplace created", body = WorkplaceResponse),
        (status = 400, description = "Workplace name is required", body = MessageResponse)
    ),
    tag = "Workplace",
    security(("bearer_auth" = []))
)]
pub async fn create_workplace(
    auth: AuthUser,
    store: web::Data<Store>,
    payload: web::Json<WorkplacePayload>,
) -> Result<HttpResponse, AppError> {
    let make = payload.into_inner().into_workplace()?;
    let workplace = store.insert_workplace(make)?;

    store.record_activity(&auth.name, format!("Added workplace {}", workplace.name), ActivityStatus::Success)?;
    info!(workplace_id = workplace.id, "Workplace created");

    Ok(HttpResponse::Ok().json(WorkplaceResponse {
        message: "Workplace added".into(),
        workplace,
    }))
}

#[utoipa::path(
    put,
    path = "/api/workplaces/{id}",
    params(("id", Path, description = "Workplace ID")),
    request_body = WorkplacePayload,
    responses(
        (status = 200, description = "Workplace updated", body = WorkplaceResponse),
        (status = 400, description = "Workplace name is required", body = MessageResponse),
        (status = 404, description = "Workplace not found", body = MessageResponse)
    ),
    tag = "Workplace",
    security(("bearer_auth" = []))
)]
pub async fn update_workplace(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
    payload: web::Json<WorkplacePayload>,
) -> Result<HttpResponse, AppError> {
    let workplace_id = path.into_inner();
    let make = payload.into_inner().into_workplace()?;

    let workplace = store
        .replace_workplace(workplace_id, make)?
        .ok_or_else(|| AppError::not_found("Workplace not found"))?;

    store.record_activity(&auth.name, format!("Updated workplace {}", workplace.name), ActivityStatus::Info)?;
    info!(workplace_id, "Workplace updated");

    Ok(HttpResponse::Ok().json(WorkplaceResponse {
        message: "Workplace updated".into(),
        workplace,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/workplaces/{id}",
    params(("id", Path, description = "Workplace ID")),
    responses(
        (status = 200, description = "Workplace deleted", body = MessageResponse),
        (status = 404, description = "Workplace not found", body = MessageResponse)
    ),
    tag = "Workplace",
    security(("bearer_auth" = []))
)]
pub async fn delete_workplace(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let workplace_id = path.into_inner();

    let removed = store
        .delete_workplace(workplace_id)?
        .ok_or_else(|| AppError::not_found("Workplace not found"))?;

    store.record_activity(&auth.name, format!("Removed workplace {}", removed.name), ActivityStatus::Warning)?;
    info!(workplace_id, "Workplace deleted");

    Ok(HttpResponse::Ok().json(MessageResponse::new("Workplace deleted")))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web};
    use serde_json::{Value, json};

    use crate::{store::Store, test_support as ts};

    #[actix_web::test]
    async fn workplace_name_is_trimmed_and_required() {
        let store = web::Data::new(Store::new());
        let app = test::init_service(ts::app(store.clone())).await;
        let token = ts::register(&store, "hr@x.com").token;

        let resp = test::call_service(
            &app,
            ts::post("/api/workplaces")
                .insert_header(ts::bearer(&token))
                .set_json(json!({"name": "   "}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Workplace name is required");

        let resp = test::call_service(
            &app,
            ts::post("/api/workplaces")
                .insert_header(ts::bearer(&token))
                .set_json(json!({"name": "  Yard 7 "}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Workplace added");
        assert_eq!(body["workplace"]["name"], "Yard 7");
        assert_eq!(body["workplace"]["location"], "");
    }

    #[actix_web::test]
    async fn workplace_update_get_and_delete() {
        let store = web::Data::new(Store::new());
        store.seed_demo_data("unused".into()).unwrap();
        let app = test::init_service(ts::app(store.clone())).await;
        let token = ts::register(&store, "hr@x.com").token;
        let id = store.list_workplaces().unwrap()[0].id;

        let resp = test::call_service(
            &app,
            ts::put(&format!("/api/workplaces/{id}"))
                .insert_header(ts::bearer(&token))
                .set_json(json!({"name": "HQ", "location": "Sharjah"}))
                .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Workplace updated");

        let body: Value = test::call_and_read_body_json(
            &app,
            ts::get(&format!("/api/workplaces/{id}")).insert_header(ts::bearer(&token)).to_request(),
        )
        .await;
        assert_eq!(body["name"], "HQ");
        assert_eq!(body["location"], "Sharjah");

        let resp = test::call_service(
            &app,
            ts::delete(&format!("/api/workplaces/{id}")).insert_header(ts::bearer(&token)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        for req in [
            ts::get(&format!("/api/workplaces/{id}")),
            ts::delete(&format!("/api/workplaces/{id}")),
        ] {
            let resp = test::call_service(&app, req.insert_header(ts::bearer(&token)).to_request()).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        }
        assert_eq!(store.list_workplaces().unwrap().len(), 1);
    }
}
