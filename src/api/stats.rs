use actix_web::{HttpResponse, web};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    api::{non_blank, parse_date, today},
    error::AppError,
    reports::{daily_stats, dash_stats, weekly_stats},
    store::Store,
    utils::loose::opt_id,
};

const DEFAULT_ACTIVITY_LIMIT: usize = 10;
const MAX_ACTIVITY_LIMIT: usize = 50;

fn date_or_today(raw: &Option<String>) -> Result<NaiveDate, AppError> {
    match non_blank(raw) {
        Some(raw) => parse_date(&raw),
        None => Ok(today()),
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailyQuery {
    /// `YYYY-MM-DD`, defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeeklyQuery {
    /// Last day of the week, defaults to today
    pub end: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashQuery {
    #[serde(default, deserialize_with = "opt_id")]
    #[param(value_type = Option<i32>)]
    pub year: Option<u64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityQuery {
    /// Defaults to 10, at most 50
    #[serde(default, deserialize_with = "opt_id")]
    #[param(value_type = Option<u32>)]
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/stats/daily",
    params(DailyQuery),
    responses(
        (status = 200, description = "Attendance for one day grouped by workplace", body = DailyStats),
        (status = 400, description = "Invalid date", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Stats"
)]
pub async fn daily(store: web::Data<Store>, query: web::Query<DailyQuery>) -> Result<HttpResponse, AppError> {
    let date = date_or_today(&query.date)?;
    let stats = store.with_dataset(|data| daily_stats(data, date))?;

    Ok(HttpResponse::Ok().json(stats))
}

#[utoipa::path(
    get,
    path = "/api/stats/weekly",
    params(WeeklyQuery),
    responses(
        (status = 200, description = "Seven days, oldest first", body = [DayCount]),
        (status = 400, description = "Invalid date", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Stats"
)]
pub async fn weekly(store: web::Data<Store>, query: web::Query<WeeklyQuery>) -> Result<HttpResponse, AppError> {
    let end = date_or_today(&query.end)?;
    let week = store.with_dataset(|data| weekly_stats(data, end))?;

    Ok(HttpResponse::Ok().json(week))
}

#[utoipa::path(
    get,
    path = "/api/stats/dashstats",
    params(DashQuery),
    responses(
        (status = 200, description = "Monthly wages for the year and today's head count", body = DashStats),
        (status = 400, description = "Invalid year", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Stats"
)]
pub async fn dashstats(store: web::Data<Store>, query: web::Query<DashQuery>) -> Result<HttpResponse, AppError> {
    let today = today();
    let year = match query.year {
        Some(year) => i32::try_from(year).map_err(|_| AppError::bad_request("Invalid year"))?,
        None => today.year(),
    };

    let stats = store.with_dataset(|data| dash_stats(data, year, today))?;
    Ok(HttpResponse::Ok().json(stats))
}

#[utoipa::path(
    get,
    path = "/api/stats/recent-activity",
    params(ActivityQuery),
    responses(
        (status = 200, description = "Latest changes, newest first", body = [Activity])
    ),
    security(("bearer_auth" = [])),
    tag = "Stats"
)]
pub async fn recent_activity(
    store: web::Data<Store>,
    query: web::Query<ActivityQuery>,
) -> Result<HttpResponse, AppError> {
    let limit = query
        .limit
        .map_or(DEFAULT_ACTIVITY_LIMIT, |n| n.min(MAX_ACTIVITY_LIMIT as u64) as usize);

    Ok(HttpResponse::Ok().json(store.recent_activity(limit)?))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web};
    use serde_json::Value;

    use crate::{model::activity::ActivityStatus, store::Store, test_support as ts};

    #[actix_web::test]
    async fn daily_groups_by_workplace() {
        let store = web::Data::new(Store::new());
        store.seed_demo_data("unused".into()).unwrap();
        let app = test::init_service(ts::app(store.clone())).await;
        let token = ts::register(&store, "hr@x.com").token;

        let body: Value = test::call_and_read_body_json(
            &app,
            ts::get("/api/stats/daily?date=2025-08-10").insert_header(ts::bearer(&token)).to_request(),
        )
        .await;

        assert_eq!(body["date"], "2025-08-10");
        let workplaces = body["workplaces"].as_array().unwrap();
        assert_eq!(workplaces.len(), 2);
        assert_eq!(workplaces[0]["workplace_name"], "Head Office");
        assert_eq!(workplaces[0]["presentEmployees"][0]["name"], "John Doe");
        assert_eq!(workplaces[1]["absentEmployees"][0]["name"], "Jane Smith");
        assert_eq!(body["totals"]["totalPresent"], 1);
        assert_eq!(body["totals"]["totalAbsent"], 1);
        assert_eq!(body["totals"]["totalSalary"], 500.0);

        let resp = test::call_service(
            &app,
            ts::get("/api/stats/daily?date=yesterday").insert_header(ts::bearer(&token)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn weekly_ends_on_the_requested_day() {
        let store = web::Data::new(Store::new());
        store.seed_demo_data("unused".into()).unwrap();
        let app = test::init_service(ts::app(store.clone())).await;
        let token = ts::register(&store, "hr@x.com").token;

        let body: Value = test::call_and_read_body_json(
            &app,
            ts::get("/api/stats/weekly?end=2025-08-12").insert_header(ts::bearer(&token)).to_request(),
        )
        .await;

        let week = body.as_array().unwrap();
        assert_eq!(week.len(), 7);
        assert_eq!(week[0]["date"], "2025-08-06");
        assert_eq!(week[6]["date"], "2025-08-12");
        assert_eq!(week[4]["date"], "2025-08-10");
        assert_eq!(week[4]["present"], 1);
        assert_eq!(week[4]["absent"], 1);
    }

    #[actix_web::test]
    async fn weekly_rejects_extended_years() {
        let store = web::Data::new(Store::new());
        let app = test::init_service(ts::app(store.clone())).await;
        let token = ts::register(&store, "hr@x.com").token;

        let resp = test::call_service(
            &app,
            ts::get("/api/stats/weekly?end=-262143-01-01").insert_header(ts::bearer(&token)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].as_str().unwrap().starts_with("Invalid date"));
    }

    #[actix_web::test]
    async fn dashstats_has_twelve_months() {
        let store = web::Data::new(Store::new());
        store.seed_demo_data("unused".into()).unwrap();
        let app = test::init_service(ts::app(store.clone())).await;
        let token = ts::register(&store, "hr@x.com").token;

        let body: Value = test::call_and_read_body_json(
            &app,
            ts::get("/api/stats/dashstats?year=2025").insert_header(ts::bearer(&token)).to_request(),
        )
        .await;

        let months = body["monthlyWages"].as_array().unwrap();
        assert_eq!(months.len(), 12);
        assert_eq!(months[7]["month"], "Aug");
        assert_eq!(months[7]["wage"], 500.0);
        assert!(body["today"]["present"].is_u64());
    }

    #[actix_web::test]
    async fn recent_activity_is_capped() {
        let store = web::Data::new(Store::new());
        for n in 0..60 {
            store
                .record_activity("Admin", format!("change {n}"), ActivityStatus::Info)
                .unwrap();
        }
        let app = test::init_service(ts::app(store.clone())).await;
        let token = ts::register(&store, "hr@x.com").token;

        let feed: Value = test::call_and_read_body_json(
            &app,
            ts::get("/api/stats/recent-activity").insert_header(ts::bearer(&token)).to_request(),
        )
        .await;
        assert_eq!(feed.as_array().unwrap().len(), 10);
        assert_eq!(feed[0]["action"], "change 59");
        assert_eq!(feed[0]["status"], "info");

        let feed: Value = test::call_and_read_body_json(
            &app,
            ts::get("/api/stats/recent-activity?limit=500").insert_header(ts::bearer(&token)).to_request(),
        )
        .await;
        assert_eq!(feed.as_array().unwrap().len(), 50);
    }
}
