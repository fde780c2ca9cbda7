//! Error-handling probes: every case sends a deliberately bad request and
//! expects the backend to reject it with the right status code.

use serde_json::json;

use super::{CaseDef, CasePass, CaseResult, Suite};
use crate::client::ApiClient;
use crate::runner::context::RunContext;

pub fn suite() -> Suite {
    Suite {
        name: "edge",
        title: "Edge Cases",
        cases: vec![
            CaseDef::new("Invalid Student Login", |c, ctx| {
                Box::pin(invalid_login(c, ctx))
            }),
            CaseDef::new("Missing Login Fields", |c, ctx| {
                Box::pin(missing_login_fields(c, ctx))
            }),
            CaseDef::new("Empty CSV Upload", |c, ctx| {
                Box::pin(empty_csv_upload(c, ctx))
            }),
            CaseDef::new("Invalid Service Request", |c, ctx| {
                Box::pin(invalid_service_request(c, ctx))
            }),
            CaseDef::new("Update Nonexistent Request", |c, ctx| {
                Box::pin(update_nonexistent_request(c, ctx))
            }),
            CaseDef::new("Invalid Route", |c, ctx| Box::pin(invalid_route(c, ctx))),
        ],
    }
}

async fn invalid_login(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    let payload = json!({
        "userId": "nonexistent@test.com",
        "password": "wrongpassword",
        "role": "student",
    });
    client
        .post("/auth/login", &payload)
        .await?
        .expect_status(404)?;
    Ok(CasePass::new("Correctly rejected non-existent student"))
}

async fn missing_login_fields(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    // Password and role omitted on purpose
    let payload = json!({ "userId": "test@test.com" });
    client
        .post("/auth/login", &payload)
        .await?
        .expect_status(400)?;
    Ok(CasePass::new("Correctly rejected incomplete login data"))
}

async fn empty_csv_upload(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    let payload = json!({ "csvData": "" });
    client
        .post("/students/upload", &payload)
        .await?
        .expect_status(400)?;
    Ok(CasePass::new("Correctly rejected empty CSV"))
}

async fn invalid_service_request(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    // Missing studentId
    let payload = json!({ "serviceType": "bonafide" });
    client
        .post("/requests", &payload)
        .await?
        .expect_status(400)?;
    Ok(CasePass::new("Correctly rejected incomplete request"))
}

async fn update_nonexistent_request(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    let payload = json!({ "status": "approved" });
    client
        .put("/requests/nonexistent-id", &payload)
        .await?
        .expect_status(404)?;
    Ok(CasePass::new("Correctly handled non-existent request"))
}

async fn invalid_route(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    client.get("/nonexistent-route").await?.expect_status(404)?;
    Ok(CasePass::new("Correctly returned 404 for invalid route"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_runs_six_cases() {
        assert_eq!(suite().cases.len(), 6);
    }
}
