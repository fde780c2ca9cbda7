//! Student profile probes: fetch-by-id, profile update, persistence of the
//! update, and 404 behavior for unknown ids.

use serde_json::{json, Value};

use super::backend::roster_csv;
use super::{CaseDef, CasePass, CaseResult, Suite};
use crate::client::{ApiClient, CheckError};
use crate::runner::context::{RunContext, StudentRecord};

pub fn suite() -> Suite {
    Suite {
        name: "profile",
        title: "Student Profile API",
        cases: vec![
            CaseDef::new("Setup Test Student", |c, ctx| Box::pin(setup(c, ctx))),
            CaseDef::new("Get Single Student", |c, ctx| {
                Box::pin(get_single_student(c, ctx))
            }),
            CaseDef::new("Update Student Profile", |c, ctx| {
                Box::pin(update_profile(c, ctx))
            }),
            CaseDef::new("Verify Update Persistence", |c, ctx| {
                Box::pin(verify_persistence(c, ctx))
            }),
            CaseDef::new("Get Invalid Id", |c, ctx| Box::pin(get_invalid_id(c, ctx))),
            CaseDef::new("Update Invalid Id", |c, ctx| {
                Box::pin(update_invalid_id(c, ctx))
            }),
        ],
    }
}

const TEST_EMAIL: &str = "test@example.com";

/// Upload one known student, then find it via the list endpoint and capture
/// its id. Dependent cases fail with an explicit message if this never ran.
async fn setup(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let row = [["Test User", TEST_EMAIL, "TEST001", "Computer Science"]];
    let payload = json!({ "csvData": roster_csv(&row) });
    client
        .post("/students/upload", &payload)
        .await?
        .expect_status(200)?;

    let resp = client.get("/students").await?.expect_status(200)?;
    let students = resp.array()?;

    let found = students
        .iter()
        .find(|s| s.get("email").and_then(Value::as_str) == Some(TEST_EMAIL))
        .ok_or_else(|| CheckError::Assertion("Test student not found in response".into()))?;

    let student: StudentRecord = serde_json::from_value(found.clone())?;
    let id = student.id.clone();
    ctx.student = Some(student);
    Ok(CasePass::new(format!("Test student found with ID: {}", id)))
}

async fn get_single_student(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let student = ctx.student()?;
    let resp = client
        .get(&format!("/students/{}", student.id))
        .await?
        .expect_status(200)?;

    if resp.require_str("id")? != student.id {
        return Err(CheckError::BadField {
            field: "id".into(),
            detail: "does not match requested student".into(),
        });
    }
    if resp.require_str("email")? != TEST_EMAIL {
        return Err(CheckError::BadField {
            field: "email".into(),
            detail: format!("expected '{}'", TEST_EMAIL),
        });
    }

    let name = resp.require_str("name")?.to_string();
    Ok(CasePass::new(format!(
        "Successfully retrieved student: {}",
        name
    )))
}

fn profile_update() -> Value {
    json!({
        "name": "Test User Updated",
        "phone": "9876543210",
        "address": "123 Test Street, Test City, State - 123456",
        "dateOfBirth": "1995-05-15",
        "guardianName": "Test Guardian",
        "guardianPhone": "9876543211",
        "bloodGroup": "A+",
    })
}

/// Compare every expected field against the body; list the mismatches.
fn verify_fields(body: &Value, expected: &Value) -> Result<(), CheckError> {
    let mut issues = Vec::new();
    if let Some(map) = expected.as_object() {
        for (field, want) in map {
            let got = body.get(field);
            if got != Some(want) {
                issues.push(format!(
                    "{}: expected {}, got {}",
                    field,
                    want,
                    got.unwrap_or(&Value::Null)
                ));
            }
        }
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(CheckError::Assertion(issues.join(", ")))
    }
}

async fn update_profile(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let student_id = ctx.student()?.id.clone();
    let update = profile_update();
    let resp = client
        .put(&format!("/students/{}", student_id), &update)
        .await?
        .expect_status(200)?;

    verify_fields(resp.json()?, &update)?;
    Ok(CasePass::new("All profile fields updated successfully"))
}

async fn verify_persistence(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let student_id = ctx.student()?.id.clone();
    let resp = client
        .get(&format!("/students/{}", student_id))
        .await?
        .expect_status(200)?;

    // The rename is verified by the update case; here only the new fields
    let mut expected = profile_update();
    if let Some(map) = expected.as_object_mut() {
        map.remove("name");
    }
    verify_fields(resp.json()?, &expected)?;
    Ok(CasePass::new("All updates persisted correctly"))
}

async fn get_invalid_id(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    let resp = client
        .get("/students/invalid-uuid-12345")
        .await?
        .expect_status(404)?;

    // An error field is nice to have but not required
    if let Ok(error) = resp.require_str("error") {
        return Ok(CasePass::new(format!(
            "Correctly returned 404 with error: {}",
            error
        )));
    }
    Ok(CasePass::new("Correctly returned 404"))
}

async fn update_invalid_id(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    let payload = json!({ "phone": "1234567890", "address": "Invalid Address" });
    let resp = client
        .put("/students/invalid-uuid-12345", &payload)
        .await?
        .expect_status(404)?;

    if let Ok(error) = resp.require_str("error") {
        return Ok(CasePass::new(format!(
            "Correctly returned 404 with error: {}",
            error
        )));
    }
    Ok(CasePass::new("Correctly returned 404"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_fields_pass() {
        let body = json!({ "phone": "9876543210", "bloodGroup": "A+", "extra": 1 });
        let expected = json!({ "phone": "9876543210", "bloodGroup": "A+" });
        assert!(verify_fields(&body, &expected).is_ok());
    }

    #[test]
    fn test_verify_fields_reports_each_mismatch() {
        let body = json!({ "phone": "000" });
        let expected = json!({ "phone": "9876543210", "bloodGroup": "A+" });
        let err = verify_fields(&body, &expected).unwrap_err().to_string();
        assert!(err.contains("phone"));
        assert!(err.contains("bloodGroup"));
    }

    #[test]
    fn test_profile_update_has_seven_fields() {
        assert_eq!(profile_update().as_object().unwrap().len(), 7);
    }
}
