//! Structured-upload, notification, and deletion probes: a service request
//! approval must raise a notification for the student, and a deleted student
//! must disappear from the id endpoint.

use serde_json::{json, Value};

use super::backend::service_request_payload;
use super::{CaseDef, CasePass, CaseResult, Suite};
use crate::client::response::require_str_field;
use crate::client::{ApiClient, CheckError};
use crate::runner::context::{RunContext, StudentRecord};

pub fn suite() -> Suite {
    Suite {
        name: "features",
        title: "Notifications & Deletion",
        cases: vec![
            CaseDef::new("Structured Upload", |c, ctx| {
                Box::pin(structured_upload(c, ctx))
            }),
            CaseDef::new("Verify Persistence", |c, ctx| {
                Box::pin(verify_persistence(c, ctx))
            }),
            CaseDef::new("Create Service Request", |c, ctx| {
                Box::pin(create_service_request(c, ctx))
            }),
            CaseDef::new("Approve Request", |c, ctx| {
                Box::pin(approve_request(c, ctx))
            }),
            CaseDef::new("Get Notifications", |c, ctx| {
                Box::pin(get_notifications(c, ctx))
            }),
            CaseDef::new("Mark Notification Read", |c, ctx| {
                Box::pin(mark_notification_read(c, ctx))
            }),
            CaseDef::new("Get Unread Count", |c, ctx| {
                Box::pin(get_unread_count(c, ctx))
            }),
            CaseDef::new("Delete Student", |c, ctx| Box::pin(delete_student(c, ctx))),
            CaseDef::new("Verify Student Deleted", |c, ctx| {
                Box::pin(verify_student_deleted(c, ctx))
            }),
            CaseDef::new("Basic Endpoints", |c, ctx| {
                Box::pin(basic_endpoints(c, ctx))
            }),
        ],
    }
}

const UPLOAD_EMAIL: &str = "excel.test@test.com";

fn students_payload() -> Value {
    json!({
        "students": [
            {
                "name": "Excel Test Student",
                "email": UPLOAD_EMAIL,
                "rollNo": "EXL001",
                "department": "Computer Science",
            },
            {
                "name": "Another Test Student",
                "email": "another.test@test.com",
                "rollNo": "EXL002",
                "department": "Electronics",
            },
        ],
    })
}

async fn structured_upload(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    let resp = client
        .post("/students/upload", &students_payload())
        .await?
        .expect_status(200)?;
    let count = resp.require_u64("count")?;
    if count == 0 {
        return Err(CheckError::Assertion("No students uploaded".into()));
    }
    Ok(CasePass::new(format!(
        "Uploaded {} students via JSON format",
        count
    )))
}

async fn verify_persistence(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let resp = client.get("/students").await?.expect_status(200)?;
    let students = resp.array()?;

    let found = students
        .iter()
        .find(|s| s.get("email").and_then(Value::as_str) == Some(UPLOAD_EMAIL))
        .ok_or_else(|| CheckError::Assertion("Uploaded student not found".into()))?;

    let student: StudentRecord = serde_json::from_value(found.clone())?;
    let name = student.name.clone();
    ctx.student = Some(student);
    Ok(CasePass::new(format!("Found uploaded student: {}", name)))
}

async fn create_service_request(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let payload = service_request_payload(ctx.student()?, "Testing Notification System");
    let resp = client
        .post("/requests", &payload)
        .await?
        .expect_status(200)?;

    let id = resp.require_str("id")?.to_string();
    let status = resp.require_str("status")?;
    if status != "pending" {
        return Err(CheckError::BadField {
            field: "status".into(),
            detail: format!("expected \"pending\", got \"{}\"", status),
        });
    }

    ctx.request_id = Some(id.clone());
    Ok(CasePass::new(format!("Service request created: {}", id)))
}

async fn approve_request(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let request_id = ctx.request_id()?.to_string();
    let payload = json!({
        "status": "approved",
        "remarks": "Request approved for notification testing",
    });

    let resp = client
        .put(&format!("/requests/{}", request_id), &payload)
        .await?
        .expect_status(200)?;
    let status = resp.require_str("status")?;
    if status != "approved" {
        return Err(CheckError::BadField {
            field: "status".into(),
            detail: format!("expected \"approved\", got \"{}\"", status),
        });
    }
    Ok(CasePass::new(
        "Request approved, notification should be created",
    ))
}

async fn get_notifications(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let user_id = ctx.student()?.id.clone();
    let request_id = ctx.request_id()?.to_string();

    let resp = client
        .get(&format!("/notifications?userId={}", user_id))
        .await?
        .expect_status(200)?;
    let notifications = resp.array()?;
    if notifications.is_empty() {
        return Err(CheckError::Assertion("No notifications found".into()));
    }

    // Pick the notification raised by the approval above
    let notification = notifications
        .iter()
        .find(|n| n.get("relatedRequestId").and_then(Value::as_str) == Some(&request_id))
        .ok_or_else(|| {
            CheckError::Assertion(format!("No notification found for request {}", request_id))
        })?;

    let id = require_str_field(notification, "id")?.to_string();
    let title = require_str_field(notification, "title")?;

    let pass =
        CasePass::new(format!("Found notification: {}", title)).with_snapshot(notification.clone());
    ctx.notification_id = Some(id);
    Ok(pass)
}

async fn mark_notification_read(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let notification_id = ctx.notification_id()?.to_string();
    let resp = client
        .put(&format!("/notifications/{}", notification_id), &json!({}))
        .await?
        .expect_status(200)?;
    resp.require("message")?;
    Ok(CasePass::new("Notification marked as read"))
}

async fn get_unread_count(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let user_id = ctx.student()?.id.clone();
    let resp = client
        .get(&format!("/notifications/unread-count?userId={}", user_id))
        .await?
        .expect_status(200)?;
    let count = resp.require_u64("count")?;
    Ok(CasePass::new(format!("Unread count: {}", count)))
}

async fn delete_student(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let student_id = ctx.student()?.id.clone();
    let resp = client
        .delete(&format!("/students/{}", student_id))
        .await?
        .expect_status(200)?;

    let message = resp.require_str("message")?;
    if !message.to_lowercase().contains("deleted") {
        return Err(CheckError::BadField {
            field: "message".into(),
            detail: format!("expected a deletion confirmation, got \"{}\"", message),
        });
    }
    Ok(CasePass::new("Student deleted successfully"))
}

async fn verify_student_deleted(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let student_id = ctx.student()?.id.clone();
    client
        .get(&format!("/students/{}", student_id))
        .await?
        .expect_status(404)?;
    Ok(CasePass::new("Student correctly removed"))
}

/// Sweep the read-only endpoints; all three must answer with non-empty JSON.
async fn basic_endpoints(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    for path in ["/stats", "/fee-structures", "/services"] {
        let resp = client.get(path).await?.expect_status(200)?;
        let body = resp.json()?;
        let empty = match body {
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            _ => true,
        };
        if empty {
            return Err(CheckError::Assertion(format!(
                "{} returned an empty response",
                path
            )));
        }
    }
    Ok(CasePass::new("Stats, fee structures, and services all answer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_students_payload_shape() {
        let payload = students_payload();
        let students = payload["students"].as_array().unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(students[0]["email"], UPLOAD_EMAIL);
        assert_eq!(students[1]["rollNo"], "EXL002");
    }

    #[test]
    fn test_suite_runs_ten_cases() {
        assert_eq!(suite().cases.len(), 10);
    }
}
