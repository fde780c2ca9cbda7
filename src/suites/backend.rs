//! Core backend sweep: roster upload, logins for each role, the service
//! request lifecycle, and the read-only dashboard endpoints.

use serde_json::json;

use super::{CaseDef, CasePass, CaseResult, Suite};
use crate::client::response::require_str_field;
use crate::client::{ApiClient, CheckError};
use crate::runner::context::{RunContext, StudentRecord};

pub fn suite() -> Suite {
    Suite {
        name: "backend",
        title: "Backend API",
        cases: vec![
            CaseDef::new("Root Endpoint", |c, ctx| Box::pin(root_endpoint(c, ctx))),
            CaseDef::new("CSV Upload", |c, ctx| Box::pin(csv_upload(c, ctx))),
            CaseDef::new("Get Students", |c, ctx| Box::pin(get_students(c, ctx))),
            CaseDef::new("Student Login", |c, ctx| Box::pin(student_login(c, ctx))),
            CaseDef::new("Academic Login", |c, ctx| Box::pin(academic_login(c, ctx))),
            CaseDef::new("Faculty Login", |c, ctx| Box::pin(faculty_login(c, ctx))),
            CaseDef::new("Create Service Request", |c, ctx| {
                Box::pin(create_service_request(c, ctx))
            }),
            CaseDef::new("Get All Requests", |c, ctx| {
                Box::pin(get_all_requests(c, ctx))
            }),
            CaseDef::new("Get Student Requests", |c, ctx| {
                Box::pin(get_student_requests(c, ctx))
            }),
            CaseDef::new("Update Request Status", |c, ctx| {
                Box::pin(update_request_status(c, ctx))
            }),
            CaseDef::new("Dashboard Stats", |c, ctx| {
                Box::pin(dashboard_stats(c, ctx))
            }),
            CaseDef::new("Fee Structures", |c, ctx| Box::pin(fee_structures(c, ctx))),
            CaseDef::new("Services", |c, ctx| Box::pin(services(c, ctx))),
        ],
    }
}

const ROSTER_HEADER: [&str; 4] = ["Name", "Email", "Roll No", "Department"];

const ROSTER_ROWS: [[&str; 4]; 3] = [
    ["John Doe", "john.doe@test.com", "CS001", "Computer Science"],
    ["Jane Smith", "jane.smith@test.com", "CS002", "Computer Science"],
    ["Bob Wilson", "bob.wilson@test.com", "EE001", "Electrical Engineering"],
];

/// Render roster rows as the CSV text the upload endpoint expects.
pub(crate) fn roster_csv(rows: &[[&str; 4]]) -> String {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(ROSTER_HEADER).ok();
    for row in rows {
        wtr.write_record(row).ok();
    }
    match wtr.into_inner() {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}

async fn root_endpoint(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    let resp = client.get("/").await?.expect_status(200)?;
    let message = resp.require_str("message")?;
    Ok(CasePass::new(format!("API accessible: {}", message)))
}

async fn csv_upload(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    let payload = json!({ "csvData": roster_csv(&ROSTER_ROWS) });
    let resp = client
        .post("/students/upload", &payload)
        .await?
        .expect_status(200)?;
    let count = resp.require_u64("count")?;
    if count == 0 {
        return Err(CheckError::Assertion("No students uploaded".into()));
    }
    Ok(CasePass::new(format!(
        "Uploaded {} students successfully",
        count
    )))
}

async fn get_students(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let resp = client.get("/students").await?.expect_status(200)?;
    let students = resp.array()?;
    if students.is_empty() {
        return Err(CheckError::Assertion("No students found".into()));
    }

    // Capture the first student for the login and request cases
    let first: StudentRecord = serde_json::from_value(students[0].clone())?;
    ctx.student = Some(first);

    Ok(CasePass::new(format!(
        "Retrieved {} students",
        students.len()
    )))
}

async fn student_login(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let student = ctx.student()?;
    let payload = json!({
        "userId": student.email,
        "password": "student@123",
        "role": "student",
    });

    let resp = client
        .post("/auth/login", &payload)
        .await?
        .expect_status(200)?;
    let user = resp.require("user")?;
    let role = require_str_field(user, "role")?;
    if role != "student" {
        return Err(CheckError::BadField {
            field: "user.role".into(),
            detail: format!("expected \"student\", got \"{}\"", role),
        });
    }
    let name = require_str_field(user, "name")?;
    Ok(CasePass::new(format!("Student login successful for {}", name)))
}

async fn academic_login(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    staff_login(
        client,
        json!({
            "userId": "admin@institute.edu",
            "password": "admin123",
            "role": "academic",
            "name": "Academic Administrator",
        }),
        "academic",
    )
    .await
}

async fn faculty_login(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    staff_login(
        client,
        json!({
            "userId": "faculty@institute.edu",
            "password": "faculty123",
            "role": "faculty",
            "name": "Faculty Member",
        }),
        "faculty",
    )
    .await
}

async fn staff_login(
    client: &ApiClient,
    payload: serde_json::Value,
    expected_role: &str,
) -> CaseResult {
    let resp = client
        .post("/auth/login", &payload)
        .await?
        .expect_status(200)?;
    let user = resp.require("user")?;
    let role = require_str_field(user, "role")?;
    if role != expected_role {
        return Err(CheckError::BadField {
            field: "user.role".into(),
            detail: format!("expected \"{}\", got \"{}\"", expected_role, role),
        });
    }
    let name = require_str_field(user, "name")?;
    Ok(CasePass::new(format!(
        "{} login successful for {}",
        expected_role, name
    )))
}

/// Build the service request payload from a captured student.
pub(crate) fn service_request_payload(student: &StudentRecord, purpose: &str) -> serde_json::Value {
    json!({
        "studentId": student.id,
        "studentName": student.name,
        "studentEmail": student.email,
        "rollNo": student.roll_no,
        "department": student.department,
        "serviceType": "bonafide",
        "details": {
            "purpose": purpose,
            "urgency": "normal",
        },
    })
}

async fn create_service_request(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let payload = service_request_payload(ctx.student()?, "Job Application");
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

    let snapshot = resp.snapshot();
    ctx.request_id = Some(id.clone());
    let mut pass = CasePass::new(format!("Service request created with ID: {}", id));
    if let Some(snapshot) = snapshot {
        pass = pass.with_snapshot(snapshot);
    }
    Ok(pass)
}

async fn get_all_requests(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    let resp = client.get("/requests").await?.expect_status(200)?;
    let requests = resp.array()?;
    Ok(CasePass::new(format!(
        "Retrieved {} service requests",
        requests.len()
    )))
}

async fn get_student_requests(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let student = ctx.student()?;
    let resp = client
        .get(&format!("/requests?studentId={}", student.id))
        .await?
        .expect_status(200)?;
    let requests = resp.array()?;
    Ok(CasePass::new(format!(
        "Retrieved {} requests for student",
        requests.len()
    )))
}

async fn update_request_status(client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
    let request_id = ctx.request_id()?.to_string();
    let payload = json!({
        "status": "approved",
        "remarks": "Request approved by portal-probe",
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
    Ok(CasePass::new("Request status updated to approved"))
}

const STATS_FIELDS: [&str; 5] = [
    "totalStudents",
    "totalRequests",
    "pendingRequests",
    "approvedRequests",
    "rejectedRequests",
];

async fn dashboard_stats(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    let resp = client.get("/stats").await?.expect_status(200)?;
    for field in STATS_FIELDS {
        resp.require(field)?;
    }

    let total_students = resp.require("totalStudents")?.clone();
    let total_requests = resp.require("totalRequests")?.clone();
    let mut pass = CasePass::new(format!(
        "Stats retrieved: {} students, {} requests",
        total_students, total_requests
    ));
    if let Some(snapshot) = resp.snapshot() {
        pass = pass.with_snapshot(snapshot);
    }
    Ok(pass)
}

async fn fee_structures(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    let resp = client.get("/fee-structures").await?.expect_status(200)?;
    let structures = resp.array()?;
    if structures.is_empty() {
        return Err(CheckError::Assertion("No fee structures found".into()));
    }
    Ok(CasePass::new(format!(
        "Retrieved {} fee structures",
        structures.len()
    )))
}

async fn services(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
    let resp = client.get("/services").await?.expect_status(200)?;
    let services = resp.array()?;
    if services.is_empty() {
        return Err(CheckError::Assertion("No services found".into()));
    }
    Ok(CasePass::new(format!(
        "Retrieved {} services",
        services.len()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_csv_shape() {
        let csv = roster_csv(&ROSTER_ROWS);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Name,Email,Roll No,Department"));
        assert_eq!(
            lines.next(),
            Some("John Doe,john.doe@test.com,CS001,Computer Science")
        );
        assert_eq!(csv.lines().count(), 4);
    }

    #[test]
    fn test_service_request_payload() {
        let student = StudentRecord {
            id: "abc".into(),
            name: "John Doe".into(),
            email: "john.doe@test.com".into(),
            roll_no: "CS001".into(),
            department: "Computer Science".into(),
        };
        let payload = service_request_payload(&student, "Job Application");
        assert_eq!(payload["studentId"], "abc");
        assert_eq!(payload["rollNo"], "CS001");
        assert_eq!(payload["serviceType"], "bonafide");
        assert_eq!(payload["details"]["purpose"], "Job Application");
    }

    #[test]
    fn test_suite_runs_thirteen_cases() {
        assert_eq!(suite().cases.len(), 13);
    }
}
