use serde::{Deserialize, Serialize};

use crate::client::CheckError;

/// Student record as the backend returns it (camelCase wire names).
/// Unknown fields (phone, address, ...) are ignored on capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub roll_no: String,
    pub department: String,
}

/// Mutable bag of values captured from responses, scoped to one suite run.
///
/// Later cases consume what earlier cases captured (a created student, a
/// created request id). Accessors return a prerequisite error instead of
/// panicking when the capture never happened.
#[derive(Debug, Default)]
pub struct RunContext {
    pub student: Option<StudentRecord>,
    pub request_id: Option<String>,
    pub notification_id: Option<String>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn student(&self) -> Result<&StudentRecord, CheckError> {
        self.student
            .as_ref()
            .ok_or(CheckError::Prereq("no student data available"))
    }

    pub fn request_id(&self) -> Result<&str, CheckError> {
        self.request_id
            .as_deref()
            .ok_or(CheckError::Prereq("no request ID available"))
    }

    pub fn notification_id(&self) -> Result<&str, CheckError> {
        self.notification_id
            .as_deref()
            .ok_or(CheckError::Prereq("no notification ID available"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context_reports_missing_prereq() {
        let ctx = RunContext::new();
        assert!(matches!(ctx.student(), Err(CheckError::Prereq(_))));
        assert!(matches!(ctx.request_id(), Err(CheckError::Prereq(_))));
        assert!(matches!(ctx.notification_id(), Err(CheckError::Prereq(_))));
    }

    #[test]
    fn test_captured_student_roundtrip() {
        let mut ctx = RunContext::new();
        let student: StudentRecord = serde_json::from_value(serde_json::json!({
            "id": "abc-123",
            "name": "John Doe",
            "email": "john.doe@test.com",
            "rollNo": "CS001",
            "department": "Computer Science",
            "phone": "000"
        }))
        .unwrap();
        ctx.student = Some(student);
        assert_eq!(ctx.student().unwrap().roll_no, "CS001");
    }
}
