//! Agent-facing tool adapter over the complaint store.
//!
//! Every tool returns a `serde_json::Value`: a JSON object when the
//! operation produced a record or an identifier, a plain string otherwise.
//! Failures of any kind are rendered into that string. Callers distinguish
//! success from failure by inspecting the shape of the value, not through a
//! typed error channel.

use complaint_desk_core::{ComplaintError, NewComplaint};
use complaint_desk_store_sqlite::ComplaintStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

pub const TOOL_CREATE_COMPLAINT: &str = "create_complaint";
pub const TOOL_GET_COMPLAINT_DETAILS: &str = "get_complaint_details";
pub const TOOL_UPDATE_COMPLAINT_STATUS: &str = "update_complaint_status";

/// Registration metadata for one tool: its name, a caller-facing
/// description, and a JSON Schema object describing the arguments.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateComplaintParams {
    name: String,
    phone_number: String,
    email: String,
    complaint_details: String,
}

#[derive(Debug, Deserialize)]
struct GetComplaintDetailsParams {
    complaint_id: String,
}

#[derive(Debug, Deserialize)]
struct UpdateComplaintStatusParams {
    complaint_id: String,
    status: String,
}

/// Creates a new complaint record and returns the complaint ID.
///
/// Validation is the store's: the same gate the HTTP adapter goes through.
#[must_use]
pub fn create_complaint(
    store: &ComplaintStore,
    name: &str,
    phone_number: &str,
    email: &str,
    complaint_details: &str,
) -> Value {
    let input = NewComplaint {
        name: name.to_string(),
        phone_number: phone_number.to_string(),
        email: email.to_string(),
        complaint_details: complaint_details.to_string(),
    };

    match store.create(&input) {
        Ok(complaint_id) => {
            debug!(%complaint_id, "complaint created via tool call");
            json!({
                "complaint_id": complaint_id,
                "message": "Complaint created successfully"
            })
        }
        Err(err) => Value::String(format!("Error creating complaint: {err}")),
    }
}

/// Returns the complaint details based on the complaint ID. The returned
/// object carries every stored field except `status`.
#[must_use]
pub fn get_complaint_details(store: &ComplaintStore, complaint_id: &str) -> Value {
    match store.get(complaint_id) {
        Ok(record) => {
            debug!(%complaint_id, "complaint fetched via tool call");
            match serde_json::to_value(&record) {
                Ok(value) => value,
                Err(err) => Value::String(format!("Error retrieving complaint: {err}")),
            }
        }
        Err(ComplaintError::NotFound(_)) => Value::String("Complaint not found".to_string()),
        Err(err) => Value::String(format!("Error retrieving complaint: {err}")),
    }
}

/// Updates the status of a complaint. Any status string is accepted.
#[must_use]
pub fn update_complaint_status(store: &ComplaintStore, complaint_id: &str, status: &str) -> Value {
    match store.update_status(complaint_id, status) {
        Ok(()) => {
            debug!(%complaint_id, %status, "complaint status updated via tool call");
            Value::String(format!("Complaint status updated to {status}"))
        }
        Err(ComplaintError::NotFound(_)) => Value::String("Complaint not found".to_string()),
        Err(err) => Value::String(format!("Error updating complaint status: {err}")),
    }
}

/// The registration list an agent framework consumes.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: TOOL_CREATE_COMPLAINT,
            description: "Creates a new complaint record and returns the complaint ID.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "phone_number": {"type": "string"},
                    "email": {"type": "string"},
                    "complaint_details": {"type": "string"}
                },
                "required": ["name", "phone_number", "email", "complaint_details"]
            }),
        },
        ToolDefinition {
            name: TOOL_GET_COMPLAINT_DETAILS,
            description: "Returns the complaint details based on the complaint ID.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "complaint_id": {"type": "string"}
                },
                "required": ["complaint_id"]
            }),
        },
        ToolDefinition {
            name: TOOL_UPDATE_COMPLAINT_STATUS,
            description: "Updates the status of a complaint.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "complaint_id": {"type": "string"},
                    "status": {"type": "string"}
                },
                "required": ["complaint_id", "status"]
            }),
        },
    ]
}

fn parse_params<T: DeserializeOwned>(tool: &str, args: &Value) -> Result<T, Value> {
    serde_json::from_value(args.clone()).map_err(|err| {
        Value::String(format!("Error calling {tool}: invalid arguments: {err}"))
    })
}

/// Name-based dispatch for frameworks that route calls dynamically. Unknown
/// names and undecodable arguments come back in the same string form as any
/// other tool failure.
#[must_use]
pub fn call_tool(store: &ComplaintStore, name: &str, args: &Value) -> Value {
    match name {
        TOOL_CREATE_COMPLAINT => match parse_params::<CreateComplaintParams>(name, args) {
            Ok(params) => create_complaint(
                store,
                &params.name,
                &params.phone_number,
                &params.email,
                &params.complaint_details,
            ),
            Err(response) => response,
        },
        TOOL_GET_COMPLAINT_DETAILS => match parse_params::<GetComplaintDetailsParams>(name, args) {
            Ok(params) => get_complaint_details(store, &params.complaint_id),
            Err(response) => response,
        },
        TOOL_UPDATE_COMPLAINT_STATUS => {
            match parse_params::<UpdateComplaintStatusParams>(name, args) {
                Ok(params) => update_complaint_status(store, &params.complaint_id, &params.status),
                Err(response) => response,
            }
        }
        _ => Value::String(format!("Unknown tool: {name}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn must<T, E: std::fmt::Display>(result: Result<T, E>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => panic!("expected Ok(..), got error: {err}"),
        }
    }

    fn fixture_store() -> (ComplaintStore, PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "complaint-desk-tools-{}.sqlite3",
            uuid::Uuid::new_v4()
        ));
        let store = ComplaintStore::new(&path);
        must(store.initialize());
        (store, path)
    }

    fn as_object_field<'a>(value: &'a Value, key: &str) -> &'a str {
        match value.get(key).and_then(Value::as_str) {
            Some(field) => field,
            None => panic!("expected object field {key}, got: {value}"),
        }
    }

    #[test]
    fn create_returns_object_with_identifier() {
        let (store, path) = fixture_store();

        let response = create_complaint(
            &store,
            "Alice",
            "+14155550123",
            "alice@example.com",
            "Late delivery",
        );
        assert!(response.is_object(), "expected object, got: {response}");
        assert!(as_object_field(&response, "complaint_id").starts_with("CMP"));
        assert_eq!(
            as_object_field(&response, "message"),
            "Complaint created successfully"
        );

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn create_failure_is_a_plain_string() {
        let (store, path) = fixture_store();

        let response = create_complaint(&store, "Alice", "123", "alice@example.com", "Late");
        match response {
            Value::String(message) => {
                assert!(
                    message.starts_with("Error creating complaint:"),
                    "unexpected message: {message}"
                );
            }
            other => panic!("expected string response, got: {other}"),
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn get_returns_projection_without_status() {
        let (store, path) = fixture_store();

        let response = get_complaint_details(&store, "CMP001");
        assert_eq!(as_object_field(&response, "name"), "John Doe");
        assert_eq!(
            as_object_field(&response, "created_at"),
            "2025-06-25T10:30:00Z"
        );
        assert!(response.get("status").is_none());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn get_unknown_id_is_the_not_found_string() {
        let (store, path) = fixture_store();

        assert_eq!(
            get_complaint_details(&store, "CMP99999999"),
            Value::String("Complaint not found".to_string())
        );

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn update_status_confirms_with_the_submitted_value() {
        let (store, path) = fixture_store();

        assert_eq!(
            update_complaint_status(&store, "CMP001", "resolved"),
            Value::String("Complaint status updated to resolved".to_string())
        );
        assert_eq!(
            update_complaint_status(&store, "CMP99999999", "resolved"),
            Value::String("Complaint not found".to_string())
        );

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn dispatch_round_trips_create_and_get() {
        let (store, path) = fixture_store();

        let created = call_tool(
            &store,
            TOOL_CREATE_COMPLAINT,
            &json!({
                "name": "Alice",
                "phone_number": "+14155550123",
                "email": "alice@example.com",
                "complaint_details": "Late delivery"
            }),
        );
        let complaint_id = as_object_field(&created, "complaint_id").to_string();

        let fetched = call_tool(
            &store,
            TOOL_GET_COMPLAINT_DETAILS,
            &json!({"complaint_id": complaint_id}),
        );
        assert_eq!(as_object_field(&fetched, "email"), "alice@example.com");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn dispatch_funnels_missing_create_fields_into_validation() {
        let (store, path) = fixture_store();

        let response = call_tool(&store, TOOL_CREATE_COMPLAINT, &json!({"name": "Alice"}));
        match response {
            Value::String(message) => {
                assert!(
                    message.starts_with("Error creating complaint:"),
                    "unexpected message: {message}"
                );
            }
            other => panic!("expected string response, got: {other}"),
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn dispatch_rejects_unknown_tools_and_bad_arguments() {
        let (store, path) = fixture_store();

        assert_eq!(
            call_tool(&store, "close_complaint", &json!({})),
            Value::String("Unknown tool: close_complaint".to_string())
        );

        let response = call_tool(&store, TOOL_GET_COMPLAINT_DETAILS, &json!({}));
        match response {
            Value::String(message) => {
                assert!(
                    message.starts_with("Error calling get_complaint_details:"),
                    "unexpected message: {message}"
                );
            }
            other => panic!("expected string response, got: {other}"),
        }

        let _ = std::fs::remove_file(&path);
    }
}
