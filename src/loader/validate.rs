// Semantic checks on a structurally valid document.

use std::collections::{BTreeSet, HashSet};

use openapi::{OpenAPI, ParameterData};
use thiserror::Error;

use crate::parser::swagger::{as_item, operations, parameter_parts};

#[derive(Debug, Error)]
#[error("invalid document: {}", .issues.join("; "))]
pub struct ValidationError {
    pub issues: Vec<String>,
}

/// Check the rules the typed model cannot express on its own
pub fn validate(doc: &OpenAPI) -> Result<(), ValidationError> {
    let mut issues = Vec::new();

    if doc.info.title.trim().is_empty() {
        issues.push("info.title must be a non-empty string".to_string());
    }
    if doc.info.version.trim().is_empty() {
        issues.push("info.version must be a non-empty string".to_string());
    }

    let mut operation_ids = HashSet::new();

    for (path, item) in doc.paths.paths.iter() {
        if !path.starts_with('/') {
            issues.push(format!("path {:?} does not start with a forward slash", path));
        }

        let item = match as_item(item) {
            Some(item) => item,
            None => continue,
        };

        let template = template_params(path);
        let shared: Vec<(&ParameterData, &str)> = item
            .parameters
            .iter()
            .filter_map(as_item)
            .map(parameter_parts)
            .collect();
        check_path_params_required(&shared, path, &mut issues);

        for (method, op) in operations(item) {
            let at = format!("{} {}", method, path);

            if let Some(id) = &op.operation_id {
                if !operation_ids.insert(id.as_str()) {
                    issues.push(format!("{}: duplicate operationId {:?}", at, id));
                }
            }

            if op.responses.responses.is_empty() && op.responses.default.is_none() {
                issues.push(format!("{}: responses must contain at least one response code", at));
            }

            let own: Vec<(&ParameterData, &str)> = op
                .parameters
                .iter()
                .filter_map(as_item)
                .map(parameter_parts)
                .collect();

            let mut seen = HashSet::new();
            for (data, location) in &own {
                if !seen.insert((data.name.as_str(), *location)) {
                    issues.push(format!(
                        "{}: duplicate {} parameter {:?}",
                        at, location, data.name
                    ));
                }
            }
            check_path_params_required(&own, &at, &mut issues);

            let declared: BTreeSet<&str> = own
                .iter()
                .chain(shared.iter())
                .filter(|(_, location)| *location == "path")
                .map(|(data, _)| data.name.as_str())
                .collect();

            for missing in template.difference(&declared) {
                issues.push(format!("{}: path parameter {:?} is not declared", at, missing));
            }
            for extra in declared.difference(&template) {
                issues.push(format!(
                    "{}: path parameter {:?} does not appear in the path",
                    at, extra
                ));
            }

            if let Some(body) = op.request_body.as_ref().and_then(as_item) {
                if body.content.is_empty() {
                    issues.push(format!("{}: request body must declare at least one media type", at));
                }
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}

fn check_path_params_required(params: &[(&ParameterData, &str)], at: &str, issues: &mut Vec<String>) {
    for (data, location) in params {
        if *location == "path" && !data.required {
            issues.push(format!("{}: path parameter {:?} must be required", at, data.name));
        }
    }
}

/// Names of the `{name}` segments of a path template
fn template_params(path: &str) -> BTreeSet<&str> {
    let mut names = BTreeSet::new();
    let mut rest = path;

    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                names.insert(&after[..end]);
                rest = &after[end + 1..];
            }
            None => break,
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(paths: serde_json::Value) -> OpenAPI {
        serde_json::from_value(json!({
            "openapi": "3.0.3",
            "info": {"title": "Pet Store", "version": "1.0"},
            "paths": paths,
        }))
        .unwrap()
    }

    fn ok() -> serde_json::Value {
        json!({"200": {"description": "OK"}})
    }

    #[test]
    fn test_template_params() {
        let names: Vec<&str> = template_params("/users/{id}/pets/{petId}").into_iter().collect();
        assert_eq!(names, vec!["id", "petId"]);
        assert!(template_params("/users").is_empty());
    }

    #[test]
    fn test_valid_document_passes() {
        let doc = document(json!({
            "/pets/{id}": {
                "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}],
                "get": {"operationId": "getPet", "responses": ok()},
                "delete": {"operationId": "deletePet", "responses": ok()}
            }
        }));
        assert!(validate(&doc).is_ok());
    }

    #[test]
    fn test_empty_title_is_reported() {
        let mut doc = document(json!({}));
        doc.info.title = String::new();
        let err = validate(&doc).unwrap_err();
        assert_eq!(err.issues, vec!["info.title must be a non-empty string"]);
    }

    #[test]
    fn test_operation_without_responses_is_reported() {
        let doc = document(json!({"/pets": {"get": {"responses": {}}}}));
        let err = validate(&doc).unwrap_err();
        assert!(err.issues[0].starts_with("GET /pets: responses must contain"));
    }

    #[test]
    fn test_duplicate_operation_ids_are_reported() {
        let doc = document(json!({
            "/a": {"get": {"operationId": "same", "responses": ok()}},
            "/b": {"get": {"operationId": "same", "responses": ok()}}
        }));
        let err = validate(&doc).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert!(err.issues[0].contains("duplicate operationId"));
    }

    #[test]
    fn test_path_parameters_must_match_template() {
        let doc = document(json!({
            "/pets/{id}": {
                "get": {
                    "parameters": [{"name": "petId", "in": "path", "required": true, "schema": {"type": "string"}}],
                    "responses": ok()
                }
            }
        }));
        let err = validate(&doc).unwrap_err();
        assert!(err.issues.iter().any(|i| i.contains("\"id\" is not declared")));
        assert!(err.issues.iter().any(|i| i.contains("\"petId\" does not appear")));
    }

    #[test]
    fn test_optional_path_parameter_is_reported() {
        let doc = document(json!({
            "/pets/{id}": {
                "get": {
                    "parameters": [{"name": "id", "in": "path", "schema": {"type": "string"}}],
                    "responses": ok()
                }
            }
        }));
        let err = validate(&doc).unwrap_err();
        assert_eq!(err.issues, vec!["GET /pets/{id}: path parameter \"id\" must be required"]);
    }

    #[test]
    fn test_duplicate_parameters_are_reported() {
        let param = json!({"name": "limit", "in": "query", "schema": {"type": "integer"}});
        let doc = document(json!({
            "/pets": {"get": {"parameters": [param.clone(), param], "responses": ok()}}
        }));
        let err = validate(&doc).unwrap_err();
        assert!(err.issues[0].contains("duplicate query parameter \"limit\""));
    }

    #[test]
    fn test_request_body_without_content_is_reported() {
        let doc = document(json!({
            "/pets": {"post": {"requestBody": {"content": {}}, "responses": ok()}}
        }));
        let err = validate(&doc).unwrap_err();
        assert!(err.issues[0].contains("request body must declare at least one media type"));
    }
}
