use http::Method;
use oas3::spec::{ObjectOrReference, Operation, Parameter};
use serde_json::json;
use tracing::{debug, warn};

use super::schema::schema_for;
use crate::error::DocError;
use crate::registry::{title_case, FieldMeta, RequestObject};

fn parameter<R>(
    name: &str,
    location: &str,
    required: bool,
    field: &FieldMeta<R>,
) -> Result<Parameter, DocError> {
    let mut param = json!({
        "name": name,
        "in": location,
        "required": required,
        "schema": schema_for(name, field.shape())?,
    });
    if let Some(example) = field.example() {
        param["example"] = json!(example);
    }
    Ok(serde_json::from_value(param)?)
}

/// Append one path parameter per route parameter of `R` to `op`.
///
/// The route is found by matching the `path` section's example URL against `router` for
/// `method`; each parameter the match yields must exist on the `path` section. An example that
/// matches no route documents nothing.
///
/// # Errors
///
/// [`DocError::MissingPathSection`] if `R` has no `path` section, [`DocError::MissingField`] if
/// the route declares a parameter the section lacks, or a schema error for the field's shape.
pub fn generate_params<R: RequestObject>(
    router: &crate::router::Router,
    op: &mut Operation,
    method: &Method,
) -> Result<(), DocError> {
    let layout = R::layout();
    let section = layout.path.ok_or(DocError::MissingPathSection {
        type_name: layout.type_name,
    })?;

    let example = section.example.unwrap_or_default();
    let Some(route_match) = router.route(method, example) else {
        warn!(
            request_type = layout.type_name,
            method = %method,
            example = %example,
            "Path example matches no route, no path parameters documented"
        );
        return Ok(());
    };

    for key in route_match.keys() {
        let field = section.field(key).ok_or_else(|| DocError::MissingField {
            type_name: section.type_name,
            field: key.to_string(),
        })?;
        let param = parameter(key, "path", true, field)?;
        op.parameters.push(ObjectOrReference::Object(param));
    }

    debug!(
        request_type = layout.type_name,
        route_pattern = %route_match.route.path_pattern,
        params = route_match.path_params.len(),
        "Path parameters documented"
    );
    Ok(())
}

/// Append one optional query parameter per `query` field of `R` to `op`.
///
/// Parameter names are the title-cased field names the binder matches against.
///
/// # Errors
///
/// A schema error for a field's shape.
pub fn generate_query_params<R: RequestObject>(op: &mut Operation) -> Result<(), DocError> {
    let Some(section) = R::layout().query else {
        return Ok(());
    };
    for field in &section.fields {
        let param = parameter(&title_case(field.name()), "query", false, field)?;
        op.parameters.push(ObjectOrReference::Object(param));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Layout, Params, Section};
    use crate::router::{RouteMeta, Router};

    #[derive(Debug, Default, Clone)]
    struct Pair {
        user: String,
        post: u64,
    }

    impl Params for Pair {
        fn fields() -> Vec<FieldMeta<Self>> {
            vec![
                FieldMeta::new::<String, _>("user", Some("ana"), |s: &mut Pair, v| s.user = v),
                FieldMeta::new::<u64, _>("post", None, |s: &mut Pair, v| s.post = v),
            ]
        }
    }

    #[derive(Debug, Default, Clone)]
    struct GetPost {
        path: Pair,
    }

    impl RequestObject for GetPost {
        type Body = ();
        type Response = ();

        fn layout() -> Layout<Self> {
            let mut layout = Layout::empty("GetPost");
            layout.path = Some(Section::<Self>::of::<Pair>(Some("/users/ana/posts/3"), |r| {
                &mut r.path
            }));
            layout
        }
    }

    fn empty_operation() -> Operation {
        serde_json::from_value(json!({"responses": {}})).unwrap()
    }

    #[test]
    fn test_params_follow_route_order() {
        let router = Router::new(vec![RouteMeta::new(
            Method::GET,
            "/users/{user}/posts/{post}",
            "get_post",
        )]);
        let mut op = empty_operation();
        generate_params::<GetPost>(&router, &mut op, &Method::GET).unwrap();

        let params: Vec<serde_json::Value> = op
            .parameters
            .iter()
            .map(|p| serde_json::to_value(p).unwrap())
            .collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0]["name"], "user");
        assert_eq!(params[0]["in"], "path");
        assert_eq!(params[0]["example"], "ana");
        assert_eq!(params[1]["name"], "post");
        assert_eq!(params[1]["schema"]["minimum"], 0);
        assert!(params[1].get("example").is_none());
    }

    #[test]
    fn test_wrong_method_documents_nothing() {
        let router = Router::new(vec![RouteMeta::new(
            Method::GET,
            "/users/{user}/posts/{post}",
            "get_post",
        )]);
        let mut op = empty_operation();
        generate_params::<GetPost>(&router, &mut op, &Method::DELETE).unwrap();
        assert!(op.parameters.is_empty());
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let router = Router::new(vec![RouteMeta::new(
            Method::GET,
            "/users/{user}/posts/{post_id}",
            "get_post",
        )]);
        let mut op = empty_operation();
        let err = generate_params::<GetPost>(&router, &mut op, &Method::GET).unwrap_err();
        assert!(matches!(err, DocError::MissingField { ref field, .. } if field == "post_id"));
    }
}
