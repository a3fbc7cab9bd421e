//! Payload schemas for the product and user routes

use super::errors::SchemaResult;
use super::registry::SchemaRegistry;
use super::types::{FieldDef, Schema, SchemaRef};

pub const PRODUCT_CREATE: SchemaRef = SchemaRef::new("product.create");
pub const PRODUCT_UPDATE: SchemaRef = SchemaRef::new("product.update");
/// List query string; every value arrives as text
pub const PRODUCT_QUERY: SchemaRef = SchemaRef::new("product.query");
pub const USER_SIGNUP: SchemaRef = SchemaRef::new("user.signup");
pub const USER_LOGIN: SchemaRef = SchemaRef::new("user.login");
pub const USER_UPDATE: SchemaRef = SchemaRef::new("user.update");
/// Numeric `:id` path segment, wrapped as `{"id": "<segment>"}`
pub const PATH_ID: SchemaRef = SchemaRef::new("path.id");

const ROLES: &[&str] = &["user", "admin"];
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
const PASSWORD_MIN: usize = 8;
const POSITIVE_INT_PATTERN: &str = r"^[1-9]\d*$";

fn email() -> FieldDef {
    FieldDef::string("email")
        .trim()
        .lowercase()
        .pattern(EMAIL_PATTERN, Some("The field email must be a valid email address."))
}

fn product_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::string("name").trim().min_length(3),
        FieldDef::string("description").min_length(10).optional(),
        FieldDef::number("price").positive(),
        FieldDef::integer("category").positive(),
    ]
}

/// Build the registry used by the HTTP surface
pub fn registry() -> SchemaResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();

    registry.register(Schema::new(PRODUCT_CREATE.name(), product_fields())?)?;
    registry.register(Schema::new(
        PRODUCT_UPDATE.name(),
        product_fields().into_iter().map(FieldDef::optional).collect(),
    )?)?;

    registry.register(Schema::new(
        PRODUCT_QUERY.name(),
        vec![
            FieldDef::string("page")
                .pattern(POSITIVE_INT_PATTERN, Some("The field page must be a positive integer."))
                .optional(),
            FieldDef::string("limit")
                .pattern(POSITIVE_INT_PATTERN, Some("The field limit must be a positive integer."))
                .optional(),
            FieldDef::string("category")
                .pattern(POSITIVE_INT_PATTERN, Some("The field category must be a positive integer."))
                .optional(),
            FieldDef::string("search").trim().optional(),
            FieldDef::one_of("sortBy", &["price", "createdAt"]).optional(),
            FieldDef::one_of("sortOrder", &["asc", "desc"]).optional(),
        ],
    )?)?;

    registry.register(Schema::new(
        USER_SIGNUP.name(),
        vec![
            email(),
            FieldDef::string("password").min_length(PASSWORD_MIN),
            FieldDef::one_of("role", ROLES),
        ],
    )?)?;
    registry.register(Schema::new(
        USER_LOGIN.name(),
        vec![email(), FieldDef::string("password").min_length(1)],
    )?)?;
    registry.register(Schema::new(
        USER_UPDATE.name(),
        vec![
            email().optional(),
            FieldDef::string("password").min_length(PASSWORD_MIN).optional(),
            FieldDef::one_of("role", ROLES).optional(),
        ],
    )?)?;

    registry.register(Schema::new(
        PATH_ID.name(),
        vec![FieldDef::string("id").pattern(r"^\d+$", Some("ID must be a valid number"))],
    )?)?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validator::validate;
    use serde_json::json;

    #[test]
    fn test_catalog_builds() {
        let registry = registry().unwrap();
        registry
            .ensure_registered(&[
                PRODUCT_CREATE,
                PRODUCT_UPDATE,
                PRODUCT_QUERY,
                USER_SIGNUP,
                USER_LOGIN,
                USER_UPDATE,
                PATH_ID,
            ])
            .unwrap();
    }

    #[test]
    fn test_product_scenario() {
        let registry = registry().unwrap();
        let schema = registry.require(PRODUCT_CREATE).unwrap();

        let errors = validate(schema, &json!({"name": "ab", "price": -5})).unwrap_err();
        let fields: Vec<_> = errors.iter().filter_map(|e| e.field.as_deref()).collect();
        // category is missing as well
        assert_eq!(fields, vec!["name", "price", "category"]);
    }

    #[test]
    fn test_update_accepts_empty_body() {
        let registry = registry().unwrap();
        let schema = registry.require(PRODUCT_UPDATE).unwrap();
        assert!(validate(schema, &json!({})).is_ok());
        assert!(validate(schema, &json!({"price": 0})).is_err());
    }

    #[test]
    fn test_signup_normalizes_email() {
        let registry = registry().unwrap();
        let schema = registry.require(USER_SIGNUP).unwrap();

        let validated = validate(
            schema,
            &json!({"email": " Ada@Example.com", "password": "password123", "role": "user"}),
        )
        .unwrap();
        assert_eq!(validated.as_value()["email"], "ada@example.com");

        let errors = validate(schema, &json!({"email": "nope", "password": "short", "role": "root"})).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_product_query() {
        let registry = registry().unwrap();
        let schema = registry.require(PRODUCT_QUERY).unwrap();

        assert!(validate(schema, &json!({"page": "2", "limit": "5", "sortBy": "price"})).is_ok());

        let errors = validate(schema, &json!({"page": "0", "sortOrder": "sideways"})).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "The field page must be a positive integer.");
    }

    #[test]
    fn test_path_id() {
        let registry = registry().unwrap();
        let schema = registry.require(PATH_ID).unwrap();
        assert!(validate(schema, &json!({"id": "42"})).is_ok());
        assert!(validate(schema, &json!({"id": "-1"})).is_err());
    }
}
