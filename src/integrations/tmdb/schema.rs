// src/integrations/tmdb/schema.rs
//
// Structural response schemas
//
// A response body is checked field by field before it is turned into a
// domain type. Every violation is reported by its path
// (e.g. `results[3].title`) so a bad payload is rejected as a whole.
// Unknown fields are allowed and ignored.

use serde_json::Value;

#[derive(Debug, Clone)]
pub enum Schema {
    Integer,
    Number,
    String,
    Bool,
    Nullable(Box<Schema>),
    Array(Box<Schema>),
    Object(Vec<(&'static str, Schema)>),
}

impl Schema {
    /// Check `value`, returning every violating field path
    pub fn validate(&self, value: &Value) -> Result<(), Vec<String>> {
        let mut violations = Vec::new();
        self.check(value, "", &mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn check(&self, value: &Value, path: &str, violations: &mut Vec<String>) {
        let matches = match self {
            Schema::Integer => value.is_i64() || value.is_u64(),
            Schema::Number => value.is_number(),
            Schema::String => value.is_string(),
            Schema::Bool => value.is_boolean(),
            Schema::Nullable(inner) => {
                if !value.is_null() {
                    inner.check(value, path, violations);
                }
                true
            }
            Schema::Array(item) => match value.as_array() {
                Some(items) => {
                    for (idx, element) in items.iter().enumerate() {
                        item.check(element, &format!("{}[{}]", path, idx), violations);
                    }
                    true
                }
                None => false,
            },
            Schema::Object(fields) => match value.as_object() {
                Some(map) => {
                    for (name, field) in fields {
                        let field_path = if path.is_empty() {
                            (*name).to_string()
                        } else {
                            format!("{}.{}", path, name)
                        };
                        // A missing key only passes for nullable fields
                        let field_value = map.get(*name).unwrap_or(&Value::Null);
                        field.check(field_value, &field_path, violations);
                    }
                    true
                }
                None => false,
            },
        };

        if !matches {
            violations.push(if path.is_empty() {
                "<root>".to_string()
            } else {
                path.to_string()
            });
        }
    }
}

fn nullable(schema: Schema) -> Schema {
    Schema::Nullable(Box::new(schema))
}

fn array_of(schema: Schema) -> Schema {
    Schema::Array(Box::new(schema))
}

// ============================================================================
// CATALOG SCHEMAS
// ============================================================================

fn movie_fields() -> Vec<(&'static str, Schema)> {
    vec![
        ("id", Schema::Integer),
        ("title", Schema::String),
        ("overview", Schema::String),
        ("poster_path", nullable(Schema::String)),
        ("backdrop_path", nullable(Schema::String)),
        ("release_date", Schema::String),
        ("vote_average", Schema::Number),
        ("vote_count", Schema::Integer),
        ("popularity", Schema::Number),
        ("original_language", Schema::String),
        ("adult", Schema::Bool),
        ("video", Schema::Bool),
    ]
}

pub fn movie() -> Schema {
    let mut fields = movie_fields();
    fields.push(("genre_ids", array_of(Schema::Integer)));
    Schema::Object(fields)
}

pub fn movie_page() -> Schema {
    Schema::Object(vec![
        ("page", Schema::Integer),
        ("results", array_of(movie())),
        ("total_pages", Schema::Integer),
        ("total_results", Schema::Integer),
    ])
}

/// Detail records carry `genres` and do not require `genre_ids`
pub fn movie_detail() -> Schema {
    let mut fields = movie_fields();
    fields.extend([
        (
            "belongs_to_collection",
            nullable(Schema::Object(vec![
                ("id", Schema::Integer),
                ("name", Schema::String),
                ("poster_path", nullable(Schema::String)),
                ("backdrop_path", nullable(Schema::String)),
            ])),
        ),
        ("budget", Schema::Integer),
        (
            "genres",
            array_of(Schema::Object(vec![
                ("id", Schema::Integer),
                ("name", Schema::String),
            ])),
        ),
        ("homepage", nullable(Schema::String)),
        ("imdb_id", nullable(Schema::String)),
        (
            "production_companies",
            array_of(Schema::Object(vec![
                ("id", Schema::Integer),
                ("logo_path", nullable(Schema::String)),
                ("name", Schema::String),
                ("origin_country", Schema::String),
            ])),
        ),
        (
            "production_countries",
            array_of(Schema::Object(vec![
                ("iso_3166_1", Schema::String),
                ("name", Schema::String),
            ])),
        ),
        ("revenue", Schema::Integer),
        ("runtime", nullable(Schema::Integer)),
        (
            "spoken_languages",
            array_of(Schema::Object(vec![
                ("english_name", Schema::String),
                ("iso_639_1", Schema::String),
                ("name", Schema::String),
            ])),
        ),
        ("status", Schema::String),
        ("tagline", nullable(Schema::String)),
    ]);
    Schema::Object(fields)
}

pub fn movie_credits() -> Schema {
    Schema::Object(vec![
        ("id", Schema::Integer),
        (
            "cast",
            array_of(Schema::Object(vec![
                ("id", Schema::Integer),
                ("name", Schema::String),
                ("character", Schema::String),
                ("profile_path", nullable(Schema::String)),
                ("order", Schema::Integer),
            ])),
        ),
        (
            "crew",
            array_of(Schema::Object(vec![
                ("id", Schema::Integer),
                ("name", Schema::String),
                ("job", Schema::String),
                ("department", Schema::String),
                ("profile_path", nullable(Schema::String)),
            ])),
        ),
    ])
}

pub fn movie_videos() -> Schema {
    Schema::Object(vec![
        ("id", Schema::Integer),
        (
            "results",
            array_of(Schema::Object(vec![
                ("id", Schema::String),
                ("key", Schema::String),
                ("name", Schema::String),
                ("site", Schema::String),
                ("size", Schema::Integer),
                ("type", Schema::String),
                ("official", Schema::Bool),
                ("published_at", Schema::String),
            ])),
        ),
    ])
}

pub fn movie_reviews() -> Schema {
    Schema::Object(vec![
        ("id", Schema::Integer),
        ("page", Schema::Integer),
        (
            "results",
            array_of(Schema::Object(vec![
                ("id", Schema::String),
                ("author", Schema::String),
                ("content", Schema::String),
                ("created_at", Schema::String),
                ("updated_at", Schema::String),
                ("url", Schema::String),
                (
                    "author_details",
                    Schema::Object(vec![
                        ("name", Schema::String),
                        ("username", Schema::String),
                        ("avatar_path", nullable(Schema::String)),
                        ("rating", nullable(Schema::Number)),
                    ]),
                ),
            ])),
        ),
        ("total_pages", Schema::Integer),
        ("total_results", Schema::Integer),
    ])
}
