use crate::error::{ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// Maximum characters in `Person.name`
pub const PERSON_NAME_MAX_LEN: usize = 30;
/// Maximum characters in `Profile.phone`
pub const PROFILE_PHONE_MAX_LEN: usize = 10;
/// Maximum characters in `Post.title`
pub const POST_TITLE_MAX_LEN: usize = 20;

/// Person entity - a member of the network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Person {
    pub id: i64,
    pub name: String,
}

/// Profile entity - contact details bound one-to-one to a person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: i64,
    pub person_id: i64,
    pub phone: String,
}

/// Post entity - authored by exactly one person
///
/// `likes` is a free-standing counter. It is not derived from, nor kept in
/// sync with, the set of persons who like the post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub likes: i32,
    pub created_by_id: i64,
}

/// Like association - a person liking a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PersonLikePost {
    pub id: i64,
    pub person_id: i64,
    pub post_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewPerson {
    #[validate(length(max = 30))]
    pub name: String,
}

impl NewPerson {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewProfile {
    pub person_id: i64,
    #[validate(length(max = 10))]
    pub phone: String,
}

impl NewProfile {
    pub fn new(person_id: i64, phone: impl Into<String>) -> Self {
        Self {
            person_id,
            phone: phone.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewPost {
    #[validate(length(max = 20))]
    pub title: String,
    /// Initial counter value, 0 when absent
    #[serde(default)]
    pub likes: Option<i32>,
    pub created_by_id: i64,
}

impl NewPost {
    pub fn new(title: impl Into<String>, created_by_id: i64) -> Self {
        Self {
            title: title.into(),
            likes: None,
            created_by_id,
        }
    }

    pub fn with_likes(mut self, likes: i32) -> Self {
        self.likes = Some(likes);
        self
    }
}

/// Partial update of a person; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PersonUpdate {
    #[validate(length(max = 30))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(max = 10))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PostUpdate {
    #[validate(length(max = 20))]
    pub title: Option<String>,
    pub likes: Option<i32>,
}

/// Outcome of a successful person deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PersonDeletion {
    pub person_id: i64,
    /// Profiles removed by cascade (0 or 1)
    pub profiles_removed: u64,
    /// Like associations removed by cascade
    pub likes_removed: u64,
}

/// Run field validation, rejecting (never truncating) over-long text
pub fn validate_input<T: Validate>(input: &T) -> ServiceResult<()> {
    input.validate().map_err(into_service_error)
}

fn into_service_error(errors: ValidationErrors) -> ServiceError {
    let mut fields: Vec<_> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| (field.to_string(), errs.clone()))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    for (field, errs) in fields {
        for err in errs.iter().filter(|e| e.code == "length") {
            let max = err
                .params
                .get("max")
                .and_then(|v| v.as_u64())
                .map(|v| v as usize);
            let actual = err
                .params
                .get("value")
                .and_then(|v| v.as_str())
                .map(|s| s.chars().count());

            if let (Some(max), Some(actual)) = (max, actual) {
                return ServiceError::FieldTooLong { field, max, actual };
            }
        }
    }

    ServiceError::InvalidInput(errors.to_string())
}
