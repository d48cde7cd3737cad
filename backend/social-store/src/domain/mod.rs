pub mod models;

pub use models::{
    validate_input, NewPerson, NewPost, NewProfile, Person, PersonDeletion, PersonLikePost,
    PersonUpdate, Post, PostUpdate, Profile, ProfileUpdate, POST_TITLE_MAX_LEN,
    PERSON_NAME_MAX_LEN, PROFILE_PHONE_MAX_LEN,
};
