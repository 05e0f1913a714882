use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: Option<i32>,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing, default)]
    pub password_salt: Vec<u8>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

impl User {
    pub fn new(
        user_name: &str,
        first_name: &str,
        last_name: &str,
        password_salt: Vec<u8>,
        password_hash: String,
    ) -> Self {
        Self {
            id: None,
            user_name: user_name.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            password_salt,
            password_hash,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserValidationStatus {
    Valid,
    UserNameNullOrEmpty,
    UserNameLengthTooShort,
    NameNullOrEmpty,
    NameLengthTooShort,
    NameInvalidCharacters,
    PasswordDoesNotMeetRequirements,
    UserNameAlreadyTaken,
}
