use super::model::UserValidationStatus;
use crate::constants::{NAME_MIN_LENGTH, USERNAME_MIN_LENGTH};

/// Checks a registration in a fixed order and reports the first failure.
pub fn validate_user(
    user_name: &str,
    first_name: &str,
    last_name: &str,
    password: &str,
) -> UserValidationStatus {
    let checks: [&dyn Fn() -> UserValidationStatus; 4] = [
        &|| validate_user_name(user_name),
        &|| validate_name(first_name),
        &|| validate_name(last_name),
        &|| validate_password(password),
    ];
    checks
        .iter()
        .map(|check| check())
        .find(|status| *status != UserValidationStatus::Valid)
        .unwrap_or(UserValidationStatus::Valid)
}

pub fn validate_user_name(user_name: &str) -> UserValidationStatus {
    if user_name.is_empty() {
        return UserValidationStatus::UserNameNullOrEmpty;
    }
    if user_name.chars().count() < USERNAME_MIN_LENGTH {
        return UserValidationStatus::UserNameLengthTooShort;
    }
    UserValidationStatus::Valid
}

pub fn validate_name(name: &str) -> UserValidationStatus {
    if name.is_empty() {
        return UserValidationStatus::NameNullOrEmpty;
    }
    if name.chars().count() < NAME_MIN_LENGTH {
        return UserValidationStatus::NameLengthTooShort;
    }
    if !name.chars().all(is_name_letter) {
        return UserValidationStatus::NameInvalidCharacters;
    }
    UserValidationStatus::Valid
}

pub fn validate_password(password: &str) -> UserValidationStatus {
    let meets_requirements = !password.trim().is_empty()
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_ascii_alphanumeric());

    if meets_requirements {
        UserValidationStatus::Valid
    } else {
        UserValidationStatus::PasswordDoesNotMeetRequirements
    }
}

// ASCII letters plus the Swedish vowels.
fn is_name_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, 'å' | 'ä' | 'ö' | 'Å' | 'Ä' | 'Ö')
}

#[cfg(test)]
mod tests {
    use super::*;
    use UserValidationStatus::*;

    #[test]
    fn user_name_rules() {
        assert_eq!(validate_user_name(""), UserNameNullOrEmpty);
        assert_eq!(validate_user_name("aaaaa"), UserNameLengthTooShort);
        assert_eq!(validate_user_name("abbbbb"), Valid);
    }

    #[test]
    fn name_rules() {
        assert_eq!(validate_name(""), NameNullOrEmpty);
        assert_eq!(validate_name("A"), NameLengthTooShort);
        assert_eq!(validate_name("Ab"), Valid);
        assert_eq!(validate_name("Örjan"), Valid);
        assert_eq!(validate_name("Åsa"), Valid);
        assert_eq!(validate_name("Anna-Lena"), NameInvalidCharacters);
        assert_eq!(validate_name("Anna Lena"), NameInvalidCharacters);
        assert_eq!(validate_name("R2D2"), NameInvalidCharacters);
        assert_eq!(validate_name("José"), NameInvalidCharacters);
    }

    #[test]
    fn password_rules() {
        assert_eq!(validate_password("AAAAAb1?"), Valid);
        assert_eq!(validate_password("aaaaaaaa"), PasswordDoesNotMeetRequirements);
        assert_eq!(validate_password("AAAAAAb?"), PasswordDoesNotMeetRequirements);
        assert_eq!(validate_password("aaaaab1?"), PasswordDoesNotMeetRequirements);
        assert_eq!(validate_password("AAAAAb12"), PasswordDoesNotMeetRequirements);
        assert_eq!(validate_password("   "), PasswordDoesNotMeetRequirements);
        assert_eq!(validate_password(""), PasswordDoesNotMeetRequirements);
    }

    #[test]
    fn first_failure_wins() {
        assert_eq!(validate_user("abc", "", "", "x"), UserNameLengthTooShort);
        assert_eq!(validate_user("abbbbb", "J", "", "x"), NameLengthTooShort);
        assert_eq!(validate_user("abbbbb", "Jonas", "", "x"), NameNullOrEmpty);
        assert_eq!(validate_user("abbbbb", "Jonas", "Berg", "x"), PasswordDoesNotMeetRequirements);
        assert_eq!(validate_user("abbbbb", "Jonas", "Berg", "AAAAAb1?"), Valid);
    }
}
