use std::fmt;

use chrono::DateTime;
use chrono::Utc;

use crate::user::errors::PageRequestError;
use crate::user::errors::UserIdError;
use crate::user::errors::UsernameError;

/// User aggregate entity.
///
/// `password_hash` always holds an Argon2 PHC string, never plaintext.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// User row not yet persisted. Storage assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: Username,
    pub password_hash: String,
    pub avatar: Option<String>,
}

/// User unique identifier type, assigned by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl UserId {
    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not an integer
    /// * `NotPositive` - Integer is zero or negative
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|e| UserIdError::InvalidFormat(format!("{}: {}", s, e)))?;

        Self::try_from(id)
    }
}

impl TryFrom<i64> for UserId {
    type Error = UserIdError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        if id > 0 {
            Ok(UserId(id))
        } else {
            Err(UserIdError::NotPositive(id))
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-32 characters and contains only alphanumeric, underscore, and hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 32;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters (except _ and -)
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command to create a new user with domain types
#[derive(Debug)]
pub struct CreateUserCommand {
    pub username: Username,
    pub password: String,
    pub avatar: Option<String>,
}

impl CreateUserCommand {
    /// Construct a new create user command.
    ///
    /// # Arguments
    /// * `username` - Validated username
    /// * `password` - Plain text password (will be hashed by service)
    /// * `avatar` - Optional avatar reference
    pub fn new(username: Username, password: String, avatar: Option<String>) -> Self {
        Self {
            username,
            password,
            avatar,
        }
    }
}

/// Command to update an existing user with optional validated fields.
///
/// Only provided fields will be updated. A provided password is re-hashed.
#[derive(Debug, Default)]
pub struct UpdateUserCommand {
    pub username: Option<Username>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

/// One page of a user listing request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    num: u32,
}

impl PageRequest {
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    /// # Errors
    /// * `InvalidPage` - Page is below 1
    /// * `InvalidPageSize` - Page size is below 1
    pub fn new(page: i64, num: i64) -> Result<Self, PageRequestError> {
        let page = u32::try_from(page)
            .ok()
            .filter(|p| *p >= 1)
            .ok_or(PageRequestError::InvalidPage(page))?;
        let num = u32::try_from(num)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or(PageRequestError::InvalidPageSize(num))?;

        Ok(Self { page, num })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn num(&self) -> u32 {
        self.num
    }

    /// Number of rows preceding this page.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.num)
    }
}

/// A page of users plus the cursor for the next page.
///
/// `next_page` is 0 when no further page exists.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPage {
    pub users: Vec<User>,
    pub next_page: u32,
}

impl UserPage {
    /// Build a page from the rows returned for `request`.
    ///
    /// A full page means another page may follow.
    pub fn from_rows(users: Vec<User>, request: &PageRequest) -> Self {
        let next_page = if users.len() == request.num() as usize {
            request.page() + 1
        } else {
            0
        };

        Self { users, next_page }
    }
}
