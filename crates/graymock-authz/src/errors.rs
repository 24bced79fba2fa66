use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("role {0} is referenced but does not exist")]
    MissingRole(String),
}

pub type AuthzResult<T> = Result<T, AuthzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_role() {
        let rendered = AuthzError::MissingRole("Admin".to_string()).to_string();
        assert!(rendered.contains("Admin"));
    }
}
