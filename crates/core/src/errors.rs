use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("account already exists for `{0}`")]
    DuplicateEmail(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("unauthorized: {message}")]
    Unauthorized { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("conflict: {message}")]
    Conflict { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::Unauthorized { .. } => "Invalid email or password.",
            Self::NotFound { .. } => "The requested record was not found.",
            Self::Conflict { .. } => "A record with those details already exists.",
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Unauthorized { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Conflict { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let unassigned = || "unassigned".to_owned();
        match value {
            ApplicationError::Domain(DomainError::NotFound { entity, id }) => Self::NotFound {
                message: format!("{entity} not found: {id}"),
                correlation_id: unassigned(),
            },
            ApplicationError::Domain(DomainError::DuplicateEmail(email)) => Self::Conflict {
                message: format!("account already exists for `{email}`"),
                correlation_id: unassigned(),
            },
            ApplicationError::Domain(DomainError::InvalidCredentials) => Self::Unauthorized {
                message: "invalid email or password".to_owned(),
                correlation_id: unassigned(),
            },
            ApplicationError::Domain(DomainError::InvariantViolation(_)) => Self::BadRequest {
                message: "domain validation failed".to_owned(),
                correlation_id: unassigned(),
            },
            ApplicationError::Persistence(message) => {
                Self::ServiceUnavailable { message, correlation_id: unassigned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: unassigned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ApplicationError, DomainError, InterfaceError};

    #[test]
    fn not_found_maps_to_not_found_interface_error() {
        let interface = ApplicationError::from(DomainError::not_found("user", "u-404"))
            .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::NotFound {
                ref correlation_id,
                ..
            } if correlation_id == "req-1"
        ));
    }

    #[test]
    fn invalid_credentials_map_to_unauthorized_with_shared_user_message() {
        let interface =
            ApplicationError::from(DomainError::InvalidCredentials).into_interface("req-2");

        // Unknown email and wrong password must be indistinguishable.
        assert!(matches!(interface, InterfaceError::Unauthorized { .. }));
        assert_eq!(interface.user_message(), "Invalid email or password.");
    }

    #[test]
    fn duplicate_email_maps_to_conflict() {
        let interface =
            ApplicationError::from(DomainError::DuplicateEmail("a@example.com".to_owned()))
                .into_interface("req-3");

        assert!(matches!(interface, InterfaceError::Conflict { .. }));
    }

    #[test]
    fn persistence_error_maps_to_service_unavailable() {
        let interface =
            ApplicationError::Persistence("catalog read failed".to_owned()).into_interface("req-4");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(
            interface.user_message(),
            "The service is temporarily unavailable. Please retry shortly."
        );
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface =
            ApplicationError::Configuration("missing token secret".to_owned())
                .into_interface("req-5");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
    }
}
