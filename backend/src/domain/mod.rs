//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed entities used by the HTTP and
//! persistence adapters, the validation rules that guard them and the
//! services implementing the driving ports. Nothing in here knows about
//! actix or Diesel.
//!
//! Public surface:
//! - Error / ErrorCode: transport agnostic failure with a stable code.
//! - FieldErrors: field → messages map carried by validation failures.
//! - User, Account and their value types for the identity domain.
//! - PortfolioProfile and the four [`PortfolioRecord`] collections.
//! - AccountService, PortfolioProfileService, PortfolioCollectionService.

pub mod account;
pub mod account_service;
pub mod auth;
pub mod error;
pub mod password_policy;
pub mod portfolio;
pub mod portfolio_collection_service;
pub mod portfolio_profile_service;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::account::{Account, AccountPatch, AccountPatchInput, ContactDetails};
pub use self::account_service::{AccountSecurity, AccountService, DEFAULT_RESET_TOKEN_TTL_SECS};
pub use self::auth::{
    ConfirmedPassword, LoginCredentials, LoginValidationError, PASSWORD_MISMATCH, PasswordChange,
    PasswordHash, PlainPassword, RefreshClaims, RefreshTokenId, RefreshTokenRecord, Registration,
    RegistrationInput, ResetToken, ResetTokenDigest, TokenPair,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::password_policy::{
    PASSWORD_MIN_LENGTH, PasswordContext, PasswordPolicyViolation, check_password,
};
pub use self::portfolio::{
    Education, EducationDraft, EducationInput, Experience, ExperienceDraft, ExperienceInput,
    Period, PortfolioOverview, PortfolioProfile, PortfolioRecord, ProfileDetails, ProfileId,
    ProfilePatch, ProfilePatchInput, Project, ProjectDraft, ProjectInput, RecordId, RecordKind,
    Skill, SkillDraft, SkillInput, Technology,
};
pub use self::portfolio_collection_service::PortfolioCollectionService;
pub use self::portfolio_profile_service::PortfolioProfileService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{EmailAddress, FullName, User, UserId, UserValidationError, Username};
pub use self::validation::FieldErrors;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use portfolio_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
