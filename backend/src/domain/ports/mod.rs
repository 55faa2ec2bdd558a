//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod case_file_repository;
mod password_hasher;
mod token_codec;
mod user_repository;

#[cfg(test)]
pub use case_file_repository::MockCaseFileRepository;
pub use case_file_repository::{
    CaseFilePersistenceError, CaseFileRepository, FixtureCaseFileRepository,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{FixturePasswordHasher, PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{FixtureTokenCodec, TokenCodec, TokenCodecError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};
