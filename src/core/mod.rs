//! Core module containing the record abstraction, codec, collaborator traits
//! and error types

pub mod codec;
pub mod controller;
pub mod error;
pub mod naming;
pub mod record;
pub mod request;
pub mod source;

pub use codec::RecordCodec;
pub use controller::{Controller, Hooks};
pub use error::{ApiError, ApiResult, DecodeError, ErrorObject, HttpError, RegistrationError};
pub use naming::{EnglishNaming, NamingStrategy, Pluralizer};
pub use record::{Payload, Record};
pub use request::Request;
pub use source::DataSource;
