#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Certificates: delegated signing, friendship pairs, chain-walk validation.

pub mod auth;
pub mod base;
pub mod chain;
pub mod data;
pub mod factory;
pub mod friend;
pub mod license;
mod locks;
pub mod schema;
pub mod target;
pub mod verify;

pub use base::{Cert, CertError, SignatureEntry};
pub use factory::{
    create_auth_cert, create_chain_cert, create_data_cert, create_friend_cert,
    create_license_cert, load_cert, CertParams, LicenseCertParams,
};
pub use schema::CertKind;
pub use target::TargetValues;
pub use verify::{InlineVerifier, OffloadVerifier, SignatureVerifier};
