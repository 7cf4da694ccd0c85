//! Attestation protocol client for the TRUF.NETWORK client.
//!
//! An attestation is a validator-signed statement of a query result:
//! - [`AttestationClient::request_attestation`]: validate locally, then submit
//! - [`AttestationPoller`]: bounded polling until the payload is signed
//! - [`verify_attestation_signature`]: recover the validator address
//! - [`parse_attestation_payload`]: readable view of the canonical payload
//! - [`AttestationClient::list_attestations`]: paginated metadata listing

pub mod client;
pub mod error;
pub mod list;
pub mod parse;
pub mod poller;
pub mod request;
pub mod verify;

pub use client::AttestationClient;
pub use error::{AttestationError, AttestationResult};
pub use list::{AttestationRecord, ListAttestationsQuery};
pub use parse::{parse_attestation_payload, parse_boolean_result};
pub use poller::{AttestationPoller, AttestationStatus, PollConfig};
pub use request::AttestationRequest;
pub use verify::{sign_attestation_payload, verify_attestation_signature, VerifiedAttestation};
