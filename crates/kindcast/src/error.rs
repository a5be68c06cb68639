//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types for registration and dispatch. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Registration errors carry the tag, the class name of the handle the
//!   registration went through, and the conflicting variant's type name.
//! - Dispatch errors name the class validation was requested on, so a
//!   failure through an intermediate handle reads differently from one
//!   through the root.
//! - Field-level decode/encode failures belong to serde_json and pass
//!   through unwrapped.

use thiserror::Error;

/// Error while registering a variant into a hierarchy's table.
#[derive(Error, Debug)]
pub enum RegisterError {
    /// The kind tag was empty.
    #[error("kind tag must be a non-empty string (class {class})")]
    EmptyTag {
        /// Class name of the handle the registration went through.
        class: String,
    },

    /// The kind tag is already bound to another variant.
    #[error("kind {tag:?} is already registered for class {class} (bound to {existing})")]
    DuplicateTag {
        /// The colliding tag.
        tag: String,
        /// Class name of the handle the registration went through.
        class: String,
        /// Type name of the variant already bound to the tag.
        existing: &'static str,
    },

    /// The variant type is already registered under another tag.
    ///
    /// One concrete type may carry only one kind; a second binding would
    /// make serialization ambiguous.
    #[error("type {type_name} is already registered for class {class} under kind {tag:?}")]
    DuplicateType {
        /// Type name of the variant being registered.
        type_name: &'static str,
        /// Class name of the handle the registration went through.
        class: String,
        /// The tag the type is already bound to.
        tag: String,
    },
}

/// Error while validating a mapping into a variant instance.
#[derive(Error, Debug)]
pub enum ValidateError {
    /// The input was not a JSON object.
    #[error("expected a mapping for class {class}, got {found}")]
    ExpectedObject {
        /// Class name validation was requested on.
        class: String,
        /// JSON type of the offending value.
        found: &'static str,
    },

    /// The mapping has no `kind` entry.
    #[error("kind is not provided for class {class}")]
    MissingDiscriminator {
        /// Class name validation was requested on.
        class: String,
    },

    /// The mapping's `kind` entry is not a string.
    #[error("kind must be a string for class {class}, got {found}")]
    NonStringDiscriminator {
        /// Class name validation was requested on.
        class: String,
        /// JSON type of the offending value.
        found: &'static str,
    },

    /// The mapping's `kind` value is not in the registry.
    #[error("kind {kind:?} is not registered for class {class}")]
    UnknownDiscriminator {
        /// The unrecognized tag value.
        kind: String,
        /// Class name validation was requested on.
        class: String,
    },

    /// Field-level decoding (or JSON parsing) failed — serde_json's
    /// responsibility, passed through unchanged.
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

/// Error while serializing a variant instance into a mapping.
#[derive(Error, Debug)]
pub enum SerializeError {
    /// The instance's concrete type has no entry in the registry.
    #[error("type {type_name} is not registered for class {class}")]
    UnregisteredType {
        /// Type name of the unregistered instance.
        type_name: &'static str,
        /// Class name serialization was requested on.
        class: String,
    },

    /// The variant's fields did not encode to a JSON object, so there is
    /// nowhere to inject the `kind` discriminator.
    #[error("variant {type_name} of class {class} did not serialize to a mapping")]
    NotAnObject {
        /// Type name of the offending variant.
        type_name: &'static str,
        /// Class name serialization was requested on.
        class: String,
    },

    /// Field-level encoding failed — serde_json's responsibility, passed
    /// through unchanged.
    #[error(transparent)]
    Encode(#[from] serde_json::Error),
}
