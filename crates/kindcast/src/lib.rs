//! # kindcast — Discriminated-Union Registry for serde Data Models
//!
//! A hierarchy of data-model types is identified by a string discriminator
//! (`kind`). One designated root owns a registry mapping each kind tag to a
//! concrete type; serialization emits the tag and validation dispatches on
//! it, reconstructing the registered concrete type regardless of which level
//! of the hierarchy initiated the call.
//!
//! Field-level encoding, decoding, and structural equality are delegated
//! entirely to serde/serde_json. This crate owns only the registry itself:
//! tag registration, inheritance-aware lookup, and validation-time variant
//! resolution.
//!
//! ## Key Design Principles
//!
//! 1. **Explicit registration, no global state.** A hierarchy is created by
//!    [`Registry::new()`] and variants are registered by explicit
//!    [`Registry::register()`] calls at program initialization. There is no
//!    process-wide singleton; independent hierarchies never interfere.
//!
//! 2. **One shared table per hierarchy.** Intermediate handles produced by
//!    [`Registry::subclass()`] hold a non-owning reference to the root's
//!    table. Registering through any handle is visible from every other
//!    handle of the same hierarchy.
//!
//! 3. **The discriminator is registry metadata, not instance state.** The
//!    table keeps a `TypeId -> tag` reverse map; [`Registry::serialize()`]
//!    injects `"kind"` into the output mapping and [`Registry::kind_of()`]
//!    reports a registered instance's tag. An instance's kind therefore
//!    always equals its registration tag.
//!
//! 4. **Erased variants with exact runtime types.** Dispatch returns
//!    [`Box<dyn Variant>`](Variant) whose runtime type is exactly the
//!    registered concrete type, recoverable through downcast helpers and
//!    comparable through structural equality.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive or implement `Debug`.

pub mod error;
pub mod registry;
pub mod variant;

// Re-export primary types for ergonomic imports.
pub use error::{RegisterError, SerializeError, ValidateError};
pub use registry::{Registry, KIND_FIELD};
pub use variant::Variant;
