//! # Registry — Tag Table and Dispatch-on-Validate
//!
//! A [`Registry`] value is a handle onto one hierarchy's shared tag table.
//! The handle created by [`Registry::new()`] is the hierarchy's root;
//! handles created by [`Registry::subclass()`] are intermediate views that
//! reference the same table, so a variant registered through any handle is
//! dispatchable from every other handle of the hierarchy.
//!
//! ## Invariants
//!
//! - A tag maps to exactly one concrete type, and a concrete type carries
//!   exactly one tag. Both collision directions are rejected at
//!   registration.
//! - Entries are only ever added; the table grows monotonically and lives
//!   as long as any handle.
//! - Validation through any handle of the hierarchy yields an instance
//!   whose runtime type is exactly the type registered under the mapping's
//!   `kind`, regardless of which handle initiated the call.
//!
//! Registration normally completes at program initialization, before any
//! validate call. The table is nonetheless guarded by an `RwLock` so late
//! registration from another thread cannot corrupt it.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{RegisterError, SerializeError, ValidateError};
use crate::variant::Variant;

/// Name of the discriminator field in serialized mappings.
pub const KIND_FIELD: &str = "kind";

/// Monomorphized decoder for one registered variant type.
type DecodeFn = fn(Value) -> Result<Box<dyn Variant>, serde_json::Error>;

fn decode_variant<V>(mapping: Value) -> Result<Box<dyn Variant>, serde_json::Error>
where
    V: Variant + DeserializeOwned,
{
    Ok(Box::new(serde_json::from_value::<V>(mapping)?))
}

struct VariantEntry {
    decode: DecodeFn,
    type_name: &'static str,
}

/// The shared tag table: forward map for dispatch, reverse map for
/// serialization. Both maps are updated together under one lock.
#[derive(Default)]
struct KindTable {
    by_tag: HashMap<String, VariantEntry>,
    by_type: HashMap<TypeId, String>,
}

struct Shared {
    /// Class name of the root handle, for introspection.
    base: String,
    table: RwLock<KindTable>,
}

/// A handle onto a discriminated hierarchy's tag table.
///
/// Cloning a handle (or calling [`subclass()`](Registry::subclass)) shares
/// the underlying table; only [`new()`](Registry::new) creates a fresh one.
/// The handle's class name appears in error messages so failures report
/// the class validation was actually requested on.
///
/// # Example
///
/// ```
/// use kindcast::Registry;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Dog {
///     name: String,
///     breed: String,
/// }
///
/// let animals = Registry::new("Animal");
/// animals.register::<Dog>("dog")?;
///
/// let validated = animals.validate_json(
///     r#"{"kind": "dog", "name": "Buddy", "breed": "Labrador"}"#,
/// )?;
/// assert_eq!(
///     validated.downcast_ref::<Dog>(),
///     Some(&Dog { name: "Buddy".into(), breed: "Labrador".into() }),
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct Registry {
    shared: Arc<Shared>,
    class: String,
}

impl Registry {
    /// Create the root handle of a new hierarchy with an empty tag table.
    ///
    /// `class` is the hierarchy's root class name, used in error messages
    /// for failures initiated through this handle.
    pub fn new(class: impl Into<String>) -> Self {
        let class = class.into();
        Self {
            shared: Arc::new(Shared {
                base: class.clone(),
                table: RwLock::new(KindTable::default()),
            }),
            class,
        }
    }

    /// Create an intermediate handle sharing this hierarchy's table.
    ///
    /// The new handle registers into and dispatches from the same table as
    /// the root; only the class name reported in error messages differs.
    pub fn subclass(&self, class: impl Into<String>) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            class: class.into(),
        }
    }

    /// The class name of this handle (root or intermediate).
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// The class name of the hierarchy's root handle.
    pub fn base_name(&self) -> &str {
        &self.shared.base
    }

    /// Bind `tag` to the concrete type `V` in the hierarchy's table.
    ///
    /// Generic variants register per monomorphization; dispatch is keyed
    /// only by the tag.
    ///
    /// # Errors
    ///
    /// - [`RegisterError::EmptyTag`] if `tag` is empty.
    /// - [`RegisterError::DuplicateTag`] if `tag` is already bound.
    /// - [`RegisterError::DuplicateType`] if `V` is already bound to
    ///   another tag.
    pub fn register<V>(&self, tag: impl Into<String>) -> Result<(), RegisterError>
    where
        V: Variant + DeserializeOwned,
    {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(RegisterError::EmptyTag {
                class: self.class.clone(),
            });
        }

        let mut table = self.write_table();
        if let Some(existing) = table.by_tag.get(&tag) {
            return Err(RegisterError::DuplicateTag {
                tag,
                class: self.class.clone(),
                existing: existing.type_name,
            });
        }
        let type_id = TypeId::of::<V>();
        if let Some(bound) = table.by_type.get(&type_id) {
            return Err(RegisterError::DuplicateType {
                type_name: std::any::type_name::<V>(),
                class: self.class.clone(),
                tag: bound.clone(),
            });
        }

        table.by_tag.insert(
            tag.clone(),
            VariantEntry {
                decode: decode_variant::<V>,
                type_name: std::any::type_name::<V>(),
            },
        );
        table.by_type.insert(type_id, tag);
        Ok(())
    }

    /// Dispatch a mapping to the concrete type registered under its `kind`
    /// and delegate field-level decoding to serde.
    ///
    /// The returned instance's runtime type is exactly the registered
    /// type, never the class of this handle. The `kind` entry is consumed
    /// by dispatch and not passed on to field decoding.
    ///
    /// # Errors
    ///
    /// - [`ValidateError::ExpectedObject`] if `mapping` is not a JSON
    ///   object.
    /// - [`ValidateError::MissingDiscriminator`] if `kind` is absent.
    /// - [`ValidateError::NonStringDiscriminator`] if `kind` is present
    ///   but not a string.
    /// - [`ValidateError::UnknownDiscriminator`] if the tag has no entry
    ///   in the hierarchy's table.
    /// - [`ValidateError::Decode`] for field-level failures, passed
    ///   through from serde_json unchanged.
    pub fn validate(&self, mapping: Value) -> Result<Box<dyn Variant>, ValidateError> {
        let mut object = match mapping {
            Value::Object(object) => object,
            other => {
                return Err(ValidateError::ExpectedObject {
                    class: self.class.clone(),
                    found: json_type_name(&other),
                })
            }
        };

        let kind = match object.remove(KIND_FIELD) {
            None => {
                return Err(ValidateError::MissingDiscriminator {
                    class: self.class.clone(),
                })
            }
            Some(Value::String(kind)) => kind,
            Some(other) => {
                return Err(ValidateError::NonStringDiscriminator {
                    class: self.class.clone(),
                    found: json_type_name(&other),
                })
            }
        };

        let decode = {
            let table = self.read_table();
            match table.by_tag.get(&kind) {
                Some(entry) => entry.decode,
                None => {
                    return Err(ValidateError::UnknownDiscriminator {
                        kind,
                        class: self.class.clone(),
                    })
                }
            }
        };
        Ok(decode(Value::Object(object))?)
    }

    /// Parse `text` as JSON, then [`validate()`](Registry::validate) the
    /// resulting mapping. Parse errors pass through as
    /// [`ValidateError::Decode`].
    pub fn validate_json(&self, text: &str) -> Result<Box<dyn Variant>, ValidateError> {
        let mapping: Value = serde_json::from_str(text)?;
        self.validate(mapping)
    }

    /// Encode a registered variant to a mapping, injecting its `kind` tag.
    ///
    /// Field encoding delegates to serde; this method adds only the
    /// discriminator, looked up by the instance's runtime type.
    ///
    /// # Errors
    ///
    /// - [`SerializeError::UnregisteredType`] if the instance's type has
    ///   no entry in the hierarchy's table.
    /// - [`SerializeError::NotAnObject`] if the fields encode to
    ///   something other than a JSON object.
    /// - [`SerializeError::Encode`] for field-level failures, passed
    ///   through from serde_json unchanged.
    pub fn serialize(&self, variant: &dyn Variant) -> Result<Value, SerializeError> {
        let tag = {
            let table = self.read_table();
            match table.by_type.get(&variant.as_any().type_id()) {
                Some(tag) => tag.clone(),
                None => {
                    return Err(SerializeError::UnregisteredType {
                        type_name: variant.type_name(),
                        class: self.class.clone(),
                    })
                }
            }
        };

        let mut value = variant.to_value()?;
        match value.as_object_mut() {
            Some(object) => {
                object.insert(KIND_FIELD.to_owned(), Value::String(tag));
            }
            None => {
                return Err(SerializeError::NotAnObject {
                    type_name: variant.type_name(),
                    class: self.class.clone(),
                })
            }
        }
        Ok(value)
    }

    /// [`serialize()`](Registry::serialize) to a JSON string.
    pub fn serialize_json(&self, variant: &dyn Variant) -> Result<String, SerializeError> {
        let mapping = self.serialize(variant)?;
        Ok(serde_json::to_string(&mapping)?)
    }

    /// The tag a registered instance would serialize under, if its runtime
    /// type is registered in this hierarchy.
    pub fn kind_of(&self, variant: &dyn Variant) -> Option<String> {
        self.read_table()
            .by_type
            .get(&variant.as_any().type_id())
            .cloned()
    }

    /// The tag the concrete type `V` is registered under, if any.
    pub fn tag_of<V: Variant>(&self) -> Option<String> {
        self.read_table().by_type.get(&TypeId::of::<V>()).cloned()
    }

    /// Whether `tag` is registered in this hierarchy.
    pub fn contains(&self, tag: &str) -> bool {
        self.read_table().by_tag.contains_key(tag)
    }

    /// All registered tags, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.read_table().by_tag.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    /// Number of registered tags.
    pub fn len(&self) -> usize {
        self.read_table().by_tag.len()
    }

    /// Whether the hierarchy has no registered tags.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Table writes are single-map inserts; a poisoned guard still holds a
    // consistent table, so recover it instead of surfacing lock errors.
    fn read_table(&self) -> RwLockReadGuard<'_, KindTable> {
        self.shared
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, KindTable> {
        self.shared
            .table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("class", &self.class)
            .field("base", &self.shared.base)
            .field("kinds", &self.kinds())
            .finish()
    }
}

/// JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
