#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! The binary data model: field-tagged codec, filtering, signature slots.

pub mod codec;
pub mod field;
pub mod filter;
pub mod signable;

pub use codec::{Model, ModelError, MODEL_TYPE_LEN};
pub use field::{FieldSpec, FieldType, Value};
pub use filter::{CmpOp, Filter};
pub use signable::{SignatureSlot, SIGNATURES_FIELD};
