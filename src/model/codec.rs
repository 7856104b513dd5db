// Copyright (c) 2026 Covenant
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! The Model container: a schema-typed field map with a 6-byte identity and
//! a deterministic binary image.
//!
//! Image layout:
//!
//! ```text
//! modelType (6 bytes)
//! repeated field record:
//!   type_tag : u8
//!   index    : u8
//!   length   : u16 big-endian   (STRING and BYTES only)
//!   value    : length or type-fixed bytes
//! ```
//!
//! Exports write records in ascending index order; loads accept any order
//! but reject duplicate indices.

use crate::crypto::hash::{hash_buf, Hash32};
use crate::model::field::{FieldSpec, FieldType, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Length of the model type header.
pub const MODEL_TYPE_LEN: usize = 6;

/// Model codec errors.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Header mismatch, truncated record, unknown index, or length overflow
    /// while reading an image.
    #[error("malformed image: {0}")]
    Malformed(String),
    /// Integer outside the type's representable range, or a byte buffer of
    /// the wrong fixed length.
    #[error("value out of range: {0}")]
    OutOfRange(String),
    /// Unknown field name, or a value of the wrong type for the field.
    #[error("schema violation: {0}")]
    Schema(String),
}

/// Schema-typed field container with a deterministic binary form.
#[derive(Clone, Debug)]
pub struct Model {
    model_type: [u8; MODEL_TYPE_LEN],
    schema: &'static [FieldSpec],
    values: BTreeMap<u8, Value>,
}

impl Model {
    /// Create an empty model. The model type must be exactly 6 bytes and the
    /// schema must declare unique indices and bounded variable fields.
    pub fn new(model_type: &[u8], schema: &'static [FieldSpec]) -> Result<Self, ModelError> {
        if model_type.len() != MODEL_TYPE_LEN {
            return Err(ModelError::Malformed(format!(
                "model type must be exactly {} bytes, got {}",
                MODEL_TYPE_LEN,
                model_type.len()
            )));
        }
        let mut seen = [false; 256];
        for spec in schema {
            if seen[spec.index as usize] {
                return Err(ModelError::Schema(format!(
                    "duplicate field index {} in schema",
                    spec.index
                )));
            }
            seen[spec.index as usize] = true;
            if spec.kind.is_variable() && spec.max_size == 0 {
                return Err(ModelError::Schema(format!(
                    "variable-length field '{}' must declare a maximum size",
                    spec.name
                )));
            }
        }
        let mut mt = [0u8; MODEL_TYPE_LEN];
        mt.copy_from_slice(model_type);
        Ok(Self { model_type: mt, schema, values: BTreeMap::new() })
    }

    /// The 6-byte model type.
    pub fn model_type(&self) -> &[u8; MODEL_TYPE_LEN] {
        &self.model_type
    }

    /// The field schema.
    pub fn schema(&self) -> &'static [FieldSpec] {
        self.schema
    }

    /// Look up a field declaration by name.
    pub fn spec(&self, name: &str) -> Option<&'static FieldSpec> {
        self.schema.iter().find(|s| s.name == name)
    }

    fn spec_by_index(&self, index: u8) -> Option<&'static FieldSpec> {
        self.schema.iter().find(|s| s.index == index)
    }

    fn require_spec(&self, name: &str) -> Result<&'static FieldSpec, ModelError> {
        self.spec(name)
            .ok_or_else(|| ModelError::Schema(format!("unknown field '{}'", name)))
    }

    /// Stored value for a field name, if set.
    pub fn value(&self, name: &str) -> Option<&Value> {
        let spec = self.spec(name)?;
        self.values.get(&spec.index)
    }

    /// Whether the field has a value.
    pub fn has(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    /// Remove a field's value.
    pub fn unset(&mut self, name: &str) -> Result<(), ModelError> {
        let spec = self.require_spec(name)?;
        self.values.remove(&spec.index);
        Ok(())
    }

    /// Set an integer field (types up to 48 bits).
    pub fn set_int(&mut self, name: &str, v: i64) -> Result<(), ModelError> {
        let spec = self.require_spec(name)?;
        let layout = spec.kind.int_layout().ok_or_else(|| {
            ModelError::Schema(format!("field '{}' does not hold a small integer", name))
        })?;
        if !layout.contains(v) {
            return Err(ModelError::OutOfRange(format!(
                "{} does not fit field '{}' ({} bits, {})",
                v,
                name,
                layout.bits,
                if layout.signed { "signed" } else { "unsigned" }
            )));
        }
        self.values.insert(spec.index, Value::Int(v));
        Ok(())
    }

    /// Set a 64-bit unsigned field.
    pub fn set_u64(&mut self, name: &str, v: u64) -> Result<(), ModelError> {
        let spec = self.require_spec(name)?;
        if !spec.kind.is_u64() {
            return Err(ModelError::Schema(format!("field '{}' does not hold a u64", name)));
        }
        self.values.insert(spec.index, Value::U64(v));
        Ok(())
    }

    /// Set a string field.
    pub fn set_str(&mut self, name: &str, v: &str) -> Result<(), ModelError> {
        let spec = self.require_spec(name)?;
        if spec.kind != FieldType::String {
            return Err(ModelError::Schema(format!("field '{}' does not hold a string", name)));
        }
        if v.len() > spec.max_size as usize {
            return Err(ModelError::OutOfRange(format!(
                "string of {} bytes exceeds maximum {} for field '{}'",
                v.len(),
                spec.max_size,
                name
            )));
        }
        self.values.insert(spec.index, Value::Text(v.to_string()));
        Ok(())
    }

    /// Set a bytes or fixed-block field. The buffer is owned by the model
    /// from here on.
    pub fn set_bytes(&mut self, name: &str, v: Vec<u8>) -> Result<(), ModelError> {
        let spec = self.require_spec(name)?;
        match spec.kind {
            FieldType::Bytes => {
                if v.len() > spec.max_size as usize {
                    return Err(ModelError::OutOfRange(format!(
                        "buffer of {} bytes exceeds maximum {} for field '{}'",
                        v.len(),
                        spec.max_size,
                        name
                    )));
                }
            }
            k if k.block_len().is_some() => {
                let want = k.block_len().unwrap_or(0);
                if v.len() != want {
                    return Err(ModelError::OutOfRange(format!(
                        "field '{}' requires exactly {} bytes, got {}",
                        name,
                        want,
                        v.len()
                    )));
                }
            }
            _ => {
                return Err(ModelError::Schema(format!("field '{}' does not hold bytes", name)));
            }
        }
        self.values.insert(spec.index, Value::Bytes(v));
        Ok(())
    }

    /// Read an integer field. `Ok(None)` when unset.
    pub fn get_int(&self, name: &str) -> Result<Option<i64>, ModelError> {
        let spec = self.require_spec(name)?;
        if spec.kind.int_layout().is_none() {
            return Err(ModelError::Schema(format!("field '{}' does not hold a small integer", name)));
        }
        match self.values.get(&spec.index) {
            None => Ok(None),
            Some(Value::Int(v)) => Ok(Some(*v)),
            Some(v) => Err(ModelError::Schema(format!(
                "field '{}' holds {} rather than an integer",
                name,
                v.type_name()
            ))),
        }
    }

    /// Read a 64-bit unsigned field. `Ok(None)` when unset.
    pub fn get_u64(&self, name: &str) -> Result<Option<u64>, ModelError> {
        let spec = self.require_spec(name)?;
        if !spec.kind.is_u64() {
            return Err(ModelError::Schema(format!("field '{}' does not hold a u64", name)));
        }
        match self.values.get(&spec.index) {
            None => Ok(None),
            Some(Value::U64(v)) => Ok(Some(*v)),
            Some(v) => Err(ModelError::Schema(format!(
                "field '{}' holds {} rather than a u64",
                name,
                v.type_name()
            ))),
        }
    }

    /// Read a string field. `Ok(None)` when unset.
    pub fn get_str(&self, name: &str) -> Result<Option<&str>, ModelError> {
        let spec = self.require_spec(name)?;
        if spec.kind != FieldType::String {
            return Err(ModelError::Schema(format!("field '{}' does not hold a string", name)));
        }
        match self.values.get(&spec.index) {
            None => Ok(None),
            Some(Value::Text(s)) => Ok(Some(s)),
            Some(v) => Err(ModelError::Schema(format!(
                "field '{}' holds {} rather than a string",
                name,
                v.type_name()
            ))),
        }
    }

    /// Read a bytes or fixed-block field. `Ok(None)` when unset.
    pub fn get_bytes(&self, name: &str) -> Result<Option<&[u8]>, ModelError> {
        let spec = self.require_spec(name)?;
        if spec.kind != FieldType::Bytes && spec.kind.block_len().is_none() {
            return Err(ModelError::Schema(format!("field '{}' does not hold bytes", name)));
        }
        match self.values.get(&spec.index) {
            None => Ok(None),
            Some(Value::Bytes(b)) => Ok(Some(b)),
            Some(v) => Err(ModelError::Schema(format!(
                "field '{}' holds {} rather than bytes",
                name,
                v.type_name()
            ))),
        }
    }

    fn pack_record(spec: &FieldSpec, value: &Value, out: &mut Vec<u8>) -> Result<(), ModelError> {
        out.push(spec.kind.tag());
        out.push(spec.index);
        match (spec.kind, value) {
            (FieldType::String, Value::Text(s)) => {
                if s.len() > spec.max_size as usize {
                    return Err(ModelError::OutOfRange(format!(
                        "string exceeds maximum {} for field '{}'",
                        spec.max_size, spec.name
                    )));
                }
                out.extend_from_slice(&(s.len() as u16).to_be_bytes());
                out.extend_from_slice(s.as_bytes());
            }
            (FieldType::Bytes, Value::Bytes(b)) => {
                if b.len() > spec.max_size as usize {
                    return Err(ModelError::OutOfRange(format!(
                        "buffer exceeds maximum {} for field '{}'",
                        spec.max_size, spec.name
                    )));
                }
                out.extend_from_slice(&(b.len() as u16).to_be_bytes());
                out.extend_from_slice(b);
            }
            (k, Value::Bytes(b)) if k.block_len().is_some() => {
                if Some(b.len()) != k.block_len() {
                    return Err(ModelError::OutOfRange(format!(
                        "field '{}' requires exactly {} bytes",
                        spec.name,
                        k.block_len().unwrap_or(0)
                    )));
                }
                out.extend_from_slice(b);
            }
            (k, Value::Int(v)) if k.int_layout().is_some() => {
                let Some(layout) = k.int_layout() else {
                    return Err(ModelError::Schema(format!("field '{}' has no integer layout", spec.name)));
                };
                if !layout.contains(*v) {
                    return Err(ModelError::OutOfRange(format!(
                        "{} does not fit field '{}'",
                        v, spec.name
                    )));
                }
                out.extend_from_slice(&layout.encode(*v));
            }
            (FieldType::UInt64BE, Value::U64(v)) => out.extend_from_slice(&v.to_be_bytes()),
            (FieldType::UInt64LE, Value::U64(v)) => out.extend_from_slice(&v.to_le_bytes()),
            (k, v) => {
                return Err(ModelError::Schema(format!(
                    "field '{}' of type {:?} cannot pack a {} value",
                    spec.name,
                    k,
                    v.type_name()
                )));
            }
        }
        Ok(())
    }

    /// Serialize to the binary image. Fields are written in ascending index
    /// order; unset fields are omitted. Transient fields are included only
    /// when `transient` is set; non-hashable transient fields additionally
    /// require `transient_non_hashable`.
    pub fn export(&self, transient: bool, transient_non_hashable: bool) -> Result<Vec<u8>, ModelError> {
        let mut out = Vec::with_capacity(MODEL_TYPE_LEN + self.values.len() * 8);
        out.extend_from_slice(&self.model_type);
        for (index, value) in &self.values {
            let spec = self.spec_by_index(*index).ok_or_else(|| {
                ModelError::Schema(format!("stored value for undeclared index {}", index))
            })?;
            if spec.transient {
                if !transient {
                    continue;
                }
                if !spec.hashable && !transient_non_hashable {
                    continue;
                }
            }
            Self::pack_record(spec, value, &mut out)?;
        }
        Ok(out)
    }

    /// Populate from a binary image. The first 6 bytes must equal this
    /// model's type. Unknown indices fail unless `ignore_unknown`; transient
    /// fields in the image are dropped unless `preserve_transient`.
    pub fn load(
        &mut self,
        image: &[u8],
        preserve_transient: bool,
        ignore_unknown: bool,
    ) -> Result<(), ModelError> {
        if image.len() < MODEL_TYPE_LEN {
            return Err(ModelError::Malformed("image shorter than the model type header".into()));
        }
        if image[..MODEL_TYPE_LEN] != self.model_type {
            return Err(ModelError::Malformed("model type mismatch".into()));
        }

        let mut loaded: BTreeMap<u8, Value> = BTreeMap::new();
        let mut seen = [false; 256];
        let mut pos = MODEL_TYPE_LEN;

        while pos < image.len() {
            if image.len() - pos < 2 {
                return Err(ModelError::Malformed("truncated field record header".into()));
            }
            let tag = image[pos];
            let index = image[pos + 1];
            pos += 2;

            let kind = FieldType::from_tag(tag).ok_or_else(|| {
                ModelError::Malformed(format!("unknown field type tag 0x{:02x}", tag))
            })?;
            if seen[index as usize] {
                return Err(ModelError::Malformed(format!("duplicate field index {}", index)));
            }
            seen[index as usize] = true;

            // Record payload length, bounded by the remaining image.
            let value_len = if kind.is_variable() {
                if image.len() - pos < 2 {
                    return Err(ModelError::Malformed("truncated length prefix".into()));
                }
                let len = u16::from_be_bytes([image[pos], image[pos + 1]]) as usize;
                pos += 2;
                len
            } else {
                kind.fixed_width().unwrap_or(0)
            };
            if image.len() - pos < value_len {
                return Err(ModelError::Malformed(format!(
                    "record for index {} overruns the image",
                    index
                )));
            }
            let raw = &image[pos..pos + value_len];
            pos += value_len;

            let Some(spec) = self.spec_by_index(index) else {
                if !ignore_unknown {
                    return Err(ModelError::Malformed(format!("unknown field index {}", index)));
                }
                continue;
            };
            if spec.kind != kind {
                return Err(ModelError::Malformed(format!(
                    "field '{}' declared as {:?} but encoded as {:?}",
                    spec.name, spec.kind, kind
                )));
            }
            if kind.is_variable() && value_len > spec.max_size as usize {
                return Err(ModelError::Malformed(format!(
                    "length {} exceeds maximum {} for field '{}'",
                    value_len, spec.max_size, spec.name
                )));
            }
            if spec.transient && !preserve_transient {
                continue;
            }

            let value = match kind {
                FieldType::String => {
                    let s = std::str::from_utf8(raw).map_err(|_| {
                        ModelError::Malformed(format!("invalid UTF-8 in field '{}'", spec.name))
                    })?;
                    Value::Text(s.to_string())
                }
                FieldType::Bytes => Value::Bytes(raw.to_vec()),
                FieldType::UInt64BE => {
                    let mut b = [0u8; 8];
                    b.copy_from_slice(raw);
                    Value::U64(u64::from_be_bytes(b))
                }
                FieldType::UInt64LE => {
                    let mut b = [0u8; 8];
                    b.copy_from_slice(raw);
                    Value::U64(u64::from_le_bytes(b))
                }
                k => {
                    if let Some(layout) = k.int_layout() {
                        Value::Int(layout.decode(raw))
                    } else {
                        Value::Bytes(raw.to_vec())
                    }
                }
            };
            loaded.insert(index, value);
        }

        self.values = loaded;
        Ok(())
    }

    fn hash_image(&self, transient: bool, exclude: &[&str]) -> Result<Vec<u8>, ModelError> {
        let mut out = Vec::new();
        if !transient {
            out.extend_from_slice(&self.model_type);
        }
        for (index, value) in &self.values {
            let spec = self.spec_by_index(*index).ok_or_else(|| {
                ModelError::Schema(format!("stored value for undeclared index {}", index))
            })?;
            if !spec.hashable || spec.transient != transient {
                continue;
            }
            if exclude.contains(&spec.name) {
                continue;
            }
            Self::pack_record(spec, value, &mut out)?;
        }
        Ok(out)
    }

    /// Content hash: model type header plus every hashable, non-transient
    /// field with a defined value, in index order. Names in `exclude` are
    /// omitted exactly as if unset.
    pub fn content_hash(&self, exclude: &[&str]) -> Result<Hash32, ModelError> {
        Ok(hash_buf(&self.hash_image(false, exclude)?))
    }

    /// Fingerprint of the hashable transient fields. No header is included:
    /// the transient hash is a content fingerprint, not a model identity.
    pub fn transient_hash(&self) -> Result<Hash32, ModelError> {
        Ok(hash_buf(&self.hash_image(true, &[])?))
    }
}
