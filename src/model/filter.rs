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

//! Field filtering: fetch a stored value, apply an optional operator,
//! compare against a caller-supplied value.
//!
//! Filters arrive as query documents, so the descriptor types are serde
//! deserializable. Operators are compact strings:
//!
//! ```text
//! "hash"          blake2b-256 of the field (strings hash their UTF-8 bytes)
//! ":start[,len]"  substring; negative start counts from the end
//! "& n" "| n" "^ n" "<< n" ">> n"
//!                 bitwise, unsigned integer fields up to 32 bits only,
//!                 masked back to the field's natural width
//! ```

use crate::crypto::hash::hash_buf;
use crate::model::codec::{Model, ModelError};
use crate::model::field::Value;
use serde::{Deserialize, Serialize};

/// Comparison to apply between the (transformed) stored value and the
/// filter value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CmpOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

/// One filter clause.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Field name. The pseudo-field `"id"` resolves to `id2` when defined,
    /// falling back to `id1`.
    pub field: String,
    /// Operator string; empty for none.
    #[serde(default)]
    pub operator: String,
    /// Comparison.
    pub cmp: CmpOp,
    /// Value to compare against; `None` matches an unset field.
    #[serde(default)]
    pub value: Option<Value>,
}

/// Parsed operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    None,
    Hash,
    Slice { start: i64, len: Option<u64> },
    BitAnd(u32),
    BitOr(u32),
    BitXor(u32),
    Shl(u32),
    Shr(u32),
}

fn parse_u32(s: &str) -> Result<u32, ModelError> {
    let s = s.trim();
    let parsed = if let Some(hexpart) = s.strip_prefix("0x") {
        u32::from_str_radix(hexpart, 16)
    } else {
        s.parse::<u32>()
    };
    parsed.map_err(|_| ModelError::Schema(format!("bad operator operand '{}'", s)))
}

impl Op {
    fn parse(s: &str) -> Result<Self, ModelError> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Op::None);
        }
        if s == "hash" {
            return Ok(Op::Hash);
        }
        if let Some(rest) = s.strip_prefix(':') {
            let mut parts = rest.splitn(2, ',');
            let start = parts
                .next()
                .unwrap_or("")
                .trim()
                .parse::<i64>()
                .map_err(|_| ModelError::Schema(format!("bad substring operator '{}'", s)))?;
            let len = match parts.next() {
                None => None,
                Some(p) => Some(
                    p.trim()
                        .parse::<u64>()
                        .map_err(|_| ModelError::Schema(format!("bad substring operator '{}'", s)))?,
                ),
            };
            return Ok(Op::Slice { start, len });
        }
        if let Some(rest) = s.strip_prefix("<<") {
            return Ok(Op::Shl(parse_u32(rest)?));
        }
        if let Some(rest) = s.strip_prefix(">>") {
            return Ok(Op::Shr(parse_u32(rest)?));
        }
        if let Some(rest) = s.strip_prefix('&') {
            return Ok(Op::BitAnd(parse_u32(rest)?));
        }
        if let Some(rest) = s.strip_prefix('|') {
            return Ok(Op::BitOr(parse_u32(rest)?));
        }
        if let Some(rest) = s.strip_prefix('^') {
            return Ok(Op::BitXor(parse_u32(rest)?));
        }
        Err(ModelError::Schema(format!("unknown operator '{}'", s)))
    }
}

fn slice_bounds(len: usize, start: i64, want: Option<u64>) -> (usize, usize) {
    let from = if start < 0 {
        len.saturating_sub(start.unsigned_abs() as usize)
    } else {
        (start as usize).min(len)
    };
    let to = match want {
        None => len,
        Some(n) => (from + n as usize).min(len),
    };
    (from, to.max(from))
}

fn apply_slice(value: &Value, start: i64, len: Option<u64>) -> Result<Value, ModelError> {
    match value {
        Value::Bytes(b) => {
            let (from, to) = slice_bounds(b.len(), start, len);
            Ok(Value::Bytes(b[from..to].to_vec()))
        }
        Value::Text(s) => {
            let chars: Vec<char> = s.chars().collect();
            let (from, to) = slice_bounds(chars.len(), start, len);
            Ok(Value::Text(chars[from..to].iter().collect()))
        }
        v => Err(ModelError::Schema(format!(
            "substring operator requires a string or bytes field, got {}",
            v.type_name()
        ))),
    }
}

fn apply_bitwise(model: &Model, name: &str, value: &Value, op: Op) -> Result<Value, ModelError> {
    let spec = model
        .spec(name)
        .ok_or_else(|| ModelError::Schema(format!("unknown field '{}'", name)))?;
    let layout = spec.kind.int_layout().filter(|l| !l.signed && l.bits <= 32).ok_or_else(|| {
        ModelError::Schema(format!(
            "bitwise operator requires an unsigned integer field up to 32 bits, field '{}' is not",
            name
        ))
    })?;
    let Value::Int(v) = value else {
        return Err(ModelError::Schema(format!("field '{}' holds no integer", name)));
    };
    let mask: u64 = (1u64 << layout.bits) - 1;
    let v = *v as u64;
    let out = match op {
        Op::BitAnd(n) => v & n as u64,
        Op::BitOr(n) => v | n as u64,
        Op::BitXor(n) => v ^ n as u64,
        Op::Shl(n) => if n >= 64 { 0 } else { v << n },
        Op::Shr(n) => if n >= 64 { 0 } else { v >> n },
        _ => v,
    } & mask;
    Ok(Value::Int(out as i64))
}

fn apply_hash(value: &Value) -> Result<Value, ModelError> {
    match value {
        Value::Bytes(b) => Ok(Value::Bytes(hash_buf(b).to_vec())),
        Value::Text(s) => Ok(Value::Bytes(hash_buf(s.as_bytes()).to_vec())),
        v => Err(ModelError::Schema(format!(
            "hash operator requires a string or bytes field, got {}",
            v.type_name()
        ))),
    }
}

/// Resolve the pseudo-field `"id"` to a concrete field name.
fn resolve_field<'a>(model: &Model, name: &'a str) -> Result<&'a str, ModelError> {
    if name != "id" {
        return Ok(name);
    }
    if model.spec("id2").is_some() && model.has("id2") {
        return Ok("id2");
    }
    if model.spec("id1").is_some() {
        return Ok("id1");
    }
    Err(ModelError::Schema("unknown field 'id'".into()))
}

fn compare(a: &Value, b: &Value, cmp: CmpOp) -> bool {
    use std::cmp::Ordering;
    let ord = match (a, b) {
        (Value::Int(x), Value::Int(y)) => (*x as i128).cmp(&(*y as i128)),
        (Value::Int(x), Value::U64(y)) => (*x as i128).cmp(&(*y as i128)),
        (Value::U64(x), Value::Int(y)) => (*x as i128).cmp(&(*y as i128)),
        (Value::U64(x), Value::U64(y)) => (*x as i128).cmp(&(*y as i128)),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Bytes(x), Value::Bytes(y)) => x.cmp(y),
        // Incomparable families only ever differ.
        _ => return cmp == CmpOp::Ne,
    };
    match cmp {
        CmpOp::Eq => ord == Ordering::Equal,
        CmpOp::Ne => ord != Ordering::Equal,
        CmpOp::Lt => ord == Ordering::Less,
        CmpOp::Le => ord != Ordering::Greater,
        CmpOp::Gt => ord == Ordering::Greater,
        CmpOp::Ge => ord != Ordering::Less,
    }
}

/// Evaluate a filter clause against a model.
pub fn matches(model: &Model, filter: &Filter) -> Result<bool, ModelError> {
    let name = resolve_field(model, &filter.field)?;
    if model.spec(name).is_none() {
        return Err(ModelError::Schema(format!("unknown field '{}'", name)));
    }
    let op = Op::parse(&filter.operator)?;
    let stored = model.value(name);

    // An operator applied to an unset field yields only NE.
    if op != Op::None && stored.is_none() {
        return Ok(filter.cmp == CmpOp::Ne);
    }

    let lhs = match (stored, op) {
        (None, _) => None,
        (Some(v), Op::None) => Some(v.clone()),
        (Some(v), Op::Hash) => Some(apply_hash(v)?),
        (Some(v), Op::Slice { start, len }) => Some(apply_slice(v, start, len)?),
        (Some(v), bitop) => Some(apply_bitwise(model, name, v, bitop)?),
    };

    Ok(match (&lhs, &filter.value) {
        (None, None) => filter.cmp == CmpOp::Eq,
        (None, Some(_)) | (Some(_), None) => filter.cmp == CmpOp::Ne,
        (Some(a), Some(b)) => compare(a, b, filter.cmp),
    })
}
