//! Mapped records.
//!
//! Projects a source record through a template descriptor: the output has
//! one property per source property, each valued by the template with
//! [`DescId::SOURCE`] swapped for that property's descriptor, and each
//! named by surrounding the source key with a prefix/suffix. The operation
//! is not cached beyond what interning already provides for its outputs.

use crate::error::ReflectError;
use crate::intern::DescEngine;
use crate::types::{DescData, DescId, PropKey, PropertyInfo};

impl DescEngine {
    /// Map `source`'s properties through `template`.
    ///
    /// Key naming: `prefix + key + suffix`, with the key's first letter
    /// capitalized when the prefix is non-empty. Opaque (symbol) keys have
    /// no textual form: surrounding one with a non-empty prefix or suffix
    /// is a [`ReflectError::MalformedKey`]; with both empty the key passes
    /// through untouched.
    pub fn mapped_record(
        &self,
        source: DescId,
        template: DescId,
        prefix: &str,
        suffix: &str,
    ) -> Result<DescId, ReflectError> {
        let Some(DescData::Record(shape_id)) = self.lookup(source) else {
            return Err(ReflectError::NotRecord { descriptor: source });
        };
        let shape = self.record_shape(shape_id);
        let surround = !prefix.is_empty() || !suffix.is_empty();

        let mut properties = Vec::with_capacity(shape.properties.len());
        for prop in shape.properties.iter() {
            let key = match prop.key {
                PropKey::Text(atom) if surround => {
                    let name = self.resolve_atom(atom);
                    PropKey::Text(self.intern_string(&surround_key(&name, prefix, suffix)))
                }
                PropKey::Opaque(token) if surround => {
                    return Err(ReflectError::MalformedKey { key: token });
                }
                key => key,
            };
            let value = self.swap_one(template, DescId::SOURCE, prop.value);
            properties.push(PropertyInfo::new(key, value));
        }
        Ok(self.record_with_flags(properties, shape.flags))
    }
}

fn surround_key(name: &str, prefix: &str, suffix: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + name.len() + suffix.len());
    out.push_str(prefix);
    if prefix.is_empty() {
        out.push_str(name);
    } else {
        let mut chars = name.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out.push_str(suffix);
    out
}

#[cfg(test)]
mod tests {
    use super::surround_key;

    #[test]
    fn capitalizes_only_with_prefix() {
        assert_eq!(surround_key("legCount", "allMy", ""), "allMyLegCount");
        assert_eq!(surround_key("legCount", "", "Total"), "legCountTotal");
        assert_eq!(surround_key("", "get", "Value"), "getValue");
    }
}
