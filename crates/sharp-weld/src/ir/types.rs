//! Type mapping from native C++ names to C# names
//!
//! The mapper is a total function over display names: pointer types map
//! structurally, references collapse to their referenced type, fixed-width
//! integer aliases map to the C# integer keywords, and everything else passes
//! through unchanged (`void`, `bool`, class names).
//!
//! | Native type | C# type | Notes |
//! |-------------|---------|-------|
//! | `uint8_t`, `uint16_t`, `uint32_t`, `uint64_t` | `byte`, `ushort`, `uint`, `ulong` | |
//! | `int8_t`, `int16_t`, `int32_t`, `int64_t` | `sbyte`, `short`, `int`, `long` | |
//! | `char`, `const char` | `sbyte` | No narrow char type in C# |
//! | `size_t` | `nint` | Placeholder, marshaled as `IntPtr`/`long` |
//! | `T*` | `map(T)*` | Structural |
//! | `T&` | `map(T)` | ABI adjustment happens at the call site |
//! | `const T` | `map(T)` | |
//! | configured alias | wrapper class name | e.g. `iterator` -> `ParsedJsonIteratorN` |

use crate::ir::TypeDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// C# primitive types reachable from native integer aliases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostPrimitive {
    // Unsigned integers
    Byte,
    UShort,
    UInt,
    ULong,
    // Signed integers
    SByte,
    Short,
    Int,
    Long,
    /// Platform-width placeholder for `size_t`
    NativeInt,
}

impl HostPrimitive {
    /// Convert to a C# type keyword
    pub fn to_csharp(&self) -> &'static str {
        match self {
            HostPrimitive::Byte => "byte",
            HostPrimitive::UShort => "ushort",
            HostPrimitive::UInt => "uint",
            HostPrimitive::ULong => "ulong",
            HostPrimitive::SByte => "sbyte",
            HostPrimitive::Short => "short",
            HostPrimitive::Int => "int",
            HostPrimitive::Long => "long",
            HostPrimitive::NativeInt => NATIVE_INT,
        }
    }

    /// Parse from a native type name
    pub fn from_native(s: &str) -> Option<Self> {
        match s {
            "uint8_t" => Some(HostPrimitive::Byte),
            "uint16_t" => Some(HostPrimitive::UShort),
            "uint32_t" => Some(HostPrimitive::UInt),
            "uint64_t" => Some(HostPrimitive::ULong),
            "int8_t" => Some(HostPrimitive::SByte),
            "int16_t" => Some(HostPrimitive::Short),
            "int32_t" => Some(HostPrimitive::Int),
            "int64_t" => Some(HostPrimitive::Long),
            "size_t" => Some(HostPrimitive::NativeInt),
            "char" | "const char" => Some(HostPrimitive::SByte),
            _ => None,
        }
    }
}

impl fmt::Display for HostPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_csharp())
    }
}

/// Mapped name of the platform-width placeholder
pub const NATIVE_INT: &str = "nint";

/// Maps native type display names to C# type names
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeMapper {
    aliases: BTreeMap<String, String>,
}

impl TypeMapper {
    /// Create a mapper with the given alias table
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        Self { aliases }
    }

    /// Add an alias (`native` -> `host`)
    pub fn with_alias(mut self, native: impl Into<String>, host: impl Into<String>) -> Self {
        self.aliases.insert(native.into(), host.into());
        self
    }

    /// Map a native display name to its C# name
    pub fn map(&self, native: &str) -> String {
        let native = native.trim();
        if let Some(pointee) = native.strip_suffix('*') {
            return format!("{}*", self.map(pointee));
        }

        let ty = native.strip_suffix('&').map(str::trim_end).unwrap_or(native);

        if let Some(primitive) = HostPrimitive::from_native(ty) {
            return primitive.to_csharp().to_string();
        }

        // C# has no const qualifier
        if let Some(unqualified) = ty.strip_prefix("const ") {
            return self.map(unqualified);
        }

        if let Some(alias) = self.aliases.get(ty) {
            return alias.clone();
        }

        ty.to_string()
    }

    /// Map a type descriptor
    pub fn map_type(&self, ty: &TypeDescriptor) -> String {
        self.map(ty.display_name())
    }

    /// Check whether a mapped name is the platform-width placeholder
    pub fn is_native_int(mapped: &str) -> bool {
        mapped == NATIVE_INT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> TypeMapper {
        TypeMapper::default()
            .with_alias("iterator", "ParsedJsonIteratorN")
            .with_alias("ParsedJson", "ParsedJsonN")
    }

    #[test]
    fn test_primitive_mapping() {
        let m = mapper();
        assert_eq!(m.map("uint32_t"), "uint");
        assert_eq!(m.map("int8_t"), "sbyte");
        assert_eq!(m.map("uint64_t"), "ulong");
        assert_eq!(m.map("size_t"), "nint");
        assert_eq!(m.map("const char"), "sbyte");
    }

    #[test]
    fn test_pointer_and_reference_mapping() {
        let m = mapper();
        assert_eq!(m.map("int64_t*"), "long*");
        assert_eq!(m.map("const char*"), "sbyte*");
        assert_eq!(m.map("uint8_t**"), "byte**");
        assert_eq!(m.map("uint64_t&"), "ulong");
        assert_eq!(m.map("ParsedJson&"), "ParsedJsonN");
        assert_eq!(m.map("uint64_t &"), "ulong");
        assert_eq!(m.map("const char *"), "sbyte*");
        assert_eq!(m.map("const uint8_t*"), "byte*");
        assert_eq!(m.map("const ParsedJson &"), "ParsedJsonN");
    }

    #[test]
    fn test_passthrough_and_aliases() {
        let m = mapper();
        assert_eq!(m.map("void"), "void");
        assert_eq!(m.map("bool"), "bool");
        assert_eq!(m.map("double"), "double");
        assert_eq!(m.map("Thing"), "Thing");
        assert_eq!(m.map("iterator"), "ParsedJsonIteratorN");
        assert_eq!(m.map("ParsedJson*"), "ParsedJsonN*");
    }

    #[test]
    fn test_native_int_flag() {
        let m = mapper();
        assert!(TypeMapper::is_native_int(&m.map("size_t")));
        assert!(!TypeMapper::is_native_int(&m.map("int64_t")));
    }
}
