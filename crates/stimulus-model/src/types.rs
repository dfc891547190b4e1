//! Type descriptors and template facets.

use crate::grammar::list_items;
use crate::param::ParamMode;
use std::collections::BTreeSet;
use std::fmt;
use stimulus_core::Result;
use stimulus_parser::{AttrMap, AttrValue, deep_merge};

/// Placeholder for the concrete type name in templates.
pub const TYPE_TOKEN: &str = "%T%";
/// Placeholder for the internal variable name in templates.
pub const NAME_TOKEN: &str = "%C%";

const FLAGS: &str = "FLAGS";
const CTYPE: &str = "CTYPE";
const DEFAULT: &str = "DEFAULT";

/// A template-bearing attribute of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    /// Variable declaration in the target language.
    Decl,
    /// Variable declaration in C.
    CDecl,
    /// Conversion of an input argument.
    InConv,
    /// Conversion of an output value.
    OutConv,
    /// Argument expression in the underlying call.
    Call,
    /// Parameter in a generated signature.
    Header,
}

impl Facet {
    /// Attribute key of the facet.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Decl => "DECL",
            Self::CDecl => "CDECL",
            Self::InConv => "INCONV",
            Self::OutConv => "OUTCONV",
            Self::Call => "CALL",
            Self::Header => "HEADER",
        }
    }

    /// Whether a plain (not mode-keyed) template applies to `mode`.
    ///
    /// Conversions only apply in their own direction; every other facet
    /// applies to all modes.
    const fn applies_to(self, mode: ParamMode) -> bool {
        match self {
            Self::InConv => mode.is_input(),
            Self::OutConv => mode.is_output(),
            Self::Decl | Self::CDecl | Self::Call | Self::Header => true,
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Accumulated description of one abstract type for one backend family.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    attrs: AttrMap,
    flags: BTreeSet<String>,
}

impl TypeDescriptor {
    /// Creates an empty descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: AttrMap::new(),
            flags: BTreeSet::new(),
        }
    }

    /// Type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw attribute value.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Raw attribute value, if it is text.
    #[must_use]
    pub fn raw_text(&self, key: &str) -> Option<&str> {
        self.raw(key).and_then(AttrValue::as_text)
    }

    /// Case-insensitive flag check.
    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(&flag.to_lowercase())
    }

    /// Whether values of this type are passed to C by pointer.
    #[must_use]
    pub fn is_by_ref(&self) -> bool {
        self.has_flag("by_ref")
    }

    /// Whether the type is a C enum.
    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.has_flag("enum")
    }

    /// Whether the type is a C bitfield.
    #[must_use]
    pub fn is_bitfield(&self) -> bool {
        self.has_flag("bitfield")
    }

    /// Merges attributes from another source. `FLAGS` is unioned, everything
    /// else deep-merged.
    ///
    /// # Errors
    ///
    /// Returns [`stimulus_core::Error::InvalidDescriptor`] if `FLAGS` is a
    /// mapping.
    pub fn update_from(&mut self, attrs: &AttrMap) -> Result<()> {
        let mut rest = attrs.clone();
        if let Some(flags) = rest.shift_remove(FLAGS) {
            let flags = list_items(&self.name, FLAGS, &flags)?;
            self.flags.extend(flags.iter().map(|f| f.to_lowercase()));
        }
        deep_merge(&mut self.attrs, &rest);
        Ok(())
    }

    /// Template of `facet` for a parameter in `mode`.
    ///
    /// A facet may be a single template or a mapping keyed by mode. `None`
    /// means the facet does not apply; `Some("")` means the type explicitly
    /// opts out of it.
    ///
    /// # Examples
    ///
    /// ```
    /// use stimulus_model::{Facet, ParamMode, TypeDescriptor};
    /// use stimulus_parser::parse_str;
    ///
    /// let mut ty = TypeDescriptor::new("VECTOR");
    /// ty.update_from(&parse_str("INCONV:\n    IN: check(%I%)\nCALL: %C%\n").unwrap()).unwrap();
    ///
    /// assert_eq!(ty.template(Facet::InConv, ParamMode::In), Some("check(%I%)"));
    /// assert_eq!(ty.template(Facet::InConv, ParamMode::Out), None);
    /// assert_eq!(ty.template(Facet::Call, ParamMode::Out), Some("%C%"));
    /// ```
    #[must_use]
    pub fn template(&self, facet: Facet, mode: ParamMode) -> Option<&str> {
        match self.attrs.get(facet.key())? {
            AttrValue::Text(text) => facet.applies_to(mode).then_some(text.as_str()),
            AttrValue::Map(map) if map.is_empty() => Some(""),
            AttrValue::Map(map) => map.get(mode.as_str()).and_then(template_text),
            AttrValue::List(_) => None,
        }
    }

    /// Concrete C type for `mode`, from `CTYPE` (a string or keyed by mode).
    #[must_use]
    pub fn c_type(&self, mode: ParamMode) -> Option<&str> {
        match self.attrs.get(CTYPE)? {
            AttrValue::Text(text) => Some(text),
            AttrValue::Map(map) => map.get(mode.as_str()).and_then(template_text),
            AttrValue::List(_) => None,
        }
    }

    /// C declaration of a variable named `name` holding a value of this type.
    ///
    /// Uses `CDECL` if present and `%T% %C%;` otherwise. A declaration that
    /// needs the C type comes out empty when the type has none for `mode`.
    #[must_use]
    pub fn declare_c_variable(&self, name: &str, mode: ParamMode) -> String {
        let default_decl = format!("{TYPE_TOKEN} {NAME_TOKEN};");
        let decl = self
            .template(Facet::CDecl, mode)
            .unwrap_or(default_decl.as_str());
        let c_type = self.c_type(mode);
        if c_type.is_none() && decl.contains(TYPE_TOKEN) {
            return String::new();
        }
        decl.replace(TYPE_TOKEN, c_type.unwrap_or_default())
            .replace(NAME_TOKEN, name)
    }

    /// Translates an abstract default value through the `DEFAULT` alias map;
    /// values without an alias are returned unchanged.
    #[must_use]
    pub fn translate_default<'a>(&'a self, value: &'a str) -> &'a str {
        self.attrs
            .get(DEFAULT)
            .and_then(AttrValue::as_map)
            .and_then(|aliases| aliases.get(value))
            .and_then(AttrValue::as_text)
            .unwrap_or(value)
    }
}

/// A key without a value reads as an empty mapping; in template position it
/// stands for the empty template.
fn template_text(value: &AttrValue) -> Option<&str> {
    match value {
        AttrValue::Text(text) => Some(text),
        AttrValue::Map(map) if map.is_empty() => Some(""),
        AttrValue::Map(_) | AttrValue::List(_) => None,
    }
}
