//! Naming rules: resource names and wire keys
//!
//! Resource names are derived from record type names and field names are
//! translated between the record's declaration and the JSON document. Both
//! rules are pluggable through [`NamingStrategy`]; [`EnglishNaming`] is the
//! default.

/// Strategy translating type and field names to their wire form
///
/// Implementations must make `field_name(wire_key(f)) == f` hold for the
/// field names they are expected to handle.
pub trait NamingStrategy: Send + Sync {
    /// Resource name for a bare record type name (e.g. `Post` → `posts`)
    fn resource_name(&self, type_name: &str) -> String;

    /// Wire key for a declared field name
    fn wire_key(&self, field: &str) -> String;

    /// Declared field name for a wire key that is not in the codec's table
    fn field_name(&self, wire_key: &str) -> String;
}

/// Default naming: lowercase English plurals and lowerCamelCase wire keys
///
/// - `Post` → `posts`, `Category` → `categories`, `Address` → `addresses`
/// - `created_at` ⇄ `createdAt`
///
/// Irregular plurals (`person` → `people`) are not handled; register a
/// custom [`NamingStrategy`] for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishNaming;

impl NamingStrategy for EnglishNaming {
    fn resource_name(&self, type_name: &str) -> String {
        Pluralizer::pluralize(&type_name.to_lowercase())
    }

    fn wire_key(&self, field: &str) -> String {
        snake_to_lower_camel(field)
    }

    fn field_name(&self, wire_key: &str) -> String {
        lower_camel_to_snake(wire_key)
    }
}

/// Regular English pluralization
pub struct Pluralizer;

impl Pluralizer {
    /// Convert a singular noun to its plural form
    ///
    /// # Examples
    ///
    /// ```
    /// use restful::core::naming::Pluralizer;
    ///
    /// assert_eq!(Pluralizer::pluralize("post"), "posts");
    /// assert_eq!(Pluralizer::pluralize("company"), "companies");
    /// assert_eq!(Pluralizer::pluralize("address"), "addresses");
    /// ```
    pub fn pluralize(singular: &str) -> String {
        if singular.is_empty() {
            return String::new();
        }

        match singular {
            // consonant + y -> ies
            s if s.len() > 1
                && s.ends_with('y')
                && !s[..s.len() - 1].ends_with(['a', 'e', 'i', 'o', 'u']) =>
            {
                format!("{}ies", &s[..s.len() - 1])
            }

            s if s.ends_with(['s', 'x', 'z']) || s.ends_with("ch") || s.ends_with("sh") => {
                format!("{}es", s)
            }

            s => format!("{}s", s),
        }
    }
}

/// `created_at` → `createdAt`
pub fn snake_to_lower_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;

    for c in name.chars() {
        if c == '_' && !out.is_empty() {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    out
}

/// `createdAt` → `created_at`
pub fn lower_camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);

    for c in name.chars() {
        if c.is_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}
