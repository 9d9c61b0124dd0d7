//! Record traits defining the shape every resource is declared with

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A record type that can be exposed as a resource.
///
/// The dispatch engine never looks at concrete record types: fields are
/// discovered by serializing the record's [`Default`] value (the
/// *prototype*), and decoding merges wire documents into a serialized copy
/// of a record before deserializing it back. Records therefore must:
///
/// - serialize to a JSON object (plain structs, not tuples, enums or
///   collections);
/// - deserialize from their own serialized form;
/// - use `Default` as the zero value for newly created records.
///
/// Implement it with [`impl_record!`](crate::impl_record) or by hand:
///
/// ```rust,ignore
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// pub struct Post {
///     pub id: String,
///     pub title: String,
/// }
///
/// impl Record for Post {}
/// ```
pub trait Record: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    /// Bare name of the record type, used to derive the resource name
    fn type_name() -> &'static str {
        bare_type_name(std::any::type_name::<Self>())
    }
}

/// Records produced by a read, keeping the cardinality the client asked for
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Payload<T> {
    /// Number of records carried
    pub fn len(&self) -> usize {
        match self {
            Payload::One(_) => 1,
            Payload::Many(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into a list, losing the shape
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Payload::One(record) => vec![record],
            Payload::Many(records) => records,
        }
    }

    /// Mutable access to every record, whatever the shape
    pub fn records_mut(&mut self) -> std::slice::IterMut<'_, T> {
        match self {
            Payload::One(record) => std::slice::from_mut(record).iter_mut(),
            Payload::Many(records) => records.iter_mut(),
        }
    }
}

/// Strip the module path and generic arguments from a type name
///
/// `my_app::models::Post` → `Post`, `my_app::Wrapper<my_app::Post>` → `Wrapper`
pub fn bare_type_name(full: &'static str) -> &'static str {
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Comment {
        body: String,
    }

    impl Record for Comment {}

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Renamed {
        body: String,
    }

    impl Record for Renamed {
        fn type_name() -> &'static str {
            "Note"
        }
    }

    #[test]
    fn test_type_name_is_bare() {
        assert_eq!(Comment::type_name(), "Comment");
        assert_eq!(Renamed::type_name(), "Note");
    }

    #[test]
    fn test_bare_type_name() {
        assert_eq!(bare_type_name("a::b::Post"), "Post");
        assert_eq!(bare_type_name("Post"), "Post");
        assert_eq!(bare_type_name("a::Wrapper<a::Post>"), "Wrapper");
    }

    #[test]
    fn test_payload_shape() {
        let mut one = Payload::One(Comment::default());
        assert_eq!(one.len(), 1);
        for c in one.records_mut() {
            c.body = "edited".to_string();
        }
        assert_eq!(one.into_vec()[0].body, "edited");

        let many: Payload<Comment> = Payload::Many(vec![]);
        assert!(many.is_empty());
    }
}
