//! Namespace Resolution
//!
//! Helpers for reading `xmlns` declarations off attributes. Prefixes are
//! resolved after the build by walking ancestors; see
//! `XmlDocument::lookup_namespace`.

/// Well-known namespace URIs
pub mod ns {
    pub const XML: &[u8] = b"http://www.w3.org/XML/1998/namespace";
    pub const XMLNS: &[u8] = b"http://www.w3.org/2000/xmlns/";
}

/// URI bound to `xml` or `xmlns` without any declaration
pub fn predeclared(prefix: &[u8]) -> Option<&'static [u8]> {
    match prefix {
        b"xml" => Some(ns::XML),
        b"xmlns" => Some(ns::XMLNS),
        _ => None,
    }
}

/// Prefix declared by an attribute name, if it is a namespace declaration
///
/// `xmlns` declares the default namespace and yields an empty prefix.
pub fn declared_prefix(attr_name: &[u8]) -> Option<&[u8]> {
    match attr_name {
        b"xmlns" => Some(&attr_name[..0]),
        [b'x', b'm', b'l', b'n', b's', b':', prefix @ ..] if !prefix.is_empty() => Some(prefix),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predeclared() {
        assert_eq!(predeclared(b"xml"), Some(ns::XML));
        assert_eq!(predeclared(b"xmlns"), Some(ns::XMLNS));
        assert_eq!(predeclared(b"svg"), None);
    }

    #[test]
    fn test_declared_prefix() {
        assert_eq!(declared_prefix(b"xmlns"), Some(b"" as &[u8]));
        assert_eq!(declared_prefix(b"xmlns:svg"), Some(b"svg" as &[u8]));
        assert_eq!(declared_prefix(b"xmlns:"), None);
        assert_eq!(declared_prefix(b"xmlnsx"), None);
        assert_eq!(declared_prefix(b"href"), None);
    }
}
