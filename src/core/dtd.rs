//! DTD Declaration Parsing
//!
//! Splits the content of `<!ENTITY ...>` and `<!DOCTYPE ...>` tokens into
//! their parts. Only what entity expansion and consumers need is parsed;
//! element and attribute-list declarations are passed through as raw
//! content.

use super::scanner::{is_valid_name, is_whitespace, trim_start};
use memchr::memchr;

/// `SYSTEM "uri"` or `PUBLIC "pubid" "uri"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalId<'a> {
    pub public_id: Option<&'a [u8]>,
    pub system_id: &'a [u8],
}

/// What an entity stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityDef<'a> {
    /// Literal replacement text, still escaped
    Internal(&'a [u8]),
    /// External entity, unparsed if it carries an NDATA notation
    External {
        id: ExternalId<'a>,
        ndata: Option<&'a [u8]>,
    },
}

/// A parsed `<!ENTITY ...>` declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDecl<'a> {
    pub name: &'a [u8],
    /// `<!ENTITY % name ...>`
    pub parameter: bool,
    pub definition: EntityDef<'a>,
}

/// A parsed `<!DOCTYPE ...>` header (internal subset excluded)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Doctype<'a> {
    pub name: &'a [u8],
    pub external: Option<ExternalId<'a>>,
}

/// Byte reader over declaration content
struct Fields<'a> {
    rest: &'a [u8],
}

impl<'a> Fields<'a> {
    fn new(content: &'a [u8]) -> Self {
        Fields { rest: trim_start(content) }
    }

    fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    fn peek(&self) -> Option<u8> {
        self.rest.first().copied()
    }

    /// Next whitespace-delimited word
    fn word(&mut self) -> Option<&'a [u8]> {
        if self.rest.is_empty() {
            return None;
        }
        let end = self.rest.iter().position(|&b| is_whitespace(b)).unwrap_or(self.rest.len());
        let word = &self.rest[..end];
        self.rest = trim_start(&self.rest[end..]);
        Some(word)
    }

    /// Next quoted literal, without its quotes
    fn literal(&mut self) -> Result<&'a [u8], &'static str> {
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err("expected a quoted literal"),
        };
        let len = memchr(quote, &self.rest[1..]).ok_or("unterminated literal")?;
        let literal = &self.rest[1..1 + len];
        self.rest = trim_start(&self.rest[len + 2..]);
        Ok(literal)
    }

    fn external_id(&mut self, keyword: &[u8]) -> Result<ExternalId<'a>, &'static str> {
        match keyword {
            b"SYSTEM" => Ok(ExternalId { public_id: None, system_id: self.literal()? }),
            b"PUBLIC" => {
                let public_id = self.literal()?;
                Ok(ExternalId { public_id: Some(public_id), system_id: self.literal()? })
            }
            _ => Err("expected SYSTEM or PUBLIC"),
        }
    }
}

/// Parse the content of an entity declaration (after `<!ENTITY`)
pub fn parse_entity_decl(content: &[u8]) -> Result<EntityDecl<'_>, &'static str> {
    let mut fields = Fields::new(content);

    let mut name = fields.word().ok_or("entity declaration without a name")?;
    let parameter = name == b"%";
    if parameter {
        name = fields.word().ok_or("parameter entity declaration without a name")?;
    }
    if !is_valid_name(name) {
        return Err("invalid entity name");
    }

    let definition = match fields.peek() {
        Some(b'"' | b'\'') => EntityDef::Internal(fields.literal()?),
        Some(_) => {
            let keyword = fields.word().ok_or("expected SYSTEM or PUBLIC")?;
            let id = fields.external_id(keyword)?;
            let ndata = match fields.word() {
                Some(b"NDATA") if !parameter => Some(fields.word().ok_or("NDATA without a notation name")?),
                Some(_) => return Err("unexpected content after external id"),
                None => None,
            };
            EntityDef::External { id, ndata }
        }
        None => return Err("entity declaration without a value"),
    };

    if !fields.is_empty() {
        return Err("unexpected content after entity value");
    }

    Ok(EntityDecl { name, parameter, definition })
}

/// Parse the header of a DOCTYPE token (after `<!DOCTYPE`)
pub fn parse_doctype(content: &[u8]) -> Result<Doctype<'_>, &'static str> {
    let mut fields = Fields::new(content);
    let name = fields.word().ok_or("DOCTYPE without a root element name")?;
    let external = match fields.word() {
        Some(keyword) => Some(fields.external_id(keyword)?),
        None => None,
    };
    Ok(Doctype { name, external })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_entity() {
        let decl = parse_entity_decl(b"copy \"&#169; ACME\"").unwrap();
        assert_eq!(decl.name, b"copy");
        assert!(!decl.parameter);
        assert_eq!(decl.definition, EntityDef::Internal(b"&#169; ACME"));
    }

    #[test]
    fn test_parameter_entity() {
        let decl = parse_entity_decl(b"% common 'id ID #IMPLIED'").unwrap();
        assert_eq!(decl.name, b"common");
        assert!(decl.parameter);
    }

    #[test]
    fn test_external_entities() {
        let decl = parse_entity_decl(b"chap SYSTEM \"chap1.xml\"").unwrap();
        assert_eq!(
            decl.definition,
            EntityDef::External {
                id: ExternalId { public_id: None, system_id: b"chap1.xml" },
                ndata: None,
            }
        );

        let decl = parse_entity_decl(b"logo PUBLIC \"-//ACME//Logo\" 'logo.gif' NDATA gif").unwrap();
        assert_eq!(
            decl.definition,
            EntityDef::External {
                id: ExternalId { public_id: Some(b"-//ACME//Logo"), system_id: b"logo.gif" },
                ndata: Some(b"gif"),
            }
        );
    }

    #[test]
    fn test_malformed_entities() {
        assert!(parse_entity_decl(b"").is_err());
        assert!(parse_entity_decl(b"name").is_err());
        assert!(parse_entity_decl(b"name \"unterminated").is_err());
        assert!(parse_entity_decl(b"name BOGUS \"x\"").is_err());
        assert!(parse_entity_decl(b"name PUBLIC \"only-public\"").is_err());
        assert!(parse_entity_decl(b"1name \"x\"").is_err());
        assert!(parse_entity_decl(b"name \"x\" trailing").is_err());
    }

    #[test]
    fn test_doctype() {
        let doctype = parse_doctype(b"html").unwrap();
        assert_eq!(doctype.name, b"html");
        assert!(doctype.external.is_none());

        let doctype = parse_doctype(b"note SYSTEM \"note.dtd\"").unwrap();
        assert_eq!(doctype.external.unwrap().system_id, b"note.dtd");
    }
}
