//! Parser and cursor configuration

/// XML version used for character validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XmlVersion {
    #[default]
    V1_0,
    V1_1,
}

/// Options shared by the tokenizer and the cursor
///
/// `Options::default()` is strict: every structural or lexical violation
/// is raised. `Options::lenient()` flags and recovers where possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Absorb structural violations instead of raising them
    pub tolerate_malformed: bool,
    /// Keep whitespace before tokens instead of dropping it
    pub preserve_whitespace: bool,
    /// Reject characters outside the `Char` production in text
    pub check_chars: bool,
    /// Version whose `Char` production `check_chars` uses
    pub xml_version: XmlVersion,
    /// Report CDATA sections as text from the cursor
    pub conflate_cdata: bool,
}

impl Options {
    /// Strict mode (the default)
    pub fn strict() -> Self {
        Options::default()
    }

    /// Lenient mode: tolerate malformed documents
    pub fn lenient() -> Self {
        Options {
            tolerate_malformed: true,
            ..Options::default()
        }
    }

    pub fn tolerate_malformed(mut self, yes: bool) -> Self {
        self.tolerate_malformed = yes;
        self
    }

    pub fn preserve_whitespace(mut self, yes: bool) -> Self {
        self.preserve_whitespace = yes;
        self
    }

    pub fn check_chars(mut self, yes: bool) -> Self {
        self.check_chars = yes;
        self
    }

    pub fn xml_version(mut self, version: XmlVersion) -> Self {
        self.xml_version = version;
        self
    }

    pub fn conflate_cdata(mut self, yes: bool) -> Self {
        self.conflate_cdata = yes;
        self
    }

    /// Strict checks are on
    #[inline]
    pub fn is_strict(&self) -> bool {
        !self.tolerate_malformed
    }
}
