//! Resolver capability mapping resource identifiers to addressable locators.

/// Maps a resource identifier (the trimmed directive argument) to a locator
/// string usable as a frame source.
///
/// Resolution is infallible by contract. Lookup semantics belong to the
/// host's storage adapter, and an identifier with no backing resource still
/// yields a locator; the frame it feeds simply renders broken.
pub trait ResourceResolver {
    /// Resolve `identifier` to a URI string.
    fn resolve(&self, identifier: &str) -> String;
}

impl<F> ResourceResolver for F
where
    F: Fn(&str) -> String,
{
    fn resolve(&self, identifier: &str) -> String {
        self(identifier)
    }
}

/// Resolver for hosts that serve the document store under a fixed base URL.
///
/// Identifiers are joined onto the base with each path segment
/// percent-encoded separately, so `sub dir/page.html` stays a two-segment
/// path instead of collapsing into one encoded blob.
#[derive(Debug, Clone)]
pub struct BaseUrlResolver {
    base: String,
}

impl BaseUrlResolver {
    /// Creates a resolver rooted at `base`. Trailing slashes are dropped so
    /// joining never produces `//` separators.
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }
}

impl ResourceResolver for BaseUrlResolver {
    fn resolve(&self, identifier: &str) -> String {
        let mut uri = self.base.clone();
        for segment in identifier.split('/') {
            uri.push('/');
            uri.push_str(&urlencoding::encode(segment));
        }
        uri
    }
}
