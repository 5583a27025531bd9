//! Caller-supplied environment the binding consults while building requests.

use crate::charset::Charset;
use crate::error::RequestError;

/// Environment hooks: placeholder expansion for URI strings and the charset
/// used for text bodies when the message declares none.
///
/// Both hooks default to no-ops, so a unit implementation is a valid context.
pub trait BindingContext: Send + Sync {
    /// Expands placeholder syntax in a URI string before it is parsed.
    fn resolve_placeholders(&self, text: &str) -> Result<String, RequestError> {
        Ok(text.to_owned())
    }

    /// Fallback charset for text bodies.
    fn default_charset(&self) -> Charset {
        Charset::Utf8
    }
}

/// Context with no placeholders and a UTF-8 default charset.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultContext;

impl BindingContext for DefaultContext {}
