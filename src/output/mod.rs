//! Output bindings and the per-invocation output collector.

mod collector;
mod generic;
mod http;

pub use collector::Output;
pub use generic::GenericOutput;
pub use http::{HttpOutput, DEFAULT_HTTP_OUTPUT};

/// An output binding of either kind.
///
/// The HTTP response is kept in its own slot on [`Output`]; every other kind
/// is a [`GenericOutput`] stored by name.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputBinding {
    Http(HttpOutput),
    Generic(GenericOutput),
}

impl OutputBinding {
    pub fn name(&self) -> &str {
        match self {
            OutputBinding::Http(http) => http.name(),
            OutputBinding::Generic(generic) => generic.name(),
        }
    }
}

impl From<HttpOutput> for OutputBinding {
    fn from(http: HttpOutput) -> Self {
        OutputBinding::Http(http)
    }
}

impl From<GenericOutput> for OutputBinding {
    fn from(generic: GenericOutput) -> Self {
        OutputBinding::Generic(generic)
    }
}
