//! Generation backends: provider bindings, custom endpoints and the offline provider

mod binding;
mod dummy;
mod endpoint;

pub use binding::{CustomBinding, ProviderBinding};
pub use dummy::{DUMMY_PROVIDER_LABEL, DUMMY_PROVIDER_NAME, dummy_answer, dummy_binding};
pub use endpoint::{EndpointBinding, extract_text};
