use crate::{commands::Format, error::CliError};
use filter_builder::{JsonTarget, XmlTarget, translate};
use filter_engine::{FilterAdapter, TextDelegate};
use filter_model::Filter;

/// Renders `filter` in the requested format.
pub fn render(
    adapter: &FilterAdapter,
    filter: &Filter,
    format: Format,
) -> Result<String, CliError> {
    match format {
        Format::Text => Ok(adapter.adapt(filter, &mut TextDelegate::new())?),
        Format::Json => {
            let node = translate(adapter, filter, JsonTarget)?;
            serde_json::to_string_pretty(&node).map_err(CliError::JsonSerialize)
        }
        Format::Xml => {
            let node = translate(adapter, filter, XmlTarget)?;
            Ok(XmlTarget.render(&node)?)
        }
    }
}
