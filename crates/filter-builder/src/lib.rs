//! Flat tree builder and the targets it can build.

pub mod builder;
pub mod emit;
pub mod error;
pub mod json;
pub mod target;
pub mod xml;

pub use builder::FlatFilterBuilder;
pub use emit::{BuildScript, BuildStep, EmitDelegate};
pub use error::{BuildError, TranslateError, Violation};
pub use json::JsonTarget;
pub use target::{Reducer, Shape, Terminal, TreeTarget};
pub use xml::{Element, XmlTarget};

use filter_engine::FilterAdapter;
use filter_model::FilterNode;
use tracing::debug;

/// Adapts `node` and rebuilds it in `target`'s representation.
pub fn translate<N, T>(
    adapter: &FilterAdapter,
    node: &N,
    target: T,
) -> Result<T::Node, TranslateError>
where
    N: FilterNode + ?Sized,
    T: TreeTarget,
{
    let script = adapter.adapt(node, &mut EmitDelegate)?;
    let mut builder = FlatFilterBuilder::new(target);
    debug!(
        "Replaying {} build steps into {}",
        script.len(),
        builder.target().name()
    );
    script.replay(&mut builder)?;
    Ok(builder.result()?)
}
