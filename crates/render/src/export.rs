//! Static HTML output of a whole snapshot.

use crate::config::{RenderConfig, RenderContext};
use crate::error::ConfigError;
use crate::group::Grouper;
use crate::reconcile::render_unit;
use crate::typeset::Typeset;
use core_types::Document;
use vdom::VNode;

/// Renders `doc` with `typeset` in HTML mode. Unit keys are not emitted.
pub fn to_html(
    typeset: &Typeset,
    doc: &Document,
    config: RenderConfig,
) -> Result<String, ConfigError> {
    let cx = RenderContext { for_html: true };
    let mut grouper = Grouper::new();
    let units = grouper.group(typeset, doc.lines());
    let nodes = units
        .units()
        .iter()
        .map(|unit| render_unit(typeset, &mut grouper, config, cx, unit).map(VNode::from))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(vdom::html::to_html(&nodes))
}
