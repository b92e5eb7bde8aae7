// Tree renderer - pure projection of (roots, cache) into a nested view
use crate::application::expansion_cache::{ExpansionCache, NodeState};
use crate::domain::period::{DashaLevel, PeriodNode, DATE_FORMAT};
use crate::domain::planet::Planet;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedNode {
    pub id: String,
    pub level: DashaLevel,
    pub planet: Planet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub depth: usize,
    pub color: &'static str,
    pub start_date: String,
    pub end_date: String,
    pub duration: String,
    pub expandable: bool,
    pub expanded: bool,
    /// Children are being fetched
    pub loading: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderedNode>,
}

/// Roots keep the service order; expanded children are shown by ascending start date.
pub fn render_tree(roots: &[PeriodNode], cache: &ExpansionCache) -> Vec<RenderedNode> {
    roots.iter().map(|root| render_node(root, cache, 0)).collect()
}

fn render_node(node: &PeriodNode, cache: &ExpansionCache, depth: usize) -> RenderedNode {
    let expandable = !node.level.is_terminal();
    let expanded = expandable && cache.state(&node.id) == NodeState::Expanded;
    let visible = if expanded {
        cache.visible_children(&node.id)
    } else {
        None
    };

    let children = match visible {
        Some(children) => {
            let mut ordered: Vec<&PeriodNode> = children.iter().collect();
            ordered.sort_by_key(|child| child.start_date);
            ordered
                .into_iter()
                .map(|child| render_node(child, cache, depth + 1))
                .collect()
        }
        None => Vec::new(),
    };

    RenderedNode {
        id: node.id.to_string(),
        level: node.level,
        planet: node.planet,
        parent: node.parent_label(),
        depth,
        color: node.planet.color(),
        start_date: node.start_date.format(DATE_FORMAT).to_string(),
        end_date: node.end_date.format(DATE_FORMAT).to_string(),
        duration: node.duration.label(),
        expandable,
        expanded,
        loading: cache.is_in_flight(&node.id),
        children,
    }
}

/// Plain-text outline, two spaces of indentation per depth
pub fn render_outline(nodes: &[RenderedNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_outline(node, &mut out);
    }
    out
}

fn write_outline(node: &RenderedNode, out: &mut String) {
    out.push_str(&"  ".repeat(node.depth));
    if node.expandable {
        out.push_str(if node.expanded { "▼ " } else { "▶ " });
    } else {
        out.push_str("  ");
    }
    out.push_str(node.planet.name());
    if let Some(parent) = &node.parent {
        out.push_str(&format!(" ({})", parent));
    }
    out.push_str(&format!(
        "  {} → {}  {}\n",
        node.start_date, node.end_date, node.duration
    ));
    for child in &node.children {
        write_outline(child, out);
    }
}
