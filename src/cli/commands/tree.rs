//! tree command - Display the node tree with slugs

use std::collections::BTreeMap;

use super::Session;
use crate::cli::Globals;
use crate::core::site::Node;
use crate::core::types::NodeId;
use crate::ui::output;
use anyhow::Result;

/// Print every node, children indented under their parent.
///
/// Translations are listed under the node they translate.
pub fn tree(globals: &Globals) -> Result<()> {
    let session = Session::open(globals)?;
    let doc = session.store.memory().to_document();

    if globals.json {
        output::print_json(&doc.nodes)?;
        return Ok(());
    }

    let mut children: BTreeMap<NodeId, Vec<&Node>> = BTreeMap::new();
    let mut translations: BTreeMap<NodeId, Vec<&Node>> = BTreeMap::new();
    for node in &doc.nodes {
        match node.translation_parent_id {
            Some(default_node) => translations.entry(default_node).or_default().push(node),
            None => children.entry(node.parent_id).or_default().push(node),
        }
    }

    let mut lines = Vec::new();
    render(NodeId::TREE_ROOT, 0, &children, &translations, &mut lines);
    if lines.is_empty() {
        output::print("(empty site)", globals.verbosity);
    } else {
        output::print(lines.join("\n"), globals.verbosity);
    }
    Ok(())
}

fn render(
    parent: NodeId,
    depth: usize,
    children: &BTreeMap<NodeId, Vec<&Node>>,
    translations: &BTreeMap<NodeId, Vec<&Node>>,
    lines: &mut Vec<String>,
) {
    let Some(nodes) = children.get(&parent) else {
        return;
    };
    for node in nodes {
        lines.push(format!("{}{}", "  ".repeat(depth), describe(node)));
        for translation in translations.get(&node.id).into_iter().flatten() {
            lines.push(format!(
                "{}  [lang {}] {}",
                "  ".repeat(depth),
                translation.language_id,
                describe(translation)
            ));
        }
        render(node.id, depth + 1, children, translations, lines);
    }
}

fn describe(node: &Node) -> String {
    let mut flags = Vec::new();
    if node.locked {
        flags.push("locked");
    }
    if !node.sync_enabled {
        flags.push("manual");
    }
    if node.hidden {
        flags.push("hidden");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" ({})", flags.join(", "))
    };
    format!(
        "{} {} \"{}\" <{}>{}",
        node.id,
        output::format_slug(&node.slug),
        node.title,
        node.type_tag,
        flags
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_shows_flags() {
        let node = Node::new(4, 1, "Team")
            .with_slug("/team")
            .with_locked(true)
            .with_sync(false);
        assert_eq!(describe(&node), "4 /team \"Team\" <page> (locked, manual)");
    }

    #[test]
    fn render_nests_children_and_translations() {
        let root = Node::new(1, 0, "Root").with_slug("/");
        let child = Node::new(2, 1, "About").with_slug("/about");
        let translated = Node::new(3, 1, "Über")
            .with_slug("/ueber")
            .with_translation_of(NodeId::new(2), crate::core::types::LanguageId::new(1));

        let mut children = BTreeMap::new();
        children.insert(NodeId::TREE_ROOT, vec![&root]);
        children.insert(NodeId::new(1), vec![&child]);
        let mut translations = BTreeMap::new();
        translations.insert(NodeId::new(2), vec![&translated]);

        let mut lines = Vec::new();
        render(NodeId::TREE_ROOT, 0, &children, &translations, &mut lines);
        assert_eq!(
            lines,
            vec![
                "1 / \"Root\" <page>".to_string(),
                "  2 /about \"About\" <page>".to_string(),
                "    [lang 1] 3 /ueber \"Über\" <page>".to_string(),
            ]
        );
    }
}
