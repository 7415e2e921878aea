use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::error::Result;
use crate::utils::Upstream;

use self::models::NavigationNode;

pub mod models;

/// `[var =] appendChild(parent, "label", type, "url", "extra")`
static APPEND_CHILD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:(?P<var>\w+)\s*=\s*)?appendChild\s*\(\s*(?P<parent>\w+)\s*,\s*['"](?P<label>.+?)['"]\s*,\s*-?\d+\s*,\s*['"](?P<url>.*?)['"]\s*,\s*['"].*?['"]\s*\)"#,
    )
    .unwrap()
});

/// Variable holding the root of the tree in the source
const ROOT_VAR: &str = "aux0";

/// Separator between the labels of the ancestors
const SEPARATOR: &str = " / ";

/// Fetch the index page and extract the course directory
///
/// # Errors
/// Fails when the page can't be fetched
pub async fn tree(upstream: &Upstream) -> Result<Vec<NavigationNode>> {
    let source = upstream.get_webpage(&upstream.index_url()).await?;
    let forest = extract_navigation_tree(&source);
    info!("{} top-level entries in the directory", forest.len());

    Ok(forest)
}

/// Extract the course directory from the script building it
///
/// Lines that aren't a call, or whose parent wasn't declared, are skipped
#[must_use]
pub fn extract_navigation_tree(source: &str) -> Vec<NavigationNode> {
    // Nodes are built flat, each one knowing the indexes of its children
    let mut nodes = vec![NavigationNode::default()];
    let mut children: Vec<Vec<usize>> = vec![vec![]];
    let mut variables = HashMap::from([(ROOT_VAR.to_owned(), 0)]);

    for line in source.lines() {
        let Some(captures) = APPEND_CHILD.captures(line) else {
            continue;
        };

        let Some(&parent) = variables.get(&captures["parent"]) else {
            debug!("Unknown parent {}, line skipped", &captures["parent"]);
            continue;
        };

        let label = captures["label"].trim().to_owned();
        let full_label = match nodes[parent].full_label.as_str() {
            "" => label.clone(),
            prefix => format!("{prefix}{SEPARATOR}{label}"),
        };
        let url = captures["url"].trim().to_owned();
        let (se, gr) = selectors(&url);

        let index = nodes.len();
        nodes.push(NavigationNode {
            label,
            full_label,
            url,
            se,
            gr,
            children: vec![],
        });
        children.push(vec![]);
        children[parent].push(index);

        if let Some(var) = captures.name("var") {
            variables.insert(var.as_str().to_owned(), index);
        }
    }

    // Children are always declared after their parent: assemble from the end
    let mut built: Vec<Option<NavigationNode>> = nodes.into_iter().map(Some).collect();
    for index in (0..built.len()).rev() {
        let kids = children[index]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        if let Some(node) = built[index].as_mut() {
            node.children = kids;
        }
    }

    built
        .swap_remove(0)
        .map(|root| root.children)
        .unwrap_or_default()
}

/// Read `se` and `gr` from the query string of a link
fn selectors(url: &str) -> (Option<String>, Option<String>) {
    let Some((_, query)) = url.split_once('?') else {
        return (None, None);
    };
    // Anything after a second `?` isn't part of the query
    let query = query.split('?').next().unwrap_or_default();

    let get = |key: &str| {
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.into_owned())
    };

    (get("se"), get("gr"))
}

/// Find an entry by its full label
#[must_use]
pub fn find<'a>(forest: &'a [NavigationNode], full_label: &str) -> Option<&'a NavigationNode> {
    forest.iter().find_map(|node| {
        if node.full_label == full_label {
            Some(node)
        } else {
            find(&node.children, full_label)
        }
    })
}

/// All the entries pointing to a schedule, depth first
#[must_use]
pub fn leaves(forest: &[NavigationNode]) -> Vec<&NavigationNode> {
    forest
        .iter()
        .flat_map(|node| {
            if node.is_leaf() {
                vec![node]
            } else {
                leaves(&node.children)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
<script>
aux0 = insFld(foldersTree, gFld("Plan", ""));
a = appendChild(aux0, "CS101", 1, "plan?se=58&gr=126/1", "")
b = appendChild(a, "Group 1", 1, "", "")
appendChild(b, 'Lab A', 0, 'l_pozycjaplanu1.php?se=58&gr=7', '12')
c = appendChild(ghost, "Orphan", 1, "plan?se=1&gr=1", "")
appendChild(aux0, "Broken, 1, "", "")
d = appendChild(aux0, " Economics ", 1, " plan?se=60 ", "")
</script>"#;

    #[test]
    fn single_top_level_entry() {
        let forest =
            extract_navigation_tree(r#"a = appendChild(aux0, "CS101", 1, "plan?se=58&gr=126/1", "")"#);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].label, "CS101");
        assert_eq!(forest[0].full_label, "CS101");
        assert_eq!(forest[0].se.as_deref(), Some("58"));
        assert_eq!(forest[0].gr.as_deref(), Some("126/1"));
        assert!(forest[0].is_leaf());
    }

    #[test]
    fn nested_entries() {
        let forest = extract_navigation_tree(SOURCE);

        assert_eq!(forest.len(), 2);
        let cs = &forest[0];
        assert!(!cs.is_leaf());
        assert_eq!(cs.children.len(), 1);

        let group = &cs.children[0];
        assert_eq!(group.full_label, "CS101 / Group 1");
        assert_eq!((group.se.as_deref(), group.gr.as_deref()), (None, None));

        let lab = &group.children[0];
        assert_eq!(lab.full_label, "CS101 / Group 1 / Lab A");
        assert_eq!(lab.selectors(), Some(("58", "7")));
    }

    #[test]
    fn values_are_trimmed() {
        let forest = extract_navigation_tree(SOURCE);
        let economics = &forest[1];

        assert_eq!(economics.label, "Economics");
        assert_eq!(economics.url, "plan?se=60");
        assert_eq!(economics.se.as_deref(), Some("60"));
        assert_eq!(economics.gr, None);
        assert!(!economics.is_leaf());
    }

    #[test]
    fn no_call_is_no_entry() {
        assert!(extract_navigation_tree("").is_empty());
        assert!(extract_navigation_tree("var x = 1;\nfoo(aux0);").is_empty());
    }

    #[test]
    fn reassigned_variable_keeps_old_children() {
        let forest = extract_navigation_tree(
            r#"a = appendChild(aux0, "One", 1, "", "")
a = appendChild(aux0, "Two", 1, "", "")
appendChild(a, "Under two", 1, "?se=1&gr=2", "")"#,
        );

        assert_eq!(forest.len(), 2);
        assert!(forest[0].children.is_empty());
        assert_eq!(forest[1].children[0].full_label, "Two / Under two");
    }

    #[test]
    fn find_and_leaves() {
        let forest = extract_navigation_tree(SOURCE);

        let lab = find(&forest, "CS101 / Group 1 / Lab A").unwrap();
        assert_eq!(lab.label, "Lab A");
        assert!(find(&forest, "Orphan").is_none());

        let labels: Vec<_> = leaves(&forest)
            .iter()
            .map(|node| node.full_label.as_str())
            .collect();
        assert_eq!(labels, vec!["CS101 / Group 1 / Lab A"]);
    }
}
