//! Recipe configuration trees

use deploy_api::{OptionKind, OptionSetting, OptionValue};

/// Children a renderer may traverse.
///
/// The single visibility rule: an IAM role option is rendered as one
/// role-picker widget and never exposes its internal fields as a
/// sub-tree; every other node shows its children in recipe-defined
/// order. Every consumer (outline view, validation walk, deploy
/// payload) goes through here so the tree the user edits and the tree
/// that gets sent cannot diverge.
pub fn visible_children(node: &OptionSetting) -> &[OptionSetting] {
    match node.kind {
        OptionKind::IamRole => &[],
        _ => &node.children,
    }
}

/// Resolve an option by its slash-joined id path, honoring visibility
pub fn find_option<'a>(
    roots: &'a [OptionSetting],
    option_path: &str,
) -> Option<&'a OptionSetting> {
    let mut segments = option_path.split('/');
    let first = segments.next()?;
    let mut current = roots.iter().find(|option| option.id == first)?;

    for segment in segments {
        current = visible_children(current)
            .iter()
            .find(|option| option.id == segment)?;
    }
    Some(current)
}

/// Flatten the visible tree into the values sent with a deployment
pub fn deploy_payload(roots: &[OptionSetting]) -> Vec<OptionValue> {
    let mut values = Vec::new();
    for root in roots {
        collect_values(root, root.id.clone(), &mut values);
    }
    values
}

fn collect_values(node: &OptionSetting, path: String, values: &mut Vec<OptionValue>) {
    if let Some(value) = &node.value {
        values.push(OptionValue {
            option_path: path.clone(),
            value: value.clone(),
        });
    }
    for child in visible_children(node) {
        collect_values(child, format!("{}/{}", path, child.id), values);
    }
}
