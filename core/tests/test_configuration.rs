//! Configuration tree unit tests

use deploy_api::{OptionKind, OptionSetting};
use serde_json::json;
use stevedore::configuration::{deploy_payload, find_option, visible_children};

fn leaf(id: &str, kind: OptionKind, value: serde_json::Value) -> OptionSetting {
    OptionSetting {
        id: id.to_string(),
        name: id.to_string(),
        description: None,
        kind,
        value: Some(value),
        children: vec![],
        advanced: false,
    }
}

fn group(id: &str, children: Vec<OptionSetting>) -> OptionSetting {
    OptionSetting {
        id: id.to_string(),
        name: id.to_string(),
        description: None,
        kind: OptionKind::Object,
        value: None,
        children,
        advanced: false,
    }
}

fn iam_role(id: &str) -> OptionSetting {
    OptionSetting {
        id: id.to_string(),
        name: "Application IAM Role".to_string(),
        description: None,
        kind: OptionKind::IamRole,
        value: Some(json!("arn:aws:iam::123456789012:role/app-role")),
        children: vec![
            leaf("create-new", OptionKind::Bool, json!(false)),
            leaf("role-arn", OptionKind::Text, json!("arn:aws:iam::123456789012:role/app-role")),
        ],
        advanced: false,
    }
}

#[test]
fn test_iam_role_node_exposes_no_children() {
    let role = iam_role("role");
    assert!(!role.children.is_empty());
    assert!(visible_children(&role).is_empty());
}

#[test]
fn test_children_pass_through_in_recipe_order() {
    let node = group(
        "compute",
        vec![
            leaf("cpu", OptionKind::Number, json!(256)),
            leaf("memory", OptionKind::Number, json!(512)),
        ],
    );

    let children = visible_children(&node);
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].id, "cpu");
    assert_eq!(children[1].id, "memory");
}

#[test]
fn test_find_option_walks_visible_paths_only() {
    let roots = vec![
        group("compute", vec![leaf("cpu", OptionKind::Number, json!(256))]),
        iam_role("role"),
    ];

    assert_eq!(find_option(&roots, "compute/cpu").unwrap().id, "cpu");
    assert!(find_option(&roots, "role").is_some());
    // The role's internal fields are not addressable
    assert!(find_option(&roots, "role/role-arn").is_none());
    assert!(find_option(&roots, "compute/missing").is_none());
}

#[test]
fn test_deploy_payload_honors_visibility() {
    let roots = vec![
        group(
            "compute",
            vec![
                leaf("cpu", OptionKind::Number, json!(256)),
                leaf("memory", OptionKind::Number, json!(512)),
            ],
        ),
        iam_role("role"),
    ];

    let payload = deploy_payload(&roots);
    let paths: Vec<&str> = payload.iter().map(|v| v.option_path.as_str()).collect();

    // Interior values in display order, the role as a single value, and
    // none of the role's internal fields
    assert_eq!(paths, vec!["compute/cpu", "compute/memory", "role"]);
    assert_eq!(payload[2].value, json!("arn:aws:iam::123456789012:role/app-role"));
}
