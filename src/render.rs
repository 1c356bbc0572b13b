//! Purpose: Render a `StatsTree` as pretty JSON with optional ANSI colorization.
//! Exports: `render_tree`.
//! Role: Small, pure formatter used by CLI emission paths.
//! Invariants: When color is disabled, output equals `serde_json::to_string_pretty`.
//! Invariants: ANSI escapes appear only when explicitly enabled.
use statpick::core::tree::{Leaf, LeafValue, Node, StatsTree};

const INDENT: &str = "  ";

// Conservative 8/16-color palette for broad terminal compatibility.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_DESCRIPTION: &str = "90";
const COLOR_PUNCT: &str = "39";

pub fn render_tree(tree: &StatsTree, use_color: bool) -> String {
    let mut out = String::new();
    write_tree(tree, 0, use_color, &mut out);
    out
}

fn write_tree(tree: &StatsTree, indent: usize, use_color: bool, out: &mut String) {
    if tree.is_empty() {
        push_colored("{}", COLOR_PUNCT, use_color, out);
        return;
    }
    push_colored("{", COLOR_PUNCT, use_color, out);
    out.push('\n');
    let len = tree.len();
    for (idx, (key, node)) in tree.iter().enumerate() {
        push_indent(indent + 1, out);
        push_key(key, use_color, out);
        match node {
            Node::Branch(subtree) => write_tree(subtree, indent + 1, use_color, out),
            Node::Leaf(leaf) => write_leaf(leaf, indent + 1, use_color, out),
        }
        if idx + 1 < len {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        out.push('\n');
    }
    push_indent(indent, out);
    push_colored("}", COLOR_PUNCT, use_color, out);
}

fn write_leaf(leaf: &Leaf, indent: usize, use_color: bool, out: &mut String) {
    push_colored("{", COLOR_PUNCT, use_color, out);
    out.push('\n');

    push_indent(indent + 1, out);
    push_key("val", use_color, out);
    write_leaf_value(&leaf.val, indent + 1, use_color, out);
    push_colored(",", COLOR_PUNCT, use_color, out);
    out.push('\n');

    push_indent(indent + 1, out);
    push_key("description", use_color, out);
    push_string(&leaf.description, COLOR_DESCRIPTION, use_color, out);
    out.push('\n');

    push_indent(indent, out);
    push_colored("}", COLOR_PUNCT, use_color, out);
}

fn write_leaf_value(value: &LeafValue, indent: usize, use_color: bool, out: &mut String) {
    match value {
        LeafValue::Single(token) => push_string(token, COLOR_STRING, use_color, out),
        LeafValue::Many(tokens) => {
            if tokens.is_empty() {
                push_colored("[]", COLOR_PUNCT, use_color, out);
                return;
            }
            push_colored("[", COLOR_PUNCT, use_color, out);
            out.push('\n');
            for (idx, token) in tokens.iter().enumerate() {
                push_indent(indent + 1, out);
                push_string(token, COLOR_STRING, use_color, out);
                if idx + 1 < tokens.len() {
                    push_colored(",", COLOR_PUNCT, use_color, out);
                }
                out.push('\n');
            }
            push_indent(indent, out);
            push_colored("]", COLOR_PUNCT, use_color, out);
        }
    }
}

fn push_key(key: &str, use_color: bool, out: &mut String) {
    let encoded = serde_json::to_string(key).unwrap_or_else(|_| "\"\"".to_string());
    push_colored(&encoded, COLOR_KEY, use_color, out);
    push_colored(":", COLOR_PUNCT, use_color, out);
    out.push(' ');
}

fn push_string(text: &str, color: &str, use_color: bool, out: &mut String) {
    let encoded = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
    push_colored(&encoded, color, use_color, out);
}

fn push_indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

fn push_colored(text: &str, color: &str, use_color: bool, out: &mut String) {
    if !use_color {
        out.push_str(text);
        return;
    }
    out.push_str("\u{1b}[");
    out.push_str(color);
    out.push('m');
    out.push_str(text);
    out.push_str("\u{1b}[0m");
}
