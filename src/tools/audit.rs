// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Human-readable audit lines for tool invocations.

use std::path::Path;

use crate::errors::ToolExecutionError;

/// Fence tag for a file: its extension, or empty when it has none.
pub fn fence_tag(path: &str) -> &str {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
}

fn fenced(path: &str, body: &str) -> String {
    let mut block = format!("```{}\n{}", fence_tag(path), body);
    if !body.ends_with('\n') {
        block.push('\n');
    }
    block.push_str("```");
    block
}

pub fn read(path: &str) -> String {
    format!("[tool] read {}", path)
}

pub fn write(path: &str, content: &str) -> String {
    format!("[tool] write {}\n{}", path, fenced(path, content))
}

pub fn modify(path: &str, before: &str, after: &str) -> String {
    format!(
        "[tool] modify {}\nBefore:\n{}\nAfter:\n{}",
        path,
        fenced(path, before),
        fenced(path, after)
    )
}

pub fn delete(path: &str) -> String {
    format!("[tool] delete {}", path)
}

pub fn failure(tool: &str, path: &str, error: &ToolExecutionError) -> String {
    format!("[tool] {} {} failed ({}): {}", tool, path, error.kind(), error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_fence_tagged_with_extension() {
        assert_eq!(
            write("src/main.js", "console.log(1);"),
            "[tool] write src/main.js\n```js\nconsole.log(1);\n```"
        );
        assert_eq!(write("Makefile", "all:\n"), "[tool] write Makefile\n```\nall:\n```");
    }

    #[test]
    fn test_modify_shows_before_and_after() {
        let audit = modify("index.html", "<p>a</p>", "<p>b</p>");
        let before = audit.find("Before:").unwrap();
        let after = audit.find("After:").unwrap();
        assert!(before < after);
        assert!(audit[before..after].contains("<p>a</p>"));
        assert!(audit[after..].contains("<p>b</p>"));
    }
}
