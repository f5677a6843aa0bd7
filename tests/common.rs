#![allow(dead_code)]

use std::sync::Arc;

use difflabel::{LabelEngine, Settings, StabilizerStore};

pub const MODIFY_DIFF: &str = "diff --git a/foo.py b/foo.py\n--- a/foo.py\n+++ b/foo.py\n@@ -1,1 +1,1 @@\n-x\n+y\n";

pub const CREATE_DIFF: &str = "--- /dev/null\n+++ b/new.py\n@@ -0,0 +1,3 @@\n+a\n+b\n+c\n";

pub const DELETE_DIFF: &str = "diff --git a/old.py b/old.py\ndeleted file mode 100644\n--- a/old.py\n+++ /dev/null\n";

pub const RENAME_DIFF: &str = "diff --git a/a.py b/b.py\nsimilarity index 87%\nrename from a.py\nrename to b.py\n";

pub const GIT_CREATE_DIFF: &str = r#"diff --git a/x.py b/x.py
new file mode 100644
index 0000000..e69de29
--- /dev/null
+++ b/x.py
@@ -0,0 +1,2 @@
+def main():
+    return 0
"#;

pub const MIXED_DOCUMENT: &str = r#"Sure, here are the changes:

diff --git a/src/app.py b/src/app.py
index 1234567..abcdefg 100644
--- a/src/app.py
+++ b/src/app.py
@@ -1,2 +1,2 @@
 import os
-print("hi")
+print("hello")
diff --git a/src/util.py b/src/util.py
new file mode 100644
--- /dev/null
+++ b/src/util.py
@@ -0,0 +1 @@
+VALUE = 1
diff --git a/legacy.py b/legacy.py
deleted file mode 100644
--- a/legacy.py
+++ /dev/null
@@ -1 +0,0 @@
-OLD = True
diff --git a/docs/guide.md b/docs/manual.md
similarity index 100%
rename from docs/guide.md
rename to docs/manual.md
"#;

pub fn engine() -> LabelEngine {
  LabelEngine::new(Settings::default(), Arc::new(StabilizerStore::new()))
}

/// Every prefix of `text` that ends right after a newline, shortest first
pub fn newline_prefixes(text: &str) -> Vec<&str> {
  text
    .match_indices('\n')
    .map(|(index, _)| &text[..=index])
    .collect()
}
